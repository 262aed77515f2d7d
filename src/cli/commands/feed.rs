use crate::domain::{FeedVariant, RecipeId};
use crate::state::AppState;

use super::print_json;

fn format_duration(seconds: Option<i32>) -> String {
    seconds.map_or_else(String::new, |s| format!(" {}:{:02}", s / 60, s % 60))
}

pub async fn cmd_feed(
    state: &AppState,
    token: Option<&str>,
    community: bool,
    cursor: Option<i32>,
    limit: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let viewer = state.current_user(token).await?;
    let variant = if community {
        FeedVariant::Community
    } else {
        FeedVariant::Main
    };

    let page = state
        .feed
        .feed(viewer, variant, cursor.map(RecipeId::new), limit)
        .await?;

    if json {
        return print_json(&page);
    }

    if page.items.is_empty() {
        println!("Nothing in the feed.");
        return Ok(());
    }

    for card in &page.items {
        let heart = if card.is_liked { "♥" } else { "♡" };
        let saved = if card.is_saved { " ★" } else { "" };
        println!(
            "[{}] {} ({}{}) {heart} {}{saved}",
            card.id,
            card.title,
            card.media_type,
            format_duration(card.duration_sec),
            card.likes
        );
        if let Some(url) = &card.media_url {
            println!("     {url}");
        }
    }

    if let Some(next) = page.next_cursor {
        println!();
        println!("More: recipeshare feed --cursor {next}");
    }

    Ok(())
}

pub async fn cmd_like(state: &AppState, token: Option<&str>, id: i32) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    let like = state.feed.toggle_like(Some(user), RecipeId::new(id)).await?;

    if like.liked {
        println!("♥ Liked recipe {id} ({} likes)", like.likes);
    } else {
        println!("♡ Unliked recipe {id} ({} likes)", like.likes);
    }
    Ok(())
}

pub async fn cmd_save(state: &AppState, token: Option<&str>, id: i32) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    let saved = state.feed.toggle_save(Some(user), RecipeId::new(id)).await?;

    if saved {
        println!("★ Saved recipe {id}");
    } else {
        println!("☆ Removed recipe {id} from saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(None), "");
        assert_eq!(format_duration(Some(75)), " 1:15");
        assert_eq!(format_duration(Some(9)), " 0:09");
    }
}
