use crate::services::SuggestionKind;
use crate::state::AppState;

use super::print_json;

pub async fn cmd_search(
    state: &AppState,
    token: Option<&str>,
    query: &str,
    json: bool,
) -> anyhow::Result<()> {
    let user = state.current_user(token).await?;
    let results = state.search.search(user, query).await?;

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No recipes match '{query}'.");
        return Ok(());
    }

    println!("Found {} recipe(s) for '{query}':", results.len());
    println!("{:-<70}", "");
    for recipe in results {
        println!("[{}] {}", recipe.id, recipe.name);
        println!("    {}", recipe.description);
    }

    Ok(())
}

pub async fn cmd_suggest(
    state: &AppState,
    token: Option<&str>,
    partial: &str,
    json: bool,
) -> anyhow::Result<()> {
    let user = state.current_user(token).await?;
    let suggestions = state.search.get_suggestions(user, partial).await?;

    if json {
        return print_json(&suggestions);
    }

    for suggestion in suggestions {
        let icon = match suggestion.kind {
            SuggestionKind::History => "⟲",
            SuggestionKind::Recipe => "•",
        };
        println!("{icon} {}", suggestion.value);
    }

    Ok(())
}
