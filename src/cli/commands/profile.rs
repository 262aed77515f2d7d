use crate::services::RecipeSummary;
use crate::state::AppState;

use super::print_json;

pub async fn cmd_profile(
    state: &AppState,
    token: Option<&str>,
    image_url: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;

    if let Some(url) = image_url {
        state.profiles.update_profile_image(Some(user), url).await?;
        println!("✓ Profile image updated");
    }

    let profile = state.profiles.profile(Some(user)).await?;

    if json {
        return print_json(&profile);
    }

    println!("{} <{}>", profile.username, profile.email);
    println!("{:-<70}", "");
    if let Some(country) = &profile.country {
        println!("Country:      {country}");
    }
    if let Some(image) = &profile.profile_image_url {
        println!("Image:        {image}");
    }
    println!("Member since: {}", profile.member_since);
    println!(
        "Recipes: {} | Saved: {} | Likes received: {}",
        profile.recipe_count, profile.saved_count, profile.likes_received
    );

    Ok(())
}

fn print_section(title: &str, recipes: &[RecipeSummary]) {
    println!("{title} ({}):", recipes.len());
    if recipes.is_empty() {
        println!("  (none)");
    }
    for recipe in recipes {
        let lock = if recipe.is_public { "" } else { " 🔒" };
        println!("  [{}] {}{lock}", recipe.id, recipe.name);
    }
}

pub async fn cmd_cookbook(state: &AppState, token: Option<&str>, json: bool) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    let own = state.profiles.own_recipes(Some(user)).await?;
    let saved = state.profiles.saved_recipes(Some(user)).await?;

    if json {
        return print_json(&serde_json::json!({ "own": own, "saved": saved }));
    }

    print_section("My recipes", &own);
    println!();
    print_section("Saved", &saved);
    Ok(())
}
