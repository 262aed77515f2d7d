use anyhow::Context;
use std::path::Path;

use crate::domain::RecipeId;
use crate::services::{RecipeDetail, RecipeInput};
use crate::state::AppState;

use super::print_json;

fn read_input(path: &Path) -> anyhow::Result<RecipeInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse recipe file: {}", path.display()))
}

fn print_detail(recipe: &RecipeDetail) {
    println!("{} (ID: {})", recipe.name, recipe.id);
    println!("{:-<70}", "");
    println!("{}", recipe.description);
    println!();

    let category = recipe.category.as_deref().unwrap_or("Uncategorized");
    let author = recipe.author.as_deref().unwrap_or("recipeshare");
    println!("Category: {category} | By: {author}");
    println!(
        "Prep: {} min | Cook: {} min | Serves: {}",
        recipe.prep_time, recipe.cook_time, recipe.servings
    );
    if !recipe.is_public {
        println!("Private");
    }

    let liked = if recipe.is_liked { " (you like this)" } else { "" };
    let saved = if recipe.is_saved { " | Saved" } else { "" };
    println!("♥ {}{liked}{saved}", recipe.likes);

    println!();
    println!("Ingredients:");
    for ingredient in &recipe.ingredients {
        match &ingredient.unit {
            Some(unit) => println!("  • {} {unit} {}", ingredient.amount, ingredient.name),
            None => println!("  • {} {}", ingredient.amount, ingredient.name),
        }
    }

    println!();
    println!("Steps:");
    for (i, step) in recipe.steps.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }
}

pub async fn cmd_recipe_list(state: &AppState, token: Option<&str>, json: bool) -> anyhow::Result<()> {
    let viewer = state.current_user(token).await?;
    let recipes = state.recipes.list(viewer).await?;

    if json {
        return print_json(&recipes);
    }

    if recipes.is_empty() {
        println!("No recipes yet.");
        return Ok(());
    }

    println!("{:<6} {:<40} {:<20}", "ID", "Name", "Category");
    println!("{:-<70}", "");
    for recipe in recipes {
        let lock = if recipe.is_public { "" } else { " 🔒" };
        println!(
            "{:<6} {:<40} {:<20}",
            recipe.id.value(),
            format!("{}{lock}", recipe.name),
            recipe.category.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

pub async fn cmd_recipe_show(
    state: &AppState,
    token: Option<&str>,
    id: i32,
    json: bool,
) -> anyhow::Result<()> {
    let viewer = state.current_user(token).await?;
    let recipe = state.recipes.get(viewer, RecipeId::new(id)).await?;

    if json {
        return print_json(&recipe);
    }

    print_detail(&recipe);
    Ok(())
}

pub async fn cmd_recipe_create(
    state: &AppState,
    token: Option<&str>,
    file: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    let input = read_input(file)?;
    let recipe = state.recipes.create(Some(user), input).await?;

    if json {
        return print_json(&recipe);
    }

    println!("✓ Published {} (ID: {})", recipe.name, recipe.id);
    Ok(())
}

pub async fn cmd_recipe_update(
    state: &AppState,
    token: Option<&str>,
    id: i32,
    file: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    let input = read_input(file)?;
    let recipe = state
        .recipes
        .update(Some(user), RecipeId::new(id), input)
        .await?;

    if json {
        return print_json(&recipe);
    }

    println!("✓ Updated {} (ID: {})", recipe.name, recipe.id);
    Ok(())
}

pub async fn cmd_recipe_delete(state: &AppState, token: Option<&str>, id: i32) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    state.recipes.delete(Some(user), RecipeId::new(id)).await?;
    println!("✓ Deleted recipe {id}");
    Ok(())
}

pub async fn cmd_recipe_categories(state: &AppState, json: bool) -> anyhow::Result<()> {
    let categories = state.recipes.categories().await?;

    if json {
        return print_json(&categories);
    }

    for name in categories {
        println!("• {name}");
    }
    Ok(())
}
