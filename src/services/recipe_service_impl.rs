//! `SeaORM` implementation of the `RecipeService` trait.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

use crate::db::{IngredientLine, Recipe, RecipeDraft, Store};
use crate::domain::{RecipeId, UserId};
use crate::services::recipe_service::{
    Ingredient, RecipeDetail, RecipeError, RecipeInput, RecipeService, RecipeSummary,
};
use crate::services::validation;

pub struct SeaOrmRecipeService {
    store: Store,
}

impl SeaOrmRecipeService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Validates the form and resolves its category.
    async fn draft_from_input(&self, input: RecipeInput) -> Result<RecipeDraft, RecipeError> {
        let invalid = RecipeError::Validation;

        let name = validation::validate_recipe_name(&input.name).map_err(invalid)?;
        let description = validation::validate_description(&input.description).map_err(invalid)?;
        let prep_time = validation::validate_minutes("Prep time", input.prep_time).map_err(invalid)?;
        let cook_time = validation::validate_minutes("Cook time", input.cook_time).map_err(invalid)?;
        let servings = validation::validate_servings(input.servings).map_err(invalid)?;
        let media_type = validation::validate_media_type(&input.media_type).map_err(invalid)?;

        let media_url = match input.media_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(url) => Some(validation::validate_http_url(url).map_err(invalid)?),
        };

        if input.duration_sec.is_some_and(|d| d < 0) {
            return Err(invalid("Duration cannot be negative".to_string()));
        }

        let ingredients = ingredient_lines(input.ingredients)?;

        if input.steps.is_empty() {
            return Err(invalid("At least one step is required".to_string()));
        }
        let steps = input
            .steps
            .iter()
            .enumerate()
            .map(|(i, text)| validation::validate_step(i + 1, text))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let category = self
            .store
            .recipe_repo()
            .category_by_name(input.category.trim())
            .await?
            .ok_or_else(|| invalid(format!("Unknown category: {}", input.category.trim())))?;

        Ok(RecipeDraft {
            name,
            description,
            media_url,
            media_type: media_type.as_str().to_string(),
            duration_sec: input.duration_sec,
            prep_time,
            cook_time,
            servings,
            category_id: category.id,
            is_public: input.is_public,
            ingredients,
            steps,
        })
    }

    async fn category_names(&self) -> Result<HashMap<i32, String>, RecipeError> {
        Ok(self
            .store
            .recipe_repo()
            .categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }

    async fn detail(
        &self,
        recipe: Recipe,
        viewer: Option<i32>,
    ) -> Result<RecipeDetail, RecipeError> {
        let repo = self.store.recipe_repo();
        let engagement = self.store.engagement_repo();

        let ingredients = repo.ingredients(recipe.id).await?;
        let steps = repo.steps(recipe.id).await?;
        let category = repo.category_by_id(recipe.category_id).await?.map(|c| c.name);
        let author = match recipe.author_id {
            Some(author_id) => self.store.get_user(author_id).await?.map(|u| u.username),
            None => None,
        };
        let likes = engagement.like_count(recipe.id).await?;

        let (is_liked, is_saved) = match viewer {
            Some(viewer) => (
                engagement.liked_among(viewer, &[recipe.id]).await?.contains(&recipe.id),
                engagement.saved_among(viewer, &[recipe.id]).await?.contains(&recipe.id),
            ),
            None => (false, false),
        };

        Ok(RecipeDetail {
            id: RecipeId::new(recipe.id),
            name: recipe.name,
            description: recipe.description,
            category,
            author,
            media_url: recipe.media_url,
            media_type: recipe.media_type,
            duration_sec: recipe.duration_sec,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            servings: recipe.servings,
            is_public: recipe.is_public,
            ingredients: ingredients.into_iter().map(Ingredient::from).collect(),
            steps,
            likes,
            is_liked,
            is_saved,
            created_at: recipe.created_at,
        })
    }

    /// Loads a recipe the user is allowed to modify.
    async fn owned(&self, user_id: i32, id: RecipeId) -> Result<Recipe, RecipeError> {
        let recipe = self
            .store
            .get_recipe(id.value())
            .await?
            .ok_or(RecipeError::NotFound)?;

        if recipe.author_id == Some(user_id) {
            Ok(recipe)
        } else if recipe.is_public {
            Err(RecipeError::Forbidden)
        } else {
            Err(RecipeError::NotFound)
        }
    }
}

fn require_user(user: Option<UserId>) -> Result<i32, RecipeError> {
    match user {
        Some(id) if id.is_valid() => Ok(id.value()),
        _ => Err(RecipeError::Unauthorized),
    }
}

fn viewer_id(viewer: Option<UserId>) -> Option<i32> {
    viewer.filter(UserId::is_valid).map(|id| id.value())
}

fn ingredient_lines(ingredients: Vec<Ingredient>) -> Result<Vec<IngredientLine>, RecipeError> {
    if ingredients.is_empty() {
        return Err(RecipeError::Validation(
            "At least one ingredient is required".to_string(),
        ));
    }

    ingredients
        .into_iter()
        .enumerate()
        .map(|(i, ingredient)| {
            let name = ingredient.name.trim().to_string();
            let amount = ingredient.amount.trim().to_string();
            if name.is_empty() || amount.is_empty() {
                return Err(RecipeError::Validation(format!(
                    "Ingredient {} needs a name and an amount",
                    i + 1
                )));
            }
            Ok(IngredientLine {
                name,
                amount,
                unit: ingredient
                    .unit
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty()),
            })
        })
        .collect()
}

/// Summary rows for listings. `categories` maps category id to name.
pub(crate) fn summarize(recipe: Recipe, categories: &HashMap<i32, String>) -> RecipeSummary {
    RecipeSummary {
        id: RecipeId::new(recipe.id),
        category: categories.get(&recipe.category_id).cloned(),
        name: recipe.name,
        description: recipe.description,
        media_url: recipe.media_url,
        is_public: recipe.is_public,
        created_at: recipe.created_at,
    }
}

#[async_trait]
impl RecipeService for SeaOrmRecipeService {
    async fn create(
        &self,
        user: Option<UserId>,
        input: RecipeInput,
    ) -> Result<RecipeDetail, RecipeError> {
        let user_id = require_user(user)?;
        let draft = self.draft_from_input(input).await?;

        let recipe = self.store.recipe_repo().create(Some(user_id), draft).await?;
        info!(user_id, recipe_id = recipe.id, name = %recipe.name, "Recipe published");

        self.detail(recipe, Some(user_id)).await
    }

    async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeDetail, RecipeError> {
        let viewer = viewer_id(viewer);
        let recipe = self
            .store
            .get_recipe(id.value())
            .await?
            .ok_or(RecipeError::NotFound)?;

        if !recipe.is_public && (recipe.author_id.is_none() || recipe.author_id != viewer) {
            return Err(RecipeError::NotFound);
        }

        self.detail(recipe, viewer).await
    }

    async fn list(&self, viewer: Option<UserId>) -> Result<Vec<RecipeSummary>, RecipeError> {
        let categories = self.category_names().await?;
        let recipes = self
            .store
            .recipe_repo()
            .list_visible(viewer_id(viewer))
            .await?;

        Ok(recipes
            .into_iter()
            .map(|r| summarize(r, &categories))
            .collect())
    }

    async fn update(
        &self,
        user: Option<UserId>,
        id: RecipeId,
        input: RecipeInput,
    ) -> Result<RecipeDetail, RecipeError> {
        let user_id = require_user(user)?;
        self.owned(user_id, id).await?;

        let draft = self.draft_from_input(input).await?;
        let recipe = self
            .store
            .recipe_repo()
            .update(id.value(), draft)
            .await?
            .ok_or(RecipeError::NotFound)?;

        info!(user_id, recipe_id = recipe.id, "Recipe updated");
        self.detail(recipe, Some(user_id)).await
    }

    async fn delete(&self, user: Option<UserId>, id: RecipeId) -> Result<(), RecipeError> {
        let user_id = require_user(user)?;
        self.owned(user_id, id).await?;

        if !self.store.recipe_repo().delete(id.value()).await? {
            return Err(RecipeError::NotFound);
        }

        info!(user_id, recipe_id = id.value(), "Recipe deleted");
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<String>, RecipeError> {
        Ok(self.store.list_category_names().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, amount: &str, unit: Option<&str>) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            amount: amount.to_string(),
            unit: unit.map(str::to_string),
        }
    }

    #[test]
    fn ingredient_lines_trim_and_drop_blank_units() {
        let lines = ingredient_lines(vec![
            ingredient(" flour ", "200", Some("g")),
            ingredient("salt", "1", Some("  ")),
        ])
        .unwrap();

        assert_eq!(lines[0].name, "flour");
        assert_eq!(lines[0].unit.as_deref(), Some("g"));
        assert_eq!(lines[1].unit, None);
    }

    #[test]
    fn ingredient_lines_require_name_and_amount() {
        assert!(matches!(
            ingredient_lines(Vec::new()),
            Err(RecipeError::Validation(_))
        ));
        assert!(matches!(
            ingredient_lines(vec![ingredient("eggs", " ", None)]),
            Err(RecipeError::Validation(msg)) if msg.contains("Ingredient 1")
        ));
    }
}
