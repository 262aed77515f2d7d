//! Domain service for recipe authoring and viewing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::IngredientLine;
use crate::domain::{RecipeId, UserId};

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Only the author can change this recipe")]
    Forbidden,

    #[error("Recipe not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for RecipeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecipeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl From<IngredientLine> for Ingredient {
    fn from(line: IngredientLine) -> Self {
        Self {
            name: line.name,
            amount: line.amount,
            unit: line.unit,
        }
    }
}

fn default_media_type() -> String {
    "image".to_string()
}

const fn default_public() -> bool {
    true
}

/// Recipe form as submitted by its author. Also the JSON shape read by
/// `recipe create --file`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    pub description: String,
    /// Category name
    pub category: String,
    #[serde(default)]
    pub prep_time: i32,
    #[serde(default)]
    pub cook_time: i32,
    pub servings: i32,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default)]
    pub duration_sec: Option<i32>,
    #[serde(default = "default_public")]
    pub is_public: bool,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub media_url: Option<String>,
    pub is_public: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: RecipeId,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub author: Option<String>,
    pub media_url: Option<String>,
    pub media_type: String,
    pub duration_sec: Option<i32>,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub is_public: bool,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub likes: u64,
    pub is_liked: bool,
    pub is_saved: bool,
    pub created_at: String,
}

#[async_trait::async_trait]
pub trait RecipeService: Send + Sync {
    async fn create(
        &self,
        user: Option<UserId>,
        input: RecipeInput,
    ) -> Result<RecipeDetail, RecipeError>;

    /// # Errors
    ///
    /// Returns [`RecipeError::NotFound`] for missing recipes and for private
    /// recipes of other users.
    async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeDetail, RecipeError>;

    /// Public recipes plus the viewer's own, newest first.
    async fn list(&self, viewer: Option<UserId>) -> Result<Vec<RecipeSummary>, RecipeError>;

    /// Replaces the recipe and all of its ingredients and steps.
    async fn update(
        &self,
        user: Option<UserId>,
        id: RecipeId,
        input: RecipeInput,
    ) -> Result<RecipeDetail, RecipeError>;

    async fn delete(&self, user: Option<UserId>, id: RecipeId) -> Result<(), RecipeError>;

    /// Category names, alphabetically.
    async fn categories(&self) -> Result<Vec<String>, RecipeError>;
}
