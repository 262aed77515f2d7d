//! Domain service for the signed-in user's profile page and cookbook.

use serde::Serialize;
use thiserror::Error;

use crate::domain::UserId;
use crate::services::recipe_service::RecipeSummary;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("User not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ProfileError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub country: Option<String>,
    pub profile_image_url: Option<String>,
    pub member_since: String,
    pub recipe_count: u64,
    pub saved_count: u64,
    pub likes_received: u64,
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    async fn profile(&self, user: Option<UserId>) -> Result<Profile, ProfileError>;

    /// Points the profile picture at an already uploaded image.
    async fn update_profile_image(
        &self,
        user: Option<UserId>,
        url: &str,
    ) -> Result<(), ProfileError>;

    /// Recipes the user wrote, private ones included.
    async fn own_recipes(&self, user: Option<UserId>) -> Result<Vec<RecipeSummary>, ProfileError>;

    /// Saved recipes still visible to the user, most recently saved first.
    async fn saved_recipes(&self, user: Option<UserId>)
    -> Result<Vec<RecipeSummary>, ProfileError>;
}
