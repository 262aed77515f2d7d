//! Domain service for the media feed and engagement (likes, saves).

use serde::Serialize;
use thiserror::Error;

use crate::domain::{FeedVariant, RecipeId, UserId};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Recipe not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for FeedError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FeedError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedCard {
    pub id: RecipeId,
    pub title: String,
    pub media_url: Option<String>,
    pub media_type: String,
    pub duration_sec: Option<i32>,
    pub likes: u64,
    pub is_liked: bool,
    pub is_saved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub items: Vec<FeedCard>,
    /// Pass back as `cursor` to fetch the next page. `None` on the last page.
    pub next_cursor: Option<RecipeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: u64,
}

#[async_trait::async_trait]
pub trait FeedService: Send + Sync {
    /// One page of public recipes with media, newest id first, strictly
    /// below `cursor`. `limit` is clamped to the configured bounds.
    async fn feed(
        &self,
        viewer: Option<UserId>,
        variant: FeedVariant,
        cursor: Option<RecipeId>,
        limit: Option<u64>,
    ) -> Result<FeedPage, FeedError>;

    async fn toggle_like(
        &self,
        user: Option<UserId>,
        recipe: RecipeId,
    ) -> Result<LikeState, FeedError>;

    /// Returns whether the recipe is saved afterwards.
    async fn toggle_save(&self, user: Option<UserId>, recipe: RecipeId) -> Result<bool, FeedError>;
}
