//! `SeaORM` implementation of the `FeedService` trait.

use async_trait::async_trait;
use tracing::debug;

use crate::config::FeedConfig;
use crate::db::Store;
use crate::domain::{FeedVariant, RecipeId, UserId};
use crate::services::feed_service::{FeedCard, FeedError, FeedPage, FeedService, LikeState};

pub struct SeaOrmFeedService {
    store: Store,
    config: FeedConfig,
}

impl SeaOrmFeedService {
    #[must_use]
    pub const fn new(store: Store, config: FeedConfig) -> Self {
        Self { store, config }
    }

    fn page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.config.page_size)
            .clamp(1, self.config.max_page_size.max(1))
    }

    /// Recipes that engagement may target: existing and publicly visible,
    /// or owned by the user.
    async fn ensure_visible(&self, user_id: i32, recipe: RecipeId) -> Result<(), FeedError> {
        let recipe = self
            .store
            .get_recipe(recipe.value())
            .await?
            .ok_or(FeedError::NotFound)?;

        if recipe.is_public || recipe.author_id == Some(user_id) {
            Ok(())
        } else {
            Err(FeedError::NotFound)
        }
    }
}

fn require_user(user: Option<UserId>) -> Result<i32, FeedError> {
    match user {
        Some(id) if id.is_valid() => Ok(id.value()),
        _ => Err(FeedError::Unauthorized),
    }
}

#[async_trait]
impl FeedService for SeaOrmFeedService {
    async fn feed(
        &self,
        viewer: Option<UserId>,
        variant: FeedVariant,
        cursor: Option<RecipeId>,
        limit: Option<u64>,
    ) -> Result<FeedPage, FeedError> {
        let limit = self.page_size(limit);

        // One extra row tells whether another page exists
        let mut recipes = self
            .store
            .recipe_repo()
            .feed_page(
                cursor.map(|c| c.value()),
                variant == FeedVariant::Community,
                limit + 1,
            )
            .await?;

        let has_more = recipes.len() as u64 > limit;
        recipes.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        let ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let engagement = self.store.engagement_repo();
        let likes = engagement.like_counts(&ids).await?;

        let (liked, saved) = match viewer.filter(UserId::is_valid) {
            Some(viewer) => (
                engagement.liked_among(viewer.value(), &ids).await?,
                engagement.saved_among(viewer.value(), &ids).await?,
            ),
            None => Default::default(),
        };

        let next_cursor = if has_more {
            recipes.last().map(|r| RecipeId::new(r.id))
        } else {
            None
        };

        let items = recipes
            .into_iter()
            .map(|r| FeedCard {
                id: RecipeId::new(r.id),
                likes: likes.get(&r.id).copied().unwrap_or_default(),
                is_liked: liked.contains(&r.id),
                is_saved: saved.contains(&r.id),
                title: r.name,
                media_url: r.media_url,
                media_type: r.media_type,
                duration_sec: r.duration_sec,
            })
            .collect();

        Ok(FeedPage { items, next_cursor })
    }

    async fn toggle_like(
        &self,
        user: Option<UserId>,
        recipe: RecipeId,
    ) -> Result<LikeState, FeedError> {
        let user_id = require_user(user)?;
        self.ensure_visible(user_id, recipe).await?;

        let engagement = self.store.engagement_repo();
        let liked = engagement.toggle_like(user_id, recipe.value()).await?;
        let likes = engagement.like_count(recipe.value()).await?;

        debug!(user_id, recipe_id = recipe.value(), liked, likes, "Toggled like");
        Ok(LikeState { liked, likes })
    }

    async fn toggle_save(&self, user: Option<UserId>, recipe: RecipeId) -> Result<bool, FeedError> {
        let user_id = require_user(user)?;
        self.ensure_visible(user_id, recipe).await?;

        let saved = self
            .store
            .engagement_repo()
            .toggle_save(user_id, recipe.value())
            .await?;

        debug!(user_id, recipe_id = recipe.value(), saved, "Toggled save");
        Ok(saved)
    }
}
