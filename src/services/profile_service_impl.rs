//! `SeaORM` implementation of the `ProfileService` trait.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

use crate::db::Store;
use crate::domain::UserId;
use crate::services::profile_service::{Profile, ProfileError, ProfileService};
use crate::services::recipe_service::RecipeSummary;
use crate::services::recipe_service_impl::summarize;
use crate::services::validation;

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn category_names(&self) -> Result<HashMap<i32, String>, ProfileError> {
        Ok(self
            .store
            .recipe_repo()
            .categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }
}

fn require_user(user: Option<UserId>) -> Result<i32, ProfileError> {
    match user {
        Some(id) if id.is_valid() => Ok(id.value()),
        _ => Err(ProfileError::Unauthorized),
    }
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn profile(&self, user: Option<UserId>) -> Result<Profile, ProfileError> {
        let user_id = require_user(user)?;
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;

        let engagement = self.store.engagement_repo();
        let recipe_count = self.store.recipe_repo().count_by_author(user_id).await?;
        let saved_count = engagement.saved_count(user_id).await?;
        let likes_received = engagement.likes_received(user_id).await?;

        Ok(Profile {
            username: user.username,
            email: user.email,
            country: user.country,
            profile_image_url: user.profile_image_url,
            member_since: user.created_at,
            recipe_count,
            saved_count,
            likes_received,
        })
    }

    async fn update_profile_image(
        &self,
        user: Option<UserId>,
        url: &str,
    ) -> Result<(), ProfileError> {
        let user_id = require_user(user)?;
        let url = validation::validate_http_url(url).map_err(ProfileError::Validation)?;

        if self.store.get_user(user_id).await?.is_none() {
            return Err(ProfileError::NotFound);
        }

        self.store
            .user_repo()
            .update_profile_image(user_id, &url)
            .await?;

        info!(user_id, "Profile image updated");
        Ok(())
    }

    async fn own_recipes(&self, user: Option<UserId>) -> Result<Vec<RecipeSummary>, ProfileError> {
        let user_id = require_user(user)?;
        let categories = self.category_names().await?;

        let recipes = self.store.recipe_repo().list_by_author(user_id).await?;
        Ok(recipes
            .into_iter()
            .map(|r| summarize(r, &categories))
            .collect())
    }

    async fn saved_recipes(
        &self,
        user: Option<UserId>,
    ) -> Result<Vec<RecipeSummary>, ProfileError> {
        let user_id = require_user(user)?;
        let categories = self.category_names().await?;

        let ids = self.store.engagement_repo().saved_recipe_ids(user_id).await?;
        let recipes = self.store.recipe_repo().get_many_ordered(&ids).await?;

        // A saved recipe its author later made private drops out
        Ok(recipes
            .into_iter()
            .filter(|r| r.is_public || r.author_id == Some(user_id))
            .map(|r| summarize(r, &categories))
            .collect())
    }
}
