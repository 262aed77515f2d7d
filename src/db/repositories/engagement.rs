use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

use crate::domain::timestamp;
use crate::entities::{prelude::*, recipe_likes, recipes, saved_recipes};

/// Likes and saved recipes.
pub struct EngagementRepository {
    conn: DatabaseConnection,
}

impl EngagementRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Flips the like of `user_id` on `recipe_id`. Returns the new state.
    pub async fn toggle_like(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let removed = RecipeLikes::delete_by_id((user_id, recipe_id))
            .exec(&txn)
            .await?
            .rows_affected
            > 0;

        if !removed {
            let like = recipe_likes::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                created_at: Set(timestamp::now()),
            };
            RecipeLikes::insert(like).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;
        Ok(!removed)
    }

    pub async fn toggle_save(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let removed = SavedRecipes::delete_by_id((user_id, recipe_id))
            .exec(&txn)
            .await?
            .rows_affected
            > 0;

        if !removed {
            let saved = saved_recipes::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                created_at: Set(timestamp::now()),
            };
            SavedRecipes::insert(saved).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;
        Ok(!removed)
    }

    pub async fn like_count(&self, recipe_id: i32) -> Result<u64> {
        Ok(RecipeLikes::find()
            .filter(recipe_likes::Column::RecipeId.eq(recipe_id))
            .count(&self.conn)
            .await?)
    }

    /// Like counts for a batch of recipes. Recipes without likes are absent.
    pub async fn like_counts(&self, recipe_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = RecipeLikes::find()
            .select_only()
            .column(recipe_likes::Column::RecipeId)
            .column_as(Expr::col(recipe_likes::Column::UserId).count(), "likes")
            .filter(recipe_likes::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .group_by(recipe_likes::Column::RecipeId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, n)| (id, u64::try_from(n).unwrap_or_default()))
            .collect())
    }

    /// Which of `recipe_ids` the user has liked.
    pub async fn liked_among(&self, user_id: i32, recipe_ids: &[i32]) -> Result<HashSet<i32>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i32> = RecipeLikes::find()
            .select_only()
            .column(recipe_likes::Column::RecipeId)
            .filter(recipe_likes::Column::UserId.eq(user_id))
            .filter(recipe_likes::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Which of `recipe_ids` the user has saved.
    pub async fn saved_among(&self, user_id: i32, recipe_ids: &[i32]) -> Result<HashSet<i32>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i32> = SavedRecipes::find()
            .select_only()
            .column(saved_recipes::Column::RecipeId)
            .filter(saved_recipes::Column::UserId.eq(user_id))
            .filter(saved_recipes::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Saved recipe ids, most recently saved first.
    pub async fn saved_recipe_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let ids: Vec<i32> = SavedRecipes::find()
            .select_only()
            .column(saved_recipes::Column::RecipeId)
            .filter(saved_recipes::Column::UserId.eq(user_id))
            .order_by_desc(saved_recipes::Column::CreatedAt)
            .order_by_desc(saved_recipes::Column::RecipeId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(ids)
    }

    pub async fn saved_count(&self, user_id: i32) -> Result<u64> {
        Ok(SavedRecipes::find()
            .filter(saved_recipes::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await?)
    }

    /// Likes received across every recipe authored by `user_id`.
    pub async fn likes_received(&self, user_id: i32) -> Result<u64> {
        Ok(RecipeLikes::find()
            .join(JoinType::InnerJoin, recipe_likes::Relation::Recipe.def())
            .filter(recipes::Column::AuthorId.eq(user_id))
            .count(&self.conn)
            .await?)
    }
}
