use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::timestamp;
use crate::entities::{categories, ingredients, instruction_steps, prelude::*, recipes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i32,
    pub author_id: Option<i32>,
    pub name: String,
    pub description: String,
    pub media_url: Option<String>,
    pub media_type: String,
    pub duration_sec: Option<i32>,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub category_id: i32,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<recipes::Model> for Recipe {
    fn from(m: recipes::Model) -> Self {
        Self {
            id: m.id,
            author_id: m.author_id,
            name: m.name,
            description: m.description,
            media_url: m.media_url,
            media_type: m.media_type,
            duration_sec: m.duration_sec,
            prep_time: m.prep_time,
            cook_time: m.cook_time,
            servings: m.servings,
            category_id: m.category_id,
            is_public: m.is_public,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub name: String,
    pub amount: String,
    pub unit: Option<String>,
}

impl From<ingredients::Model> for IngredientLine {
    fn from(m: ingredients::Model) -> Self {
        Self {
            name: m.name,
            amount: m.amount,
            unit: m.unit,
        }
    }
}

/// A validated recipe ready to be written, children included.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub description: String,
    pub media_url: Option<String>,
    pub media_type: String,
    pub duration_sec: Option<i32>,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub category_id: i32,
    pub is_public: bool,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<String>,
}

/// Escapes `LIKE` wildcards and wraps the term for a substring match.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn like_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(escape_like(term)).escape('\\')
}

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, author_id: Option<i32>, draft: RecipeDraft) -> Result<Recipe> {
        let txn = self.conn.begin().await?;
        let now = timestamp::now();

        let active = recipes::ActiveModel {
            author_id: Set(author_id),
            name: Set(draft.name),
            description: Set(draft.description),
            media_url: Set(draft.media_url),
            media_type: Set(draft.media_type),
            duration_sec: Set(draft.duration_sec),
            prep_time: Set(draft.prep_time),
            cook_time: Set(draft.cook_time),
            servings: Set(draft.servings),
            category_id: Set(draft.category_id),
            is_public: Set(draft.is_public),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&txn)
            .await
            .context("Failed to insert recipe")?;

        Self::insert_children(&txn, model.id, draft.ingredients, draft.steps).await?;
        txn.commit().await?;

        info!(recipe_id = model.id, "Created recipe");
        Ok(Recipe::from(model))
    }

    /// Overwrites the recipe row and replaces its ingredients and steps.
    pub async fn update(&self, id: i32, draft: RecipeDraft) -> Result<Option<Recipe>> {
        let txn = self.conn.begin().await?;

        let Some(existing) = Recipes::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let mut active: recipes::ActiveModel = existing.into();
        active.name = Set(draft.name);
        active.description = Set(draft.description);
        active.media_url = Set(draft.media_url);
        active.media_type = Set(draft.media_type);
        active.duration_sec = Set(draft.duration_sec);
        active.prep_time = Set(draft.prep_time);
        active.cook_time = Set(draft.cook_time);
        active.servings = Set(draft.servings);
        active.category_id = Set(draft.category_id);
        active.is_public = Set(draft.is_public);
        active.updated_at = Set(timestamp::now());
        let model = active.update(&txn).await?;

        Ingredients::delete_many()
            .filter(ingredients::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;
        InstructionSteps::delete_many()
            .filter(instruction_steps::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;

        Self::insert_children(&txn, id, draft.ingredients, draft.steps).await?;
        txn.commit().await?;

        Ok(Some(Recipe::from(model)))
    }

    async fn insert_children<C: ConnectionTrait>(
        db: &C,
        recipe_id: i32,
        lines: Vec<IngredientLine>,
        steps: Vec<String>,
    ) -> Result<()> {
        if !lines.is_empty() {
            let rows = lines.into_iter().zip(1..).map(|(line, position)| {
                ingredients::ActiveModel {
                    recipe_id: Set(recipe_id),
                    position: Set(position),
                    name: Set(line.name),
                    amount: Set(line.amount),
                    unit: Set(line.unit),
                    ..Default::default()
                }
            });
            Ingredients::insert_many(rows).exec_without_returning(db).await?;
        }

        if !steps.is_empty() {
            let rows = steps
                .into_iter()
                .zip(1..)
                .map(|(text, position)| instruction_steps::ActiveModel {
                    recipe_id: Set(recipe_id),
                    position: Set(position),
                    text: Set(text),
                    ..Default::default()
                });
            InstructionSteps::insert_many(rows)
                .exec_without_returning(db)
                .await?;
        }

        Ok(())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Recipe>> {
        Ok(Recipes::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(Recipe::from))
    }

    pub async fn ingredients(&self, recipe_id: i32) -> Result<Vec<IngredientLine>> {
        let rows = Ingredients::find()
            .filter(ingredients::Column::RecipeId.eq(recipe_id))
            .order_by_asc(ingredients::Column::Position)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(IngredientLine::from).collect())
    }

    pub async fn steps(&self, recipe_id: i32) -> Result<Vec<String>> {
        let rows = InstructionSteps::find()
            .filter(instruction_steps::Column::RecipeId.eq(recipe_id))
            .order_by_asc(instruction_steps::Column::Position)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|s| s.text).collect())
    }

    /// Public recipes plus the viewer's private ones, newest first.
    pub async fn list_visible(&self, viewer: Option<i32>) -> Result<Vec<Recipe>> {
        let mut visible = Condition::any().add(recipes::Column::IsPublic.eq(true));
        if let Some(viewer) = viewer {
            visible = visible.add(recipes::Column::AuthorId.eq(viewer));
        }

        let rows = Recipes::find()
            .filter(visible)
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    pub async fn list_by_author(&self, author_id: i32) -> Result<Vec<Recipe>> {
        let rows = Recipes::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// Fetches the given ids, keeping the order of `ids`. Missing ids are skipped.
    pub async fn get_many_ordered(&self, ids: &[i32]) -> Result<Vec<Recipe>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Recipes::find()
            .filter(recipes::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?;

        let mut by_id: std::collections::HashMap<i32, recipes::Model> =
            rows.into_iter().map(|r| (r.id, r)).collect();

        Ok(ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(Recipe::from)
            .collect())
    }

    pub async fn count_by_author(&self, author_id: i32) -> Result<u64> {
        Ok(Recipes::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .count(&self.conn)
            .await?)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Recipes::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Public recipes whose name, description or any ingredient name
    /// contains `term`, newest first.
    pub async fn search(&self, term: &str) -> Result<Vec<Recipe>> {
        let ingredient_match = Query::select()
            .column(ingredients::Column::RecipeId)
            .from(Ingredients)
            .and_where(Expr::col(ingredients::Column::Name).like(like_pattern(term)))
            .to_owned();

        let rows = Recipes::find()
            .filter(recipes::Column::IsPublic.eq(true))
            .filter(
                Condition::any()
                    .add(Expr::col(recipes::Column::Name).like(like_pattern(term)))
                    .add(Expr::col(recipes::Column::Description).like(like_pattern(term)))
                    .add(recipes::Column::Id.in_subquery(ingredient_match)),
            )
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to search recipes")?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// Public recipe names containing `term`, in id order.
    pub async fn suggest_names(&self, term: &str, limit: u64) -> Result<Vec<String>> {
        let names: Vec<String> = Recipes::find()
            .select_only()
            .column(recipes::Column::Name)
            .filter(recipes::Column::IsPublic.eq(true))
            .filter(Expr::col(recipes::Column::Name).like(like_pattern(term)))
            .order_by_asc(recipes::Column::Id)
            .limit(limit)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(names)
    }

    /// One feed page: public recipes with media, id descending, strictly
    /// below `before`. Fetches `limit` rows.
    pub async fn feed_page(
        &self,
        before: Option<i32>,
        community_only: bool,
        limit: u64,
    ) -> Result<Vec<Recipe>> {
        let mut query = Recipes::find()
            .filter(recipes::Column::IsPublic.eq(true))
            .filter(recipes::Column::MediaUrl.is_not_null());

        if let Some(before) = before {
            query = query.filter(recipes::Column::Id.lt(before));
        }
        if community_only {
            query = query.filter(recipes::Column::AuthorId.is_not_null());
        }

        let rows = query
            .order_by_desc(recipes::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// All categories, alphabetically.
    pub async fn categories(&self) -> Result<Vec<categories::Model>> {
        Ok(Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await?)
    }

    pub async fn category_by_name(&self, name: &str) -> Result<Option<categories::Model>> {
        Ok(Categories::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.conn)
            .await?)
    }

    pub async fn category_by_id(&self, id: i32) -> Result<Option<categories::Model>> {
        Ok(Categories::find_by_id(id).one(&self.conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("pasta"), "%pasta%");
        assert_eq!(escape_like(r"50%_off\now"), r"%50\%\_off\\now%");
        assert_eq!(escape_like(""), "%%");
    }
}
