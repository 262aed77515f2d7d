//! Domain service for recipe lookup and autocomplete.

use serde::Serialize;
use thiserror::Error;

use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for SearchError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A recipe found by [`SearchService::search_recipes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeMatch {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    History,
    Recipe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

impl Suggestion {
    #[must_use]
    pub fn history(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: SuggestionKind::History,
        }
    }

    #[must_use]
    pub fn recipe(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: SuggestionKind::Recipe,
        }
    }
}

#[async_trait::async_trait]
pub trait SearchService: Send + Sync {
    /// Public recipes whose name, description or ingredients contain
    /// `query`, ignoring case. A blank query matches nothing.
    async fn search_recipes(&self, query: &str) -> Result<Vec<RecipeMatch>, SearchError>;

    /// Autocomplete for `partial`: the caller's own matching history
    /// first, then matching recipe names.
    async fn get_suggestions(
        &self,
        user: Option<UserId>,
        partial: &str,
    ) -> Result<Vec<Suggestion>, SearchError>;

    /// Runs [`Self::search_recipes`] and records the query in the caller's
    /// history. Recording problems are logged, never returned.
    async fn search(
        &self,
        user: Option<UserId>,
        query: &str,
    ) -> Result<Vec<RecipeMatch>, SearchError>;
}
