//! Domain service for per-user search history.
//!
//! Every search term a user submits is kept encrypted in two collections:
//! the current occurrence in `search_history` and all earlier ones in
//! `search_log`. Reads merge both into one decrypted, newest-first view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::crypto::CipherError;
use crate::db::ClearedCounts;
use crate::domain::{HistorySource, UserId};

/// Errors specific to search history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("History entry not found")]
    NotFound,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for HistoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for HistoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<CipherError> for HistoryError {
    fn from(err: CipherError) -> Self {
        Self::Encryption(err.to_string())
    }
}

/// One decrypted entry of the merged history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedHistoryItem {
    pub id: String,
    /// Plaintext, or [`crate::crypto::DECRYPTION_FAILED`] for unreadable rows.
    pub query: String,
    pub created_at: String,
    pub source: HistorySource,
}

/// Domain service trait for search history.
#[async_trait::async_trait]
pub trait HistoryService: Send + Sync {
    /// Records one search of `raw_query` by `user`.
    ///
    /// A repeat of a term the user already searched moves the previous
    /// occurrence into the log with its original timestamp and stores a
    /// fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Unauthorized`] without a valid user and
    /// [`HistoryError::Validation`] for a blank query.
    async fn record_search(&self, user: Option<UserId>, raw_query: &str)
    -> Result<(), HistoryError>;

    /// Both collections decrypted, tagged, newest first. Empty for anonymous callers.
    async fn get_unified_history(
        &self,
        user: Option<UserId>,
    ) -> Result<Vec<UnifiedHistoryItem>, HistoryError>;

    /// Deletes one entry from the collection named by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotFound`] when the entry does not exist or
    /// belongs to someone else.
    async fn delete_item(
        &self,
        user: Option<UserId>,
        entry_id: &str,
        source: HistorySource,
    ) -> Result<(), HistoryError>;

    async fn clear_all(&self, user: Option<UserId>) -> Result<ClearedCounts, HistoryError>;

    /// Clears everything recorded since local midnight.
    async fn clear_today(&self, user: Option<UserId>) -> Result<ClearedCounts, HistoryError>;

    /// Clears entries created within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Validation`] when `start` is after `end`.
    async fn clear_range(
        &self,
        user: Option<UserId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ClearedCounts, HistoryError>;
}

/// Resolves the caller to a usable user id.
pub(crate) fn require_user(user: Option<UserId>) -> Result<i32, HistoryError> {
    match user {
        Some(id) if id.is_valid() => Ok(id.value()),
        _ => Err(HistoryError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_user_rejects_missing_and_non_positive_ids() {
        assert!(matches!(require_user(None), Err(HistoryError::Unauthorized)));
        assert!(matches!(
            require_user(Some(UserId::new(0))),
            Err(HistoryError::Unauthorized)
        ));
        assert!(matches!(
            require_user(Some(UserId::new(-4))),
            Err(HistoryError::Unauthorized)
        ));
        assert_eq!(require_user(Some(UserId::new(7))).unwrap(), 7);
    }
}
