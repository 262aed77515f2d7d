//! `SeaORM` implementation of the `HistoryService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use tracing::{debug, error, info};

use crate::crypto::Cipher;
use crate::db::{ClearedCounts, NewSearchRecord, SearchHistoryRepository, Store, StoredSearch};
use crate::domain::{HistorySource, QueryNormalization, UserId, timestamp};
use crate::services::history_service::{
    HistoryError, HistoryService, UnifiedHistoryItem, require_user,
};

pub struct SeaOrmHistoryService {
    store: Store,
    cipher: Cipher,
    normalization: QueryNormalization,
}

impl SeaOrmHistoryService {
    #[must_use]
    pub const fn new(store: Store, cipher: Cipher, normalization: QueryNormalization) -> Self {
        Self {
            store,
            cipher,
            normalization,
        }
    }

    /// One attempt at the read, archive, replace sequence.
    async fn record_once(
        &self,
        user_id: i32,
        ciphertext: &str,
        fingerprint: &str,
    ) -> Result<(), DbErr> {
        let ciphertext = ciphertext.to_string();
        let fingerprint = fingerprint.to_string();

        self.store
            .with_transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    let previous =
                        SearchHistoryRepository::find_history_by_fingerprint(txn, user_id, &fingerprint)
                            .await?;

                    if let Some(previous) = previous {
                        SearchHistoryRepository::insert_log(
                            txn,
                            NewSearchRecord {
                                user_id,
                                ciphertext: previous.query,
                                fingerprint: previous.query_hash,
                                created_at: previous.created_at,
                            },
                        )
                        .await?;
                        SearchHistoryRepository::delete_history(txn, &previous.id, user_id).await?;
                    }

                    SearchHistoryRepository::insert_history(
                        txn,
                        NewSearchRecord {
                            user_id,
                            ciphertext,
                            fingerprint,
                            created_at: timestamp::now(),
                        },
                    )
                    .await?;

                    Ok(())
                })
            })
            .await
    }

    fn to_item(&self, row: StoredSearch, source: HistorySource) -> UnifiedHistoryItem {
        UnifiedHistoryItem {
            query: self.cipher.decrypt(&row.query),
            id: row.id,
            created_at: row.created_at,
            source,
        }
    }
}

/// A concurrent writer got there first: either it inserted the same
/// fingerprint, or it committed between this transaction's read and write
/// (`SQLITE_BUSY` and its extended codes such as `SQLITE_BUSY_SNAPSHOT`).
fn is_write_conflict(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    let sqlx_err = match err {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e,
        _ => return false,
    };

    sqlx_err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| is_busy_code(&code))
}

/// SQLite extended result codes keep the primary code in the low byte.
fn is_busy_code(code: &str) -> bool {
    const SQLITE_BUSY: i32 = 5;
    code.parse::<i32>()
        .is_ok_and(|code| code & 0xff == SQLITE_BUSY)
}

/// Newest first. Equal timestamps fall back to source, then id.
pub(crate) fn sort_unified(items: &mut [UnifiedHistoryItem]) {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl HistoryService for SeaOrmHistoryService {
    async fn record_search(
        &self,
        user: Option<UserId>,
        raw_query: &str,
    ) -> Result<(), HistoryError> {
        let user_id = require_user(user)?;

        let query = self
            .normalization
            .apply(raw_query)
            .ok_or_else(|| HistoryError::Validation("Search query cannot be empty".to_string()))?;

        let fingerprint = Cipher::fingerprint(&query);
        let ciphertext = self.cipher.encrypt(&query)?;

        match self.record_once(user_id, &ciphertext, &fingerprint).await {
            Ok(()) => {}
            Err(e) if is_write_conflict(&e) => {
                debug!(user_id, error = %e, "Search history write conflict, retrying once");
                match self.record_once(user_id, &ciphertext, &fingerprint).await {
                    Ok(()) => {}
                    Err(e) if is_write_conflict(&e) => {
                        debug!(user_id, "Search already recorded by a concurrent request");
                    }
                    Err(e) => {
                        error!(user_id, error = %e, "Failed to record search");
                        return Err(e.into());
                    }
                }
            }
            Err(e) => {
                error!(user_id, error = %e, "Failed to record search");
                return Err(e.into());
            }
        }

        debug!(user_id, "Recorded search");
        Ok(())
    }

    async fn get_unified_history(
        &self,
        user: Option<UserId>,
    ) -> Result<Vec<UnifiedHistoryItem>, HistoryError> {
        let Ok(user_id) = require_user(user) else {
            return Ok(Vec::new());
        };

        let repo = self.store.search_history_repo();
        let (history, log) = tokio::try_join!(repo.list_history(user_id), repo.list_log(user_id))?;

        let mut items: Vec<UnifiedHistoryItem> = history
            .into_iter()
            .map(|row| self.to_item(row, HistorySource::History))
            .chain(log.into_iter().map(|row| self.to_item(row, HistorySource::Log)))
            .collect();

        sort_unified(&mut items);
        Ok(items)
    }

    async fn delete_item(
        &self,
        user: Option<UserId>,
        entry_id: &str,
        source: HistorySource,
    ) -> Result<(), HistoryError> {
        let user_id = require_user(user)?;
        let repo = self.store.search_history_repo();

        let removed = match source {
            HistorySource::History => repo.remove_history(entry_id, user_id).await?,
            HistorySource::Log => repo.remove_log(entry_id, user_id).await?,
        };

        if !removed {
            return Err(HistoryError::NotFound);
        }

        debug!(user_id, entry_id, %source, "Deleted history entry");
        Ok(())
    }

    async fn clear_all(&self, user: Option<UserId>) -> Result<ClearedCounts, HistoryError> {
        let user_id = require_user(user)?;
        let counts = self
            .store
            .search_history_repo()
            .delete_all_for_user(user_id)
            .await?;

        info!(user_id, history = counts.history, log = counts.log, "Cleared search history");
        Ok(counts)
    }

    async fn clear_today(&self, user: Option<UserId>) -> Result<ClearedCounts, HistoryError> {
        let user_id = require_user(user)?;
        let since = timestamp::start_of_local_day(Local::now());

        let counts = self
            .store
            .search_history_repo()
            .delete_created_since(user_id, since)
            .await?;

        info!(
            user_id,
            since = %since,
            history = counts.history,
            log = counts.log,
            "Cleared today's search history"
        );
        Ok(counts)
    }

    async fn clear_range(
        &self,
        user: Option<UserId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ClearedCounts, HistoryError> {
        let user_id = require_user(user)?;

        if start > end {
            return Err(HistoryError::Validation(
                "Range start must not be after its end".to_string(),
            ));
        }

        let counts = self
            .store
            .search_history_repo()
            .delete_created_between(user_id, start, end)
            .await?;

        info!(
            user_id,
            start = %start,
            end = %end,
            history = counts.history,
            log = counts.log,
            "Cleared search history range"
        );
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, created_at: &str, source: HistorySource) -> UnifiedHistoryItem {
        UnifiedHistoryItem {
            id: id.to_string(),
            query: "q".to_string(),
            created_at: created_at.to_string(),
            source,
        }
    }

    #[test]
    fn sort_unified_orders_newest_first_across_sources() {
        let mut items = vec![
            item("a", "2025-01-01T10:00:00.000000Z", HistorySource::Log),
            item("b", "2025-01-03T10:00:00.000000Z", HistorySource::History),
            item("c", "2025-01-02T10:00:00.000000Z", HistorySource::Log),
            item("d", "2025-01-02T10:00:00.000000Z", HistorySource::History),
        ];

        sort_unified(&mut items);

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "c", "a"]);
    }

    #[test]
    fn busy_codes_include_extended_variants() {
        assert!(is_busy_code("5"));
        assert!(is_busy_code("517"));
        assert!(is_busy_code("261"));
        assert!(!is_busy_code("6"));
        assert!(!is_busy_code("2067"));
        assert!(!is_busy_code("locked"));
    }

    #[test]
    fn other_errors_are_not_write_conflicts() {
        assert!(!is_write_conflict(&DbErr::Custom("boom".to_string())));
        assert!(!is_write_conflict(&DbErr::RecordNotFound("x".to_string())));
    }
}
