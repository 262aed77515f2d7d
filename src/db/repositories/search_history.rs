//! Persistence for the two search-history collections.
//!
//! `search_history` holds the latest occurrence of each term per user and
//! `search_log` holds every earlier one. Row-level functions are generic over
//! the connection so the same code runs inside [`crate::db::with_transaction`]
//! and on the pool. Bulk deletes always touch both tables in one transaction.

use crate::db::with_transaction;
use crate::domain::timestamp;
use crate::entities::{prelude::*, search_history, search_log};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

/// A row of either collection. `query` is still the ciphertext envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSearch {
    pub id: String,
    pub user_id: i32,
    pub query: String,
    pub query_hash: String,
    pub created_at: String,
}

impl From<search_history::Model> for StoredSearch {
    fn from(m: search_history::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            query: m.query,
            query_hash: m.query_hash,
            created_at: m.created_at,
        }
    }
}

impl From<search_log::Model> for StoredSearch {
    fn from(m: search_log::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            query: m.query,
            query_hash: m.query_hash,
            created_at: m.created_at,
        }
    }
}

/// Insert request for either collection. The timestamp is always supplied
/// by the caller: "now" for history, the displaced row's time for the log.
#[derive(Debug, Clone)]
pub struct NewSearchRecord {
    pub user_id: i32,
    pub ciphertext: String,
    pub fingerprint: String,
    pub created_at: String,
}

/// Rows removed from each table by a bulk delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ClearedCounts {
    pub history: u64,
    pub log: u64,
}

impl ClearedCounts {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.history + self.log
    }
}

/// Which rows a bulk delete covers, always within one user's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedRange {
    All,
    /// Inclusive on both ends
    Between(DateTime<Utc>, DateTime<Utc>),
    /// Inclusive lower bound
    Since(DateTime<Utc>),
}

pub struct SearchHistoryRepository {
    conn: DatabaseConnection,
}

impl SearchHistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_history_by_fingerprint<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        fingerprint: &str,
    ) -> Result<Option<StoredSearch>, DbErr> {
        let row = SearchHistory::find()
            .filter(search_history::Column::UserId.eq(user_id))
            .filter(search_history::Column::QueryHash.eq(fingerprint))
            .one(db)
            .await?;

        Ok(row.map(StoredSearch::from))
    }

    pub async fn insert_history<C: ConnectionTrait>(
        db: &C,
        record: NewSearchRecord,
    ) -> Result<StoredSearch, DbErr> {
        let id = uuid::Uuid::new_v4().to_string();

        let active = search_history::ActiveModel {
            id: Set(id.clone()),
            user_id: Set(record.user_id),
            query: Set(record.ciphertext.clone()),
            query_hash: Set(record.fingerprint.clone()),
            created_at: Set(record.created_at.clone()),
        };

        // exec_without_returning: String primary keys are not auto-generated
        SearchHistory::insert(active).exec_without_returning(db).await?;

        Ok(StoredSearch {
            id,
            user_id: record.user_id,
            query: record.ciphertext,
            query_hash: record.fingerprint,
            created_at: record.created_at,
        })
    }

    pub async fn insert_log<C: ConnectionTrait>(
        db: &C,
        record: NewSearchRecord,
    ) -> Result<StoredSearch, DbErr> {
        let id = uuid::Uuid::new_v4().to_string();

        let active = search_log::ActiveModel {
            id: Set(id.clone()),
            user_id: Set(record.user_id),
            query: Set(record.ciphertext.clone()),
            query_hash: Set(record.fingerprint.clone()),
            created_at: Set(record.created_at.clone()),
        };

        SearchLog::insert(active).exec_without_returning(db).await?;

        Ok(StoredSearch {
            id,
            user_id: record.user_id,
            query: record.ciphertext,
            query_hash: record.fingerprint,
            created_at: record.created_at,
        })
    }

    /// Deletes a history row owned by `user_id`. Returns whether a row went away.
    pub async fn delete_history<C: ConnectionTrait>(
        db: &C,
        entry_id: &str,
        user_id: i32,
    ) -> Result<bool, DbErr> {
        let result = SearchHistory::delete_many()
            .filter(search_history::Column::Id.eq(entry_id))
            .filter(search_history::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_log<C: ConnectionTrait>(
        db: &C,
        entry_id: &str,
        user_id: i32,
    ) -> Result<bool, DbErr> {
        let result = SearchLog::delete_many()
            .filter(search_log::Column::Id.eq(entry_id))
            .filter(search_log::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Newest first.
    pub async fn list_history(&self, user_id: i32) -> Result<Vec<StoredSearch>, DbErr> {
        let rows = SearchHistory::find()
            .filter(search_history::Column::UserId.eq(user_id))
            .order_by_desc(search_history::Column::CreatedAt)
            .order_by_desc(search_history::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(StoredSearch::from).collect())
    }

    /// Newest first.
    pub async fn list_log(&self, user_id: i32) -> Result<Vec<StoredSearch>, DbErr> {
        let rows = SearchLog::find()
            .filter(search_log::Column::UserId.eq(user_id))
            .order_by_desc(search_log::Column::CreatedAt)
            .order_by_desc(search_log::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(StoredSearch::from).collect())
    }

    pub async fn delete_all_for_user(&self, user_id: i32) -> Result<ClearedCounts, DbErr> {
        self.delete_range(user_id, CreatedRange::All).await
    }

    pub async fn delete_created_between(
        &self,
        user_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ClearedCounts, DbErr> {
        self.delete_range(user_id, CreatedRange::Between(start, end))
            .await
    }

    pub async fn delete_created_since(
        &self,
        user_id: i32,
        since: DateTime<Utc>,
    ) -> Result<ClearedCounts, DbErr> {
        self.delete_range(user_id, CreatedRange::Since(since)).await
    }

    async fn delete_range(
        &self,
        user_id: i32,
        range: CreatedRange,
    ) -> Result<ClearedCounts, DbErr> {
        with_transaction(&self.conn, move |txn| {
            Box::pin(async move { Self::delete_range_in(txn, user_id, range).await })
        })
        .await
    }

    /// Deletes matching rows from both tables on `db`. Callers outside a
    /// transaction should use the `delete_*` methods instead.
    pub async fn delete_range_in<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        range: CreatedRange,
    ) -> Result<ClearedCounts, DbErr> {
        let mut log = SearchLog::delete_many().filter(search_log::Column::UserId.eq(user_id));
        let mut history =
            SearchHistory::delete_many().filter(search_history::Column::UserId.eq(user_id));

        match range {
            CreatedRange::All => {}
            CreatedRange::Between(start, end) => {
                let (start, end) = (timestamp::format(start), timestamp::format(end));
                log = log
                    .filter(search_log::Column::CreatedAt.gte(start.clone()))
                    .filter(search_log::Column::CreatedAt.lte(end.clone()));
                history = history
                    .filter(search_history::Column::CreatedAt.gte(start))
                    .filter(search_history::Column::CreatedAt.lte(end));
            }
            CreatedRange::Since(since) => {
                let since = timestamp::format(since);
                log = log.filter(search_log::Column::CreatedAt.gte(since.clone()));
                history = history.filter(search_history::Column::CreatedAt.gte(since));
            }
        }

        let log = log.exec(db).await?.rows_affected;
        let history = history.exec(db).await?.rows_affected;

        Ok(ClearedCounts { history, log })
    }

    /// Row-level helpers bound to the pool, for callers outside a transaction.
    pub async fn remove_history(&self, entry_id: &str, user_id: i32) -> Result<bool, DbErr> {
        Self::delete_history(&self.conn, entry_id, user_id).await
    }

    pub async fn remove_log(&self, entry_id: &str, user_id: i32) -> Result<bool, DbErr> {
        Self::delete_log(&self.conn, entry_id, user_id).await
    }

    pub async fn add_log(&self, record: NewSearchRecord) -> Result<StoredSearch, DbErr> {
        Self::insert_log(&self.conn, record).await
    }
}
