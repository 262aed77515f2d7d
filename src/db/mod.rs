use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionError, TransactionTrait,
};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;
use tracing::{info, warn};

pub mod migrator;
pub mod repositories;

pub use repositories::engagement::EngagementRepository;
pub use repositories::recipe::{IngredientLine, Recipe, RecipeDraft, RecipeRepository};
pub use repositories::search_history::{
    ClearedCounts, CreatedRange, NewSearchRecord, SearchHistoryRepository, StoredSearch,
};
pub use repositories::session::{Session, SessionRepository};
pub use repositories::user::{NewUser, User, UserRepository};

/// Runs `f` inside a transaction on `conn`.
///
/// Commits when `f` returns `Ok`, rolls back on `Err` or when the future is
/// dropped. Errors starting or committing the transaction are converted into
/// the caller's error type.
pub async fn with_transaction<F, T, E>(conn: &DatabaseConnection, f: F) -> Result<T, E>
where
    F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
        + Send,
    T: Send,
    E: From<DbErr> + std::fmt::Display + std::fmt::Debug + Send,
{
    conn.transaction::<F, T, E>(f).await.map_err(|e| match e {
        TransactionError::Connection(db) => E::from(db),
        TransactionError::Transaction(inner) => inner,
    })
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        if !in_memory {
            // Readers keep going while a writer holds the lock
            let backend = conn.get_database_backend();
            if let Err(e) = conn
                .execute(Statement::from_string(
                    backend,
                    "PRAGMA journal_mode=WAL".to_string(),
                ))
                .await
            {
                warn!(error = %e, "Could not enable WAL journal mode");
            }
        }

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// See [`with_transaction`].
    pub async fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: From<DbErr> + std::fmt::Display + std::fmt::Debug + Send,
    {
        with_transaction(&self.conn, f).await
    }

    #[must_use]
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn session_repo(&self) -> SessionRepository {
        SessionRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn recipe_repo(&self) -> RecipeRepository {
        RecipeRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn engagement_repo(&self) -> EngagementRepository {
        EngagementRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn search_history_repo(&self) -> SearchHistoryRepository {
        SearchHistoryRepository::new(self.conn.clone())
    }

    // ========== User Repository Methods ==========

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    // ========== Session Repository Methods ==========

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.session_repo().purge_expired().await
    }

    // ========== Recipe Repository Methods ==========

    pub async fn get_recipe(&self, id: i32) -> Result<Option<Recipe>> {
        self.recipe_repo().get(id).await
    }

    pub async fn search_recipes(&self, term: &str) -> Result<Vec<Recipe>> {
        self.recipe_repo().search(term).await
    }

    pub async fn suggest_recipe_names(&self, term: &str, limit: u64) -> Result<Vec<String>> {
        self.recipe_repo().suggest_names(term, limit).await
    }

    pub async fn list_category_names(&self) -> Result<Vec<String>> {
        Ok(self
            .recipe_repo()
            .categories()
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (Store, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("recipeshare-db-{}.db", uuid::Uuid::new_v4()));
        let store = Store::new(&format!("sqlite:{}", path.display()))
            .await
            .unwrap();
        (store, path)
    }

    #[tokio::test]
    async fn migrations_seed_categories() {
        let (store, path) = temp_store().await;
        let names = store.list_category_names().await.unwrap();
        assert_eq!(
            names.len(),
            migrator::m20250602_seed_categories::DEFAULT_CATEGORIES.len()
        );
        assert!(names.windows(2).all(|w| w[0] <= w[1]));

        drop(store);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn with_transaction_rolls_back_on_error() {
        let (store, path) = temp_store().await;
        let user = store
            .user_repo()
            .create(NewUser {
                username: "rollback".into(),
                email: "rollback@example.com".into(),
                password_hash: "x".into(),
                birthdate: None,
                phone: None,
                country: None,
            })
            .await
            .unwrap();

        let result: Result<(), DbErr> = store
            .with_transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    SearchHistoryRepository::insert_history(
                        txn,
                        NewSearchRecord {
                            user_id: user.id,
                            ciphertext: "00:11:22".into(),
                            fingerprint: "f".into(),
                            created_at: crate::domain::timestamp::now(),
                        },
                    )
                    .await?;
                    Err(DbErr::Custom("abort".into()))
                })
            })
            .await;

        assert!(result.is_err());
        assert!(
            store
                .search_history_repo()
                .list_history(user.id)
                .await
                .unwrap()
                .is_empty()
        );

        drop(store);
        let _ = std::fs::remove_file(path);
    }
}
