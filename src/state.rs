use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::crypto::{Cipher, EncryptionKey};
use crate::db::Store;
use crate::domain::UserId;
use crate::services::{
    AccountService, FeedService, HistoryService, ProfileService, RecipeService,
    SeaOrmAccountService, SeaOrmFeedService, SeaOrmHistoryService, SeaOrmProfileService,
    SeaOrmRecipeService, SeaOrmSearchService, SearchService,
};

/// Everything a command needs, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub history: Arc<dyn HistoryService>,

    pub search: Arc<dyn SearchService>,

    pub accounts: Arc<dyn AccountService>,

    pub recipes: Arc<dyn RecipeService>,

    pub feed: Arc<dyn FeedService>,

    pub profiles: Arc<dyn ProfileService>,
}

impl AppState {
    /// Opens the database and builds every service.
    ///
    /// Fails when the search history key is missing or malformed, before
    /// any request can be served.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let key = EncryptionKey::from_config(&config.search_history)
            .context("Search history encryption is not configured")?;
        let cipher = Cipher::new(&key);

        let history = Arc::new(SeaOrmHistoryService::new(
            store.clone(),
            cipher,
            config.search_history.normalization,
        )) as Arc<dyn HistoryService>;

        let search = Arc::new(SeaOrmSearchService::new(
            store.clone(),
            history.clone(),
            config.search.clone(),
        )) as Arc<dyn SearchService>;

        let accounts = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService>;

        let recipes = Arc::new(SeaOrmRecipeService::new(store.clone())) as Arc<dyn RecipeService>;

        let feed =
            Arc::new(SeaOrmFeedService::new(store.clone(), config.feed.clone())) as Arc<dyn FeedService>;

        let profiles = Arc::new(SeaOrmProfileService::new(store.clone())) as Arc<dyn ProfileService>;

        info!(
            normalization = ?config.search_history.normalization,
            "Services initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            history,
            search,
            accounts,
            recipes,
            feed,
            profiles,
        })
    }

    /// Resolves a session token to its user. No token means anonymous.
    pub async fn current_user(&self, token: Option<&str>) -> anyhow::Result<Option<UserId>> {
        match token {
            Some(token) => Ok(self.accounts.resolve_session(token).await?),
            None => Ok(None),
        }
    }

    /// Like [`Self::current_user`] but fails for anonymous callers.
    pub async fn require_user(&self, token: Option<&str>) -> anyhow::Result<UserId> {
        self.current_user(token).await?.ok_or_else(|| {
            anyhow::anyhow!(
                "Not logged in. Run `recipeshare login` and pass the token with --token or RECIPESHARE_TOKEN"
            )
        })
    }
}
