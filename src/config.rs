use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::QueryNormalization;

/// Environment variable holding the base64 search-history key.
pub const ENCRYPTION_KEY_ENV: &str = "SEARCH_HISTORY_ENCRYPTION_KEY";

/// Environment variable overriding `general.database_path`.
pub const DATABASE_ENV: &str = "RECIPESHARE_DATABASE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub security: SecurityConfig,

    pub search_history: SearchHistoryConfig,

    pub search: SearchConfig,

    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/recipeshare.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    /// Lifetime of a login session in days.
    pub session_ttl_days: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            session_ttl_days: 7,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHistoryConfig {
    /// Base64 encoded 32-byte AES key. The `SEARCH_HISTORY_ENCRYPTION_KEY`
    /// environment variable takes precedence over this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,

    pub normalization: QueryNormalization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Total number of autocomplete suggestions returned.
    pub suggestion_limit: usize,

    /// Maximum number of recipe names fetched for suggestions.
    pub recipe_suggestion_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: 10,
            recipe_suggestion_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: u64,

    pub max_page_size: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            max_page_size: 50,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            security: SecurityConfig::default(),
            search_history: SearchHistoryConfig::default(),
            search: SearchConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and process
    /// environment overrides.
    pub fn load() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let paths = Self::config_paths();

        let mut config = paths
            .iter()
            .find(|p| p.exists())
            .map_or_else(
                || {
                    info!("No config file found, using defaults");
                    Ok(Self::default())
                },
                |path| {
                    info!("Loading config from: {}", path.display());
                    Self::load_from_path(path)
                },
            )?;

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENCRYPTION_KEY_ENV) {
            if !key.trim().is_empty() {
                self.search_history.encryption_key = Some(key);
            }
        }

        if let Ok(db) = std::env::var(DATABASE_ENV) {
            if !db.trim().is_empty() {
                self.general.database_path = db;
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("recipeshare").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".recipeshare").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Checks settings that can be validated without touching the database.
    ///
    /// The encryption key is validated separately when the cipher is built,
    /// see [`crate::crypto::EncryptionKey::from_config`].
    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("general.database_path cannot be empty");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections must not exceed max_db_connections");
        }

        if !matches!(self.general.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "general.log_format must be \"pretty\" or \"json\", got {:?}",
                self.general.log_format
            );
        }

        if self.security.session_ttl_days <= 0 {
            anyhow::bail!("security.session_ttl_days must be positive");
        }

        if self.search.suggestion_limit == 0 {
            anyhow::bail!("search.suggestion_limit must be at least 1");
        }

        if self.feed.page_size == 0 || self.feed.page_size > self.feed.max_page_size {
            anyhow::bail!("feed.page_size must be between 1 and feed.max_page_size");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.security.session_ttl_days, 7);
        assert_eq!(config.search.suggestion_limit, 10);
        assert_eq!(
            config.search_history.normalization,
            QueryNormalization::Trim
        );
        assert!(config.search_history.encryption_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[search_history]"));
        assert!(!toml_str.contains("encryption_key"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [search_history]
            normalization = "trim_and_fold"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(
            config.search_history.normalization,
            QueryNormalization::TrimAndFold
        );
        assert_eq!(config.feed.page_size, 5);
    }

    #[test]
    fn test_validate_rejects_bad_log_format() {
        let mut config = Config::default();
        config.general.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
