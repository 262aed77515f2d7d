//! Domain service for accounts and login sessions.

use serde::Serialize;
use thiserror::Error;

use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} is already registered")]
    Conflict(String),

    #[error("User not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration form.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub birthdate: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

/// A successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    pub expires_at: String,
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AccountError::Conflict`] when the email or username is taken.
    async fn register(&self, account: NewAccount) -> Result<AccountInfo, AccountError>;

    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] for an unknown email or a
    /// wrong password alike.
    async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AccountError>;

    /// The user behind a live session token, if any.
    async fn resolve_session(&self, token: &str) -> Result<Option<UserId>, AccountError>;

    async fn logout(&self, token: &str) -> Result<(), AccountError>;

    async fn account_info(&self, user: Option<UserId>) -> Result<AccountInfo, AccountError>;

    /// Changes the password and revokes every other session of the user.
    async fn change_password(
        &self,
        user: Option<UserId>,
        current_token: Option<&str>,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;

    /// Removes expired sessions. Returns how many were removed.
    async fn purge_expired_sessions(&self) -> Result<u64, AccountError>;
}
