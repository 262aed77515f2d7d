//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password_blocking;
use crate::db::{NewUser, Store};
use crate::domain::UserId;
use crate::services::account_service::{
    AccountError, AccountInfo, AccountService, LoginSession, NewAccount,
};
use crate::services::validation;

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

fn require_user(user: Option<UserId>) -> Result<i32, AccountError> {
    match user {
        Some(id) if id.is_valid() => Ok(id.value()),
        _ => Err(AccountError::Unauthorized),
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, account: NewAccount) -> Result<AccountInfo, AccountError> {
        let username =
            validation::validate_username(&account.username).map_err(AccountError::Validation)?;
        let email = validation::validate_email(&account.email).map_err(AccountError::Validation)?;
        validation::validate_password(&account.password).map_err(AccountError::Validation)?;
        let country = validation::validate_country(account.country.as_deref())
            .map_err(AccountError::Validation)?;
        let birthdate = validation::validate_birthdate(account.birthdate.as_deref())
            .map_err(AccountError::Validation)?;
        let phone = account
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AccountError::Conflict("Email".to_string()));
        }
        if self.store.get_user_by_username(&username).await?.is_some() {
            return Err(AccountError::Conflict("Username".to_string()));
        }

        let password_hash = hash_password_blocking(&account.password, &self.security).await?;

        let user = self
            .store
            .user_repo()
            .create(NewUser {
                username,
                email,
                password_hash,
                birthdate,
                phone,
                country,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "Registered account");

        Ok(AccountInfo {
            id: UserId::new(user.id),
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AccountError> {
        let email = email.trim().to_lowercase();

        let Some(user) = self.store.user_repo().verify_password(&email, password).await? else {
            warn!("Failed login attempt");
            return Err(AccountError::InvalidCredentials);
        };

        let ttl = chrono::Duration::days(self.security.session_ttl_days);
        let session = self.store.session_repo().create(user.id, ttl).await?;

        info!(user_id = user.id, "User logged in");

        Ok(LoginSession {
            token: session.token,
            user_id: UserId::new(user.id),
            username: user.username,
            expires_at: session.expires_at,
        })
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<UserId>, AccountError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let session = self.store.session_repo().find_valid(token).await?;
        Ok(session.map(|s| UserId::new(s.user_id)))
    }

    async fn logout(&self, token: &str) -> Result<(), AccountError> {
        self.store.session_repo().delete(token.trim()).await?;
        Ok(())
    }

    async fn account_info(&self, user: Option<UserId>) -> Result<AccountInfo, AccountError> {
        let user_id = require_user(user)?;
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        Ok(AccountInfo {
            id: UserId::new(user.id),
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        })
    }

    async fn change_password(
        &self,
        user: Option<UserId>,
        current_token: Option<&str>,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let user_id = require_user(user)?;

        validation::validate_password(new_password).map_err(AccountError::Validation)?;

        if current_password == new_password {
            return Err(AccountError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let repo = self.store.user_repo();
        if !repo.verify_password_for_id(user_id, current_password).await? {
            return Err(AccountError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = hash_password_blocking(new_password, &self.security).await?;
        repo.update_password_hash(user_id, new_hash).await?;

        let revoked = self
            .store
            .session_repo()
            .delete_for_user_except(user_id, current_token)
            .await?;

        info!(user_id, revoked, "Password changed");
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> Result<u64, AccountError> {
        let purged = self.store.purge_expired_sessions().await?;
        if purged > 0 {
            info!(purged, "Purged expired sessions");
        }
        Ok(purged)
    }
}
