use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::timestamp;
use crate::entities::{prelude::*, sessions};

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: i32,
    pub expires_at: String,
}

impl From<sessions::Model> for Session {
    fn from(m: sessions::Model) -> Self {
        Self {
            token: m.token,
            user_id: m.user_id,
            expires_at: m.expires_at,
        }
    }
}

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: i32, ttl: Duration) -> Result<Session> {
        let now = Utc::now();
        let token = generate_session_token();
        let expires_at = timestamp::format(now + ttl);

        let active = sessions::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user_id),
            expires_at: Set(expires_at.clone()),
            created_at: Set(timestamp::format(now)),
        };

        Sessions::insert(active)
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to create session")?;

        Ok(Session {
            token,
            user_id,
            expires_at,
        })
    }

    /// Returns the session if the token exists and has not expired.
    pub async fn find_valid(&self, token: &str) -> Result<Option<Session>> {
        let session = Sessions::find_by_id(token.to_string())
            .filter(sessions::Column::ExpiresAt.gt(timestamp::now()))
            .one(&self.conn)
            .await
            .context("Failed to query session")?;

        Ok(session.map(Session::from))
    }

    pub async fn delete(&self, token: &str) -> Result<bool> {
        let result = Sessions::delete_by_id(token.to_string())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Revokes every session of `user_id` except `keep`.
    pub async fn delete_for_user_except(&self, user_id: i32, keep: Option<&str>) -> Result<u64> {
        let mut query = Sessions::delete_many().filter(sessions::Column::UserId.eq(user_id));
        if let Some(keep) = keep {
            query = query.filter(sessions::Column::Token.ne(keep));
        }

        Ok(query.exec(&self.conn).await?.rows_affected)
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        let result = Sessions::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(timestamp::now()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Test hook: moves the expiry of a session.
    #[cfg(test)]
    pub async fn set_expiry(&self, token: &str, expires_at: chrono::DateTime<Utc>) -> Result<()> {
        Sessions::update_many()
            .col_expr(
                sessions::Column::ExpiresAt,
                sea_orm::sea_query::Expr::value(timestamp::format(expires_at)),
            )
            .filter(sessions::Column::Token.eq(token))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}

/// Generate a random session token (80 character hex string)
#[must_use]
pub fn generate_session_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 40] = rng.random();

    bytes.iter().fold(String::with_capacity(80), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_80_hex_chars_and_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 80);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
