//! Integration tests for registration, login and sessions.

use chrono::{Duration, Utc};
use recipeshare::AppState;
use recipeshare::config::Config;
use recipeshare::crypto::EncryptionKey;
use recipeshare::db::Store;
use recipeshare::domain::timestamp;
use recipeshare::entities::sessions;
use recipeshare::services::{AccountError, NewAccount};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

async fn spawn_state() -> (AppState, std::path::PathBuf) {
    let db_path =
        std::env::temp_dir().join(format!("recipeshare-account-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.search_history.encryption_key = Some(EncryptionKey::generate_base64());
    // Keep hashing fast
    config.security.argon2_memory_cost_kib = 64;
    config.security.argon2_time_cost = 1;

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open test database");
    let state = AppState::with_store(config, store).expect("Failed to create app state");

    (state, db_path)
}

fn account(username: &str, email: &str) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: email.to_string(),
        password: "hunter22".to_string(),
        country: Some("NL".to_string()),
        ..NewAccount::default()
    }
}

#[tokio::test]
async fn test_register_and_login() {
    let (state, path) = spawn_state().await;

    let info = state
        .accounts
        .register(account("alice", " Alice@Example.com "))
        .await
        .unwrap();
    assert_eq!(info.email, "alice@example.com");
    assert!(info.id.is_valid());

    let session = state
        .accounts
        .login("ALICE@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(session.user_id, info.id);
    assert_eq!(session.token.len(), 80);

    let resolved = state.current_user(Some(&session.token)).await.unwrap();
    assert_eq!(resolved, Some(info.id));

    let me = state.accounts.account_info(Some(info.id)).await.unwrap();
    assert_eq!(me.username, "alice");

    drop(state);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let (state, path) = spawn_state().await;

    state
        .accounts
        .register(account("bobby", "bob@example.com"))
        .await
        .unwrap();

    assert!(matches!(
        state.accounts.register(account("robert", "BOB@example.com")).await,
        Err(AccountError::Conflict(field)) if field == "Email"
    ));
    assert!(matches!(
        state.accounts.register(account("bobby", "other@example.com")).await,
        Err(AccountError::Conflict(field)) if field == "Username"
    ));
    assert!(matches!(
        state.accounts.register(account("bo", "bo@example.com")).await,
        Err(AccountError::Validation(_))
    ));
    assert!(matches!(
        state.accounts.register(account("carol", "not-an-email")).await,
        Err(AccountError::Validation(_))
    ));

    let mut short = account("carol", "carol@example.com");
    short.password = "12345".to_string();
    assert!(matches!(
        state.accounts.register(short).await,
        Err(AccountError::Validation(_))
    ));

    drop(state);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let (state, path) = spawn_state().await;

    state
        .accounts
        .register(account("dave", "dave@example.com"))
        .await
        .unwrap();

    assert!(matches!(
        state.accounts.login("dave@example.com", "wrong-password").await,
        Err(AccountError::InvalidCredentials)
    ));
    assert!(matches!(
        state.accounts.login("nobody@example.com", "hunter22").await,
        Err(AccountError::InvalidCredentials)
    ));

    drop(state);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_expired_and_revoked_sessions() {
    let (state, path) = spawn_state().await;

    state
        .accounts
        .register(account("erin", "erin@example.com"))
        .await
        .unwrap();
    let expired = state.accounts.login("erin@example.com", "hunter22").await.unwrap();
    let active = state.accounts.login("erin@example.com", "hunter22").await.unwrap();

    sessions::Entity::update_many()
        .col_expr(
            sessions::Column::ExpiresAt,
            Expr::value(timestamp::format(Utc::now() - Duration::minutes(1))),
        )
        .filter(sessions::Column::Token.eq(expired.token.clone()))
        .exec(&state.store.conn)
        .await
        .unwrap();

    assert_eq!(state.current_user(Some(&expired.token)).await.unwrap(), None);
    assert_eq!(
        state.current_user(Some(&active.token)).await.unwrap(),
        Some(active.user_id)
    );
    assert!(state.require_user(Some(&expired.token)).await.is_err());
    assert!(state.require_user(None).await.is_err());

    assert_eq!(state.accounts.purge_expired_sessions().await.unwrap(), 1);

    state.accounts.logout(&active.token).await.unwrap();
    assert_eq!(state.current_user(Some(&active.token)).await.unwrap(), None);

    drop(state);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_change_password_revokes_other_sessions() {
    let (state, path) = spawn_state().await;

    state
        .accounts
        .register(account("frank", "frank@example.com"))
        .await
        .unwrap();
    let current = state.accounts.login("frank@example.com", "hunter22").await.unwrap();
    let other = state.accounts.login("frank@example.com", "hunter22").await.unwrap();

    assert!(matches!(
        state
            .accounts
            .change_password(Some(current.user_id), Some(&current.token), "nope", "newpass1")
            .await,
        Err(AccountError::Validation(msg)) if msg.contains("incorrect")
    ));

    state
        .accounts
        .change_password(Some(current.user_id), Some(&current.token), "hunter22", "newpass1")
        .await
        .unwrap();

    assert_eq!(
        state.current_user(Some(&current.token)).await.unwrap(),
        Some(current.user_id)
    );
    assert_eq!(state.current_user(Some(&other.token)).await.unwrap(), None);

    assert!(state.accounts.login("frank@example.com", "hunter22").await.is_err());
    assert!(state.accounts.login("frank@example.com", "newpass1").await.is_ok());

    drop(state);
    let _ = std::fs::remove_file(path);
}
