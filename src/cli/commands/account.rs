use crate::services::NewAccount;
use crate::state::AppState;

use super::print_json;

pub async fn cmd_register(state: &AppState, account: NewAccount, json: bool) -> anyhow::Result<()> {
    let info = state.accounts.register(account).await?;

    if json {
        return print_json(&info);
    }

    println!("✓ Registered {} (ID: {})", info.username, info.id);
    println!("Log in with: recipeshare login --email {} --password ...", info.email);
    Ok(())
}

pub async fn cmd_login(
    state: &AppState,
    email: &str,
    password: &str,
    json: bool,
) -> anyhow::Result<()> {
    let session = state.accounts.login(email, password).await?;

    if json {
        return print_json(&session);
    }

    println!("✓ Logged in as {}", session.username);
    println!("Session expires at {}", session.expires_at);
    println!();
    println!("export RECIPESHARE_TOKEN={}", session.token);
    Ok(())
}

pub async fn cmd_logout(state: &AppState, token: Option<&str>) -> anyhow::Result<()> {
    let Some(token) = token else {
        println!("Not logged in.");
        return Ok(());
    };

    state.accounts.logout(token).await?;
    println!("✓ Logged out");
    Ok(())
}

pub async fn cmd_whoami(state: &AppState, token: Option<&str>, json: bool) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    let info = state.accounts.account_info(Some(user)).await?;

    if json {
        return print_json(&info);
    }

    println!("{} <{}>", info.username, info.email);
    println!("ID: {} | Member since {}", info.id, info.created_at);
    Ok(())
}

pub async fn cmd_passwd(
    state: &AppState,
    token: Option<&str>,
    current: &str,
    new: &str,
) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    state
        .accounts
        .change_password(Some(user), token, current, new)
        .await?;

    println!("✓ Password changed. Other sessions were logged out.");
    Ok(())
}

pub async fn cmd_purge_sessions(state: &AppState) -> anyhow::Result<()> {
    let purged = state.accounts.purge_expired_sessions().await?;
    println!("✓ Removed {purged} expired session(s)");
    Ok(())
}
