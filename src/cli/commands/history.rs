use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::db::ClearedCounts;
use crate::domain::HistorySource;
use crate::state::AppState;

use super::print_json;

/// Parses a range bound. Bare dates cover the whole local day, so `--from`
/// takes its first instant and `--to` its last.
fn parse_bound(raw: &str, end_of_day: bool) -> anyhow::Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Expected RFC 3339 timestamp or YYYY-MM-DD, got {raw:?}"))?;

    let time = if end_of_day {
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };

    let local = Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .with_context(|| format!("{raw} does not exist in the local time zone"))?;

    Ok(local.with_timezone(&Utc))
}

fn print_cleared(counts: ClearedCounts, what: &str) {
    println!(
        "✓ Cleared {what}: {} entr{} ({} current, {} earlier)",
        counts.total(),
        if counts.total() == 1 { "y" } else { "ies" },
        counts.history,
        counts.log
    );
}

pub async fn cmd_history_list(state: &AppState, token: Option<&str>, json: bool) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    let items = state.history.get_unified_history(Some(user)).await?;

    if json {
        return print_json(&items);
    }

    if items.is_empty() {
        println!("No search history.");
        return Ok(());
    }

    println!("Search history ({} entries):", items.len());
    println!("{:-<70}", "");
    for item in items {
        println!("• {}", item.query);
        println!("  {} | {} {}", item.created_at, item.source, item.id);
    }

    Ok(())
}

pub async fn cmd_history_delete(
    state: &AppState,
    token: Option<&str>,
    id: &str,
    source: HistorySource,
) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;
    state.history.delete_item(Some(user), id, source).await?;
    println!("✓ Deleted history entry {id}");
    Ok(())
}

pub async fn cmd_history_clear(
    state: &AppState,
    token: Option<&str>,
    today: bool,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let user = state.require_user(token).await?;

    let (counts, what) = match (today, from, to) {
        (true, _, _) => (state.history.clear_today(Some(user)).await?, "today's history".to_string()),
        (false, Some(from), Some(to)) => {
            let start = parse_bound(from, false)?;
            let end = parse_bound(to, true)?;
            (
                state.history.clear_range(Some(user), start, end).await?,
                format!("history from {from} to {to}"),
            )
        }
        (false, None, None) => (state.history.clear_all(Some(user)).await?, "all history".to_string()),
        _ => anyhow::bail!("--from and --to must be given together"),
    };

    if json {
        return print_json(&counts);
    }

    print_cleared(counts, &what);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bound_accepts_rfc3339() {
        let bound = parse_bound("2025-03-01T12:00:00Z", false).unwrap();
        assert_eq!(bound, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn parse_bound_expands_dates_to_whole_local_day() {
        let start = parse_bound("2025-03-01", false).unwrap();
        let end = parse_bound("2025-03-01", true).unwrap();
        assert!(start < end);
        assert!(end - start < chrono::Duration::hours(25));
        assert_eq!(start.with_timezone(&Local).date_naive().to_string(), "2025-03-01");
    }

    #[test]
    fn parse_bound_rejects_garbage() {
        assert!(parse_bound("yesterday", false).is_err());
    }
}
