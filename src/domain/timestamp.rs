//! Timestamp encoding for persisted rows.
//!
//! Rows store UTC instants as fixed-width RFC 3339 strings with microsecond
//! precision. Fixed width keeps lexical order equal to chronological order,
//! which the range deletes and `ORDER BY created_at` rely on.

use chrono::{DateTime, Local, NaiveTime, SecondsFormat, TimeZone, Utc};

/// Formats an instant in the stored representation.
#[must_use]
pub fn format(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[must_use]
pub fn now() -> String {
    format(Utc::now())
}

/// Parses a stored timestamp. Accepts any RFC 3339 offset.
#[must_use]
pub fn parse(stored: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(stored)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Midnight at the start of the local calendar day containing `now`,
/// expressed in UTC.
#[must_use]
pub fn start_of_local_day(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    // DST gaps can make local midnight ambiguous or nonexistent
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| now.with_timezone(&Utc), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let base = Utc.with_ymd_and_hms(2025, 3, 9, 8, 0, 0).unwrap();
        let earlier = format(base);
        let later = format(base + Duration::microseconds(1));
        let much_later = format(base + Duration::days(400));

        assert!(earlier < later);
        assert!(later < much_later);
        assert_eq!(earlier.len(), later.len());
        assert_eq!(earlier, "2025-03-09T08:00:00.000000Z");
    }

    #[test]
    fn parse_round_trips() {
        let instant = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(parse(&format(instant)), Some(instant));
        assert_eq!(parse("not a date"), None);
    }

    #[test]
    fn start_of_local_day_is_not_after_now() {
        let now = Local::now();
        let midnight = start_of_local_day(now);
        assert!(midnight <= now.with_timezone(&Utc));
        assert!(now.with_timezone(&Utc) - midnight < Duration::hours(26));
    }
}
