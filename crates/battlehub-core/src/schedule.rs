//! Match time helpers shared by the match listing and join screens.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Registration for a match closes this many minutes before the stored match time.
pub const REGISTRATION_LEAD_MINUTES: i64 = 5 * 60 + 30;

/// Room id and password are shown from this many minutes before the start.
pub const ROOM_REVEAL_MINUTES: i64 = 15;

/// Parse a match timestamp as sent by the backend.
///
/// Accepts epoch seconds (exactly ten digits), epoch milliseconds (any other
/// integer), RFC 3339, and the `YYYY-MM-DDTHH:MM[:SS]` form produced by the
/// match creation form (taken as UTC). Anything else yields `None`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(num) = value.parse::<i64>() {
        let millis = if num.to_string().len() == 10 {
            num.checked_mul(1000)?
        } else {
            num
        };
        return Utc.timestamp_millis_opt(millis).single();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Moment registration closes for a match starting at `match_time`.
pub fn registration_deadline(match_time: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(match_time)
        .and_then(|start| start.checked_sub_signed(Duration::minutes(REGISTRATION_LEAD_MINUTES)))
}

/// Whether room credentials may be shown for a match starting at `start`.
pub fn room_details_visible(start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    start.signed_duration_since(now) <= Duration::minutes(ROOM_REVEAL_MINUTES)
}

/// Time until `start` as `"{h}h {m}m {s}s"`, or `"Started"` once it has passed.
pub fn countdown(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = start.signed_duration_since(now);
    if left <= Duration::zero() {
        return "Started".to_string();
    }
    let secs = left.num_seconds();
    format!("{}h {}m {}s", secs / 3600, secs % 3600 / 60, secs % 60)
}
