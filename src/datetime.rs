//! Date/time values stored as ticks.
//!
//! A tick is 100 nanoseconds; tick 0 is `0001-01-01T00:00:00`, and the last
//! representable instant is `9999-12-31T23:59:59.9999999`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// Ticks per second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks of `0001-01-01T00:00:00`.
pub const MIN_TICKS: i64 = 0;

/// Ticks of `9999-12-31T23:59:59.9999999`.
pub const MAX_TICKS: i64 = 3_155_378_975_999_999_999;

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Ticks of `moment`, or `None` if it lies outside the representable range.
pub fn ticks_from_naive(moment: NaiveDateTime) -> Option<i64> {
    let elapsed = moment.signed_duration_since(epoch());
    let ticks = elapsed
        .num_seconds()
        .checked_mul(TICKS_PER_SECOND)?
        .checked_add(i64::from(elapsed.subsec_nanos()) / 100)?;
    (MIN_TICKS..=MAX_TICKS).contains(&ticks).then_some(ticks)
}

/// The moment `ticks` stands for.
pub fn naive_from_ticks(ticks: i64) -> Option<NaiveDateTime> {
    if !(MIN_TICKS..=MAX_TICKS).contains(&ticks) {
        return None;
    }
    let seconds = TimeDelta::try_seconds(ticks / TICKS_PER_SECOND)?;
    let nanos = TimeDelta::nanoseconds((ticks % TICKS_PER_SECOND) * 100);
    epoch().checked_add_signed(seconds)?.checked_add_signed(nanos)
}

/// Parses a date string into ticks.
///
/// `min`, `max` and `now` are recognized exactly (case-sensitive); `now` asks
/// `clock`. Otherwise ISO-8601 forms are tried first, then the looser
/// formats listed in [`parse_flexible`].
pub fn parse(text: &str, clock: fn() -> DateTime<Utc>) -> Option<i64> {
    match text {
        "min" => Some(MIN_TICKS),
        "max" => Some(MAX_TICKS),
        "now" => ticks_from_naive(clock().naive_utc()),
        _ => parse_iso8601(text)
            .or_else(|| parse_flexible(text))
            .and_then(ticks_from_naive),
    }
}

/// RFC 3339 with any offset (normalized to UTC), or a date with an optional
/// local time.
pub fn parse_iso8601(text: &str) -> Option<NaiveDateTime> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(text) {
        return Some(moment.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(moment) = NaiveDateTime::parse_from_str(text, format) {
            return Some(moment);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
}

/// The looser formats: `2024.03.01-13.45.00[:123]`, `2024.03.01`, RFC 2822,
/// `03/01/2024 13:45:00`, `03/01/2024` and `2024-03-01 13:45:00`.
pub fn parse_flexible(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(moment) = DateTime::parse_from_rfc2822(text) {
        return Some(moment.naive_utc());
    }
    const TIMES: [&str; 4] = [
        "%Y.%m.%d-%H.%M.%S:%3f",
        "%Y.%m.%d-%H.%M.%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];
    for format in TIMES {
        if let Ok(moment) = NaiveDateTime::parse_from_str(text, format) {
            return Some(moment);
        }
    }
    for format in ["%Y.%m.%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
