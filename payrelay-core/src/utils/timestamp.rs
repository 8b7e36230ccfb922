//! Timestamp conversions shared by the wire formats and the accounting score.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Outbound wire format: ISO-8601 UTC with millisecond precision.
const MILLIS_UTC: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Zone-less ISO-8601 with a fractional-second tail, interpreted as UTC.
const ISO_SUBSECOND: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// Zone-less ISO-8601 down to whole seconds, interpreted as UTC.
const ISO_SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Fractional unix seconds at millisecond precision.
pub fn unix_seconds(ts: OffsetDateTime) -> f64 {
    (ts.unix_timestamp_nanos() / 1_000_000) as f64 / 1000.0
}

/// Format a timestamp the way the processors expect it, e.g.
/// `2025-07-01T12:00:00.250Z`.
pub fn format_millis_utc(ts: OffsetDateTime) -> String {
    ts.to_offset(UtcOffset::UTC)
        .format(MILLIS_UTC)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Parse one summary-window bound into a score.
///
/// Accepts a millisecond-epoch integer (at most 13 digits) or an ISO-8601
/// timestamp, with or without fractional seconds and zone designator;
/// zone-less input is taken as UTC. Anything else is `None`, which callers
/// treat as an open-ended bound.
pub fn parse_time_bound(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.len() <= 13 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = raw.parse().ok()?;
        return Some(millis as f64 / 1000.0);
    }

    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(unix_seconds(ts));
    }

    for format in [ISO_SUBSECOND, ISO_SECONDS] {
        if let Ok(ts) = PrimitiveDateTime::parse(raw, format) {
            return Some(unix_seconds(ts.assume_utc()));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use time::macros::datetime;

    #[test]
    fn unix_seconds_keeps_millisecond_precision() {
        assert_eq!(unix_seconds(datetime!(1970-01-01 00:00:01.500 UTC)), 1.5);
        assert_eq!(
            unix_seconds(datetime!(2025-07-01 12:00:00.250 UTC)),
            1_751_371_200.25
        );
    }

    #[test]
    fn formats_millisecond_utc() {
        assert_eq!(
            format_millis_utc(datetime!(2025-07-01 12:00:00.250 UTC)),
            "2025-07-01T12:00:00.250Z"
        );
        assert_eq!(
            format_millis_utc(datetime!(2025-07-01 12:00:00 UTC)),
            "2025-07-01T12:00:00.000Z"
        );
    }

    #[test]
    fn parses_epoch_millis() {
        assert_eq!(parse_time_bound("1700000000000"), Some(1_700_000_000.0));
        assert_eq!(parse_time_bound("500"), Some(0.5));
    }

    #[test]
    fn parses_iso_with_and_without_zone() {
        let expected = unix_seconds(datetime!(2025-07-01 12:00:00.250 UTC));
        assert_eq!(parse_time_bound("2025-07-01T12:00:00.250Z"), Some(expected));
        assert_eq!(
            parse_time_bound("2025-07-01T12:00:00.250+00:00"),
            Some(expected)
        );
        assert_eq!(parse_time_bound("2025-07-01T12:00:00.250"), Some(expected));
        assert_eq!(
            parse_time_bound("2025-07-01T12:00:00"),
            Some(unix_seconds(datetime!(2025-07-01 12:00:00 UTC)))
        );
    }

    #[test]
    fn parses_microsecond_tails() {
        assert_eq!(
            parse_time_bound("2025-07-01T12:00:00.123456"),
            Some(unix_seconds(datetime!(2025-07-01 12:00:00.123456 UTC)))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_time_bound(""), None);
        assert_eq!(parse_time_bound("yesterday"), None);
        assert_eq!(parse_time_bound("12345678901234"), None);
        assert_eq!(parse_time_bound("2025-13-01T00:00:00"), None);
    }
}
