//! Timestamp encoding.
//!
//! Timestamps are stored as ISO-8601 text, UTC, millisecond precision, so
//! they sort lexicographically the same way they sort chronologically. This
//! sidesteps per-dialect differences in native timestamp precision. Do not
//! replace the text column with a native timestamp type without auditing
//! every comparison site in `tracked_reader` that relies on this ordering.

use chrono::{DateTime, SecondsFormat, Utc};

/// Encode an instant as millisecond-precision, UTC, ISO-8601 text.
pub fn encode(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode millisecond-precision ISO-8601 text back into an instant.
pub fn decode(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn round_trips_millisecond_precision() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        let text = encode(instant);
        assert_eq!(decode(&text).unwrap(), instant);
    }

    #[test]
    fn truncates_sub_millisecond_precision() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let text = encode(instant);
        // Millisecond precision only: the nanosecond remainder is dropped.
        assert!(text.ends_with("123Z") || text.ends_with("123+00:00"));
    }

    #[test]
    fn lexicographic_order_matches_chronological_order() {
        let earlier = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 1).unwrap();
        assert!(encode(earlier) < encode(later));
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode("not-a-timestamp").is_err());
    }
}
