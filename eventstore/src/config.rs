//! Event store configuration.
//!
//! Loaded from environment variables: `dotenvy` first, then typed parsing
//! of each key with a fallback default.

use eventstore_domain::{EventStoreError, PayloadDataType};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Tunables recognized by the engine. All fields may be changed between
/// calls by constructing a new `EventStoreConfig`. The engine holds no
/// internal lock around them, so "changes are visible on the next call"
/// falls out of ordinary value semantics rather than any atomic-swap
/// machinery.
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Rows returned per read (`fetch_domain_events` / `fetch_tracked_events`).
    pub batch_size: i64,
    /// Gaps further than this below `index` are dropped as abandoned.
    pub max_gap_offset: i64,
    /// First expected global index in an empty store.
    pub lowest_global_sequence: i64,
    /// Age after which a gap may be declared abandoned.
    pub gap_timeout: Duration,
    /// Number of tracked gaps that triggers a cleanup sweep before a read.
    pub gap_cleaning_threshold: usize,
    /// Physical representation used for payload/metadata blobs.
    pub payload_data_type: PayloadDataType,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_gap_offset: 10_000,
            lowest_global_sequence: 1,
            gap_timeout: Duration::from_millis(60_000),
            gap_cleaning_threshold: 250,
            payload_data_type: PayloadDataType::Bytes,
        }
    }
}

impl EventStoreConfig {
    /// Load configuration from environment variables, loading a `.env`
    /// file first if present (errors loading it are ignored, matching the
    /// teacher daemon's startup behavior).
    pub fn from_env() -> Result<Self, EventStoreError> {
        let _ = dotenvy::dotenv();

        let default = Self::default();
        Ok(Self {
            batch_size: parse_env("EVENTSTORE_BATCH_SIZE", default.batch_size)?,
            max_gap_offset: parse_env("EVENTSTORE_MAX_GAP_OFFSET", default.max_gap_offset)?,
            lowest_global_sequence: parse_env(
                "EVENTSTORE_LOWEST_GLOBAL_SEQUENCE",
                default.lowest_global_sequence,
            )?,
            gap_timeout: Duration::from_millis(parse_env(
                "EVENTSTORE_GAP_TIMEOUT_MS",
                default.gap_timeout.as_millis() as u64,
            )?),
            gap_cleaning_threshold: parse_env(
                "EVENTSTORE_GAP_CLEANING_THRESHOLD",
                default.gap_cleaning_threshold,
            )?,
            payload_data_type: match env::var("EVENTSTORE_PAYLOAD_DATA_TYPE") {
                Ok(v) if v.eq_ignore_ascii_case("object") => PayloadDataType::Object,
                Ok(v) if v.eq_ignore_ascii_case("bytes") => PayloadDataType::Bytes,
                Ok(other) => {
                    return Err(EventStoreError::InvalidToken(format!(
                        "invalid EVENTSTORE_PAYLOAD_DATA_TYPE: {other}"
                    )))
                }
                Err(_) => default.payload_data_type,
            },
        })
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, EventStoreError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|_| EventStoreError::InvalidToken(format!("invalid {key} value: {val}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_external_interface_table() {
        let c = EventStoreConfig::default();
        assert_eq!(c.batch_size, 100);
        assert_eq!(c.max_gap_offset, 10_000);
        assert_eq!(c.lowest_global_sequence, 1);
        assert_eq!(c.gap_timeout, Duration::from_millis(60_000));
        assert_eq!(c.gap_cleaning_threshold, 250);
        assert_eq!(c.payload_data_type, PayloadDataType::Bytes);
    }
}
