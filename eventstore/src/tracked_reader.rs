//! Global tracked reader: paged read by global index, with gap re-read and
//! periodic gap cleanup.

use crate::config::EventStoreConfig;
use crate::reader::row_to_record;
use crate::token::TrackingToken;
use chrono::{DateTime, Utc};
use eventstore_domain::{Clock, EventRecord, EventStoreError, EventStoreSchema};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, info};

/// Read the next batch of globally-ordered events after `previous`, paired
/// with the token that would be observed immediately after consuming each
/// one.
///
/// `previous` absent means "no position yet": the caller's very first
/// call. The read query unions the normal forward window with a re-read of
/// every index still carried as a gap, so previously-missing slots are
/// checked again without re-scanning the whole history.
///
/// The cleanup scan and the window read run inside one read-only
/// transaction, committed regardless of what either scan finds.
pub async fn fetch_tracked_events(
    pool: &PgPool,
    schema: &EventStoreSchema,
    config: &EventStoreConfig,
    clock: &dyn Clock,
    previous: Option<TrackingToken>,
) -> Result<Vec<(TrackingToken, EventRecord)>, EventStoreError> {
    let had_previous = previous.is_some();
    let base = previous.unwrap_or_else(TrackingToken::initial);

    let mut tx = pool.begin().await.map_err(EventStoreError::storage)?;

    let cleaned = if base.gaps().len() > config.gap_cleaning_threshold {
        clean_gaps(&mut tx, schema, config, clock, &base).await?
    } else {
        base
    };

    let rows = fetch_window(&mut tx, schema, config, &cleaned).await?;

    tx.commit().await.map_err(EventStoreError::storage)?;

    let mut running: Option<TrackingToken> = if had_previous { Some(cleaned) } else { None };
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let record = row_to_record(row)?;
        let allow_gaps = is_recent(record.timestamp, clock.now(), config);

        let next = match running.take() {
            None => TrackingToken::first_observed(record.global_index, config.lowest_global_sequence, allow_gaps),
            Some(t) => t.advance_to(record.global_index, config.max_gap_offset, allow_gaps),
        };

        debug!(
            global_index = record.global_index,
            allow_gaps,
            gap_count = next.gaps().len(),
            "advanced tracking token"
        );

        out.push((next.clone(), record));
        running = Some(next);
    }

    Ok(out)
}

/// A row is "recent", meaning an earlier-numbered sibling might still be
/// committing, if its timestamp is after `now - gap_timeout`.
fn is_recent(timestamp: DateTime<Utc>, now: DateTime<Utc>, config: &EventStoreConfig) -> bool {
    let cutoff = now - gap_timeout_as_chrono(config);
    timestamp > cutoff
}

fn gap_timeout_as_chrono(config: &EventStoreConfig) -> chrono::Duration {
    chrono::Duration::from_std(config.gap_timeout).unwrap_or_else(|_| chrono::Duration::zero())
}

async fn fetch_window(
    tx: &mut Transaction<'_, Postgres>,
    schema: &EventStoreSchema,
    config: &EventStoreConfig,
    token: &TrackingToken,
) -> Result<Vec<sqlx::postgres::PgRow>, EventStoreError> {
    let gaps: Vec<i64> = token.gaps().iter().copied().collect();

    sqlx::query(&format!(
        "SELECT global_index, event_id, aggregate_id, sequence_number, aggregate_type, \
         timestamp, payload_type, payload_revision, payload, metadata \
         FROM {} \
         WHERE (global_index > $1 AND global_index <= $2) OR global_index = ANY($3) \
         ORDER BY global_index ASC",
        schema.domain_event_table
    ))
    .bind(token.index())
    .bind(token.index() + config.batch_size)
    .bind(&gaps)
    .fetch_all(&mut **tx)
    .await
    .map_err(EventStoreError::storage)
}

/// Run the cleanup scan described in the gap-aware tracking token's
/// lifecycle: re-examine the low end of the gap set and abandon gaps that
/// are either filled or stale, without waiting for the normal forward read
/// to reach them.
async fn clean_gaps(
    tx: &mut Transaction<'_, Postgres>,
    schema: &EventStoreSchema,
    config: &EventStoreConfig,
    clock: &dyn Clock,
    token: &TrackingToken,
) -> Result<TrackingToken, EventStoreError> {
    let Some(&min) = token.gaps().iter().next() else {
        return Ok(token.clone());
    };
    let max = *token.gaps().iter().next_back().expect("checked non-empty above");

    let rows = sqlx::query(&format!(
        "SELECT global_index, timestamp FROM {} WHERE global_index BETWEEN $1 AND $2 ORDER BY global_index ASC",
        schema.domain_event_table
    ))
    .bind(min)
    .bind(max + 1)
    .fetch_all(&mut **tx)
    .await
    .map_err(EventStoreError::storage)?;

    let mut current = token.clone();
    let now = clock.now();
    let cutoff = now - gap_timeout_as_chrono(config);

    for row in rows {
        let global_index: i64 = row.try_get("global_index").map_err(EventStoreError::storage)?;
        let timestamp_text: String = row.try_get("timestamp").map_err(EventStoreError::storage)?;

        let timestamp = match eventstore_domain::timestamp::decode(&timestamp_text) {
            Ok(t) => t,
            Err(e) => {
                info!(global_index, error = %e, "gap cleanup aborted: could not parse event timestamp");
                return Ok(token.clone());
            }
        };

        if current.gaps().contains(&global_index) {
            break;
        }
        if timestamp > cutoff {
            break;
        }

        let below = global_index - 1;
        if current.gaps().contains(&below) {
            current = current.advance_to(below, config.max_gap_offset, false);
        }
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_recent_true_just_inside_window() {
        let config = EventStoreConfig::default();
        let now = Utc::now();
        let timestamp = now - chrono::Duration::milliseconds(1);
        assert!(is_recent(timestamp, now, &config));
    }

    #[test]
    fn is_recent_false_outside_window() {
        let config = EventStoreConfig {
            gap_timeout: std::time::Duration::from_millis(1_000),
            ..EventStoreConfig::default()
        };
        let now = Utc::now();
        let timestamp = now - chrono::Duration::seconds(10);
        assert!(!is_recent(timestamp, now, &config));
    }
}
