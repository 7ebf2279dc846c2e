//! Per-aggregate reader: paged read by `(aggregate_id, sequence_number)`,
//! and the matching snapshot lookup.

use eventstore_domain::{EventRecord, EventStoreError, EventStoreSchema, SnapshotRecord};
use sqlx::{PgPool, Row};

/// Read up to `batch_size` events for `aggregate_id` with
/// `sequence_number` in `[first_sequence_number, first_sequence_number +
/// batch_size)`, ascending. The per-aggregate stream is defined to be
/// contiguous: no gap handling is performed here.
///
/// Runs inside a transaction, as some drivers require for streaming blob
/// columns safely.
pub async fn fetch_domain_events(
    pool: &PgPool,
    schema: &EventStoreSchema,
    aggregate_id: &str,
    first_sequence_number: i64,
    batch_size: i64,
) -> Result<Vec<EventRecord>, EventStoreError> {
    let mut tx = pool.begin().await.map_err(EventStoreError::storage)?;

    let rows = sqlx::query(&format!(
        "SELECT global_index, event_id, aggregate_id, sequence_number, aggregate_type, \
         timestamp, payload_type, payload_revision, payload, metadata \
         FROM {} WHERE aggregate_id = $1 AND sequence_number >= $2 AND sequence_number < $3 \
         ORDER BY sequence_number ASC",
        schema.domain_event_table
    ))
    .bind(aggregate_id)
    .bind(first_sequence_number)
    .bind(first_sequence_number + batch_size)
    .fetch_all(&mut *tx)
    .await
    .map_err(EventStoreError::storage)?;

    tx.commit().await.map_err(EventStoreError::storage)?;

    rows.into_iter().map(row_to_record).collect()
}

/// Read the snapshot with the greatest `sequence_number` for `aggregate_id`,
/// or `None` if there isn't one.
///
/// Runs inside a transaction, same as `fetch_domain_events`.
pub async fn fetch_latest_snapshot(
    pool: &PgPool,
    schema: &EventStoreSchema,
    aggregate_id: &str,
) -> Result<Option<SnapshotRecord>, EventStoreError> {
    let mut tx = pool.begin().await.map_err(EventStoreError::storage)?;

    let row = sqlx::query(&format!(
        "SELECT global_index, event_id, aggregate_id, sequence_number, aggregate_type, \
         timestamp, payload_type, payload_revision, payload, metadata \
         FROM {} WHERE aggregate_id = $1 ORDER BY sequence_number DESC LIMIT 1",
        schema.snapshot_event_table
    ))
    .bind(aggregate_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(EventStoreError::storage)?;

    tx.commit().await.map_err(EventStoreError::storage)?;

    row.map(row_to_record).transpose()
}

pub(crate) fn row_to_record(row: sqlx::postgres::PgRow) -> Result<EventRecord, EventStoreError> {
    let timestamp_text: String = row.try_get("timestamp").map_err(EventStoreError::storage)?;
    let timestamp = eventstore_domain::timestamp::decode(&timestamp_text)
        .map_err(|e| EventStoreError::storage(e))?;

    Ok(EventRecord {
        global_index: row.try_get("global_index").map_err(EventStoreError::storage)?,
        event_id: row.try_get("event_id").map_err(EventStoreError::storage)?,
        aggregate_id: row.try_get("aggregate_id").map_err(EventStoreError::storage)?,
        sequence_number: row.try_get("sequence_number").map_err(EventStoreError::storage)?,
        aggregate_type: row.try_get("aggregate_type").map_err(EventStoreError::storage)?,
        timestamp,
        payload_type: row.try_get("payload_type").map_err(EventStoreError::storage)?,
        payload_revision: row.try_get("payload_revision").map_err(EventStoreError::storage)?,
        payload: row.try_get("payload").map_err(EventStoreError::storage)?,
        metadata: row.try_get("metadata").map_err(EventStoreError::storage)?,
    })
}
