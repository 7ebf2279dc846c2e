//! Database setup and event-seeding helpers for integration tests.

use anyhow::Result;
use chrono::{DateTime, Utc};
use eventstore_domain::EventMessage;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Run the crate's migrations against a fresh test database.
pub async fn setup_test_db(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../migrations").run(pool).await?;
    Ok(())
}

/// Build an `EventMessage` with sensible test defaults; only the fields
/// that usually matter to a test are exposed as parameters.
pub fn sample_event(aggregate_id: &str, sequence_number: i64, payload: Value) -> EventMessage {
    sample_event_at(aggregate_id, sequence_number, payload, Utc::now())
}

/// Like [`sample_event`], with an explicit timestamp, for tests exercising
/// gap cleanup or `allow_gaps`, where the event's age matters.
pub fn sample_event_at(aggregate_id: &str, sequence_number: i64, payload: Value, timestamp: DateTime<Utc>) -> EventMessage {
    EventMessage::new(
        Uuid::now_v7(),
        aggregate_id,
        sequence_number,
        "test_aggregate",
        timestamp,
        "test_event",
        "1",
        serde_json::to_vec(&payload).expect("payload always serializes"),
        Vec::new(),
    )
}

/// Append a contiguous run of `count` events for `aggregate_id`, starting at
/// sequence `0`, via the real append path.
pub async fn seed_aggregate(
    store: &eventstore::EventStore,
    aggregate_id: &str,
    count: i64,
) -> Result<()> {
    use eventstore::EventStorageEngine;

    let events: Vec<EventMessage> = (0..count)
        .map(|seq| sample_event(aggregate_id, seq, serde_json::json!({ "seq": seq })))
        .collect();
    store.append_events(&events).await?;
    Ok(())
}

/// Insert a row directly into the domain event table, bypassing the append
/// path, so a test can shape `global_index` gaps and out-of-order commits
/// that the ordinary append API can't produce on demand.
pub async fn insert_raw_event(
    pool: &PgPool,
    schema: &eventstore_domain::EventStoreSchema,
    event: &EventMessage,
) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(&format!(
        "INSERT INTO {} (event_id, aggregate_id, sequence_number, aggregate_type, \
         timestamp, payload_type, payload_revision, payload, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING global_index",
        schema.domain_event_table
    ))
    .bind(event.event_id)
    .bind(&event.aggregate_id)
    .bind(event.sequence_number)
    .bind(&event.aggregate_type)
    .bind(eventstore_domain::timestamp::encode(event.timestamp))
    .bind(&event.payload_type)
    .bind(&event.payload_revision)
    .bind(&event.payload)
    .bind(&event.metadata)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Like [`insert_raw_event`], but with an explicit `global_index` rather
/// than letting the table's sequence assign the next one. Tests that need
/// to land a row at a specific, earlier index (simulating a transaction
/// that was assigned its position before a later one but committed after it)
/// use this instead. A real connection pool always commits in the order
/// it inserts, so reproducing an out-of-order commit needs direct control
/// over which index a row lands at.
pub async fn insert_raw_event_at(
    pool: &PgPool,
    schema: &eventstore_domain::EventStoreSchema,
    global_index: i64,
    event: &EventMessage,
) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO {} (global_index, event_id, aggregate_id, sequence_number, aggregate_type, \
         timestamp, payload_type, payload_revision, payload, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        schema.domain_event_table
    ))
    .bind(global_index)
    .bind(event.event_id)
    .bind(&event.aggregate_id)
    .bind(event.sequence_number)
    .bind(&event.aggregate_type)
    .bind(eventstore_domain::timestamp::encode(event.timestamp))
    .bind(&event.payload_type)
    .bind(&event.payload_revision)
    .bind(&event.payload)
    .bind(&event.metadata)
    .execute(pool)
    .await?;

    Ok(())
}
