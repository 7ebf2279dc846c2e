//! Snapshot path: idempotent upsert of a snapshot plus pruning of older
//! snapshots for the same aggregate.

use crate::resolver::PersistenceExceptionResolver;
use eventstore_domain::{EventMessage, EventStoreError, EventStoreSchema};
use sqlx::PgPool;
use tracing::{debug, warn};

/// Store a snapshot event for an aggregate.
///
/// Two steps in one transaction: insert the snapshot row, then delete every
/// older snapshot for the same aggregate. The delete runs after the insert
/// so a reader arriving mid-transaction never observes a state with no
/// snapshot at all.
///
/// If the insert fails as a duplicate key (a concurrent writer already
/// produced an equal-or-newer snapshot) the error is swallowed: snapshots
/// are advisory and idempotent (P7). Any other failure propagates as
/// [`EventStoreError::StorageFailure`].
pub async fn store_snapshot(
    pool: &PgPool,
    schema: &EventStoreSchema,
    resolver: &dyn PersistenceExceptionResolver,
    snapshot: &EventMessage,
) -> Result<(), EventStoreError> {
    let mut tx = pool.begin().await.map_err(EventStoreError::storage)?;

    let insert = sqlx::query(&format!(
        "INSERT INTO {} (event_id, aggregate_id, sequence_number, aggregate_type, \
         timestamp, payload_type, payload_revision, payload, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        schema.snapshot_event_table
    ))
    .bind(snapshot.event_id)
    .bind(&snapshot.aggregate_id)
    .bind(snapshot.sequence_number)
    .bind(&snapshot.aggregate_type)
    .bind(eventstore_domain::timestamp::encode(snapshot.timestamp))
    .bind(&snapshot.payload_type)
    .bind(&snapshot.payload_revision)
    .bind(&snapshot.payload)
    .bind(&snapshot.metadata)
    .execute(&mut *tx)
    .await;

    match insert {
        Ok(_) => {}
        Err(e) if resolver.is_duplicate_key(&e) => {
            warn!(
                aggregate_id = %snapshot.aggregate_id,
                sequence_number = snapshot.sequence_number,
                "duplicate snapshot write swallowed: a concurrent writer already stored an equal-or-newer snapshot"
            );
            tx.rollback().await.map_err(EventStoreError::storage)?;
            return Ok(());
        }
        Err(e) => return Err(EventStoreError::storage(e)),
    }

    sqlx::query(&format!(
        "DELETE FROM {} WHERE aggregate_id = $1 AND sequence_number < $2",
        schema.snapshot_event_table
    ))
    .bind(&snapshot.aggregate_id)
    .bind(snapshot.sequence_number)
    .execute(&mut *tx)
    .await
    .map_err(EventStoreError::storage)?;

    tx.commit().await.map_err(EventStoreError::storage)?;

    debug!(
        aggregate_id = %snapshot.aggregate_id,
        sequence_number = snapshot.sequence_number,
        "stored snapshot, pruned older ones"
    );

    Ok(())
}
