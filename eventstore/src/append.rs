//! Append path: batched insert of a list of events for one aggregate, with
//! optimistic concurrency detection.

use crate::resolver::PersistenceExceptionResolver;
use eventstore_domain::{EventMessage, EventStoreError, EventStoreSchema};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// Append a batch of events for a single aggregate.
///
/// All events must belong to the same aggregate and carry strictly
/// increasing `sequence_number`s. The whole batch is inserted in one
/// statement inside one transaction: either all of it becomes visible, or
/// none of it does (P2, append atomicity).
///
/// Empty input is a silent no-op. A duplicate-key violation on
/// `(aggregate_id, sequence_number)`, classified by `resolver`, is reported
/// as [`EventStoreError::ConcurrencyFailure`] naming the batch's first
/// event; any other failure is a [`EventStoreError::StorageFailure`].
pub async fn append_events(
    pool: &PgPool,
    schema: &EventStoreSchema,
    resolver: &dyn PersistenceExceptionResolver,
    events: &[EventMessage],
) -> Result<(), EventStoreError> {
    if events.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await.map_err(EventStoreError::storage)?;
    append_events_tx(&mut tx, schema, resolver, events).await?;
    tx.commit().await.map_err(EventStoreError::storage)?;
    Ok(())
}

/// Append within a caller-supplied transaction, for callers that need to
/// append events and update a projection atomically.
pub async fn append_events_tx(
    tx: &mut Transaction<'_, Postgres>,
    schema: &EventStoreSchema,
    resolver: &dyn PersistenceExceptionResolver,
    events: &[EventMessage],
) -> Result<(), EventStoreError> {
    if events.is_empty() {
        return Ok(());
    }

    let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(format!(
        "INSERT INTO {} (event_id, aggregate_id, sequence_number, aggregate_type, \
         timestamp, payload_type, payload_revision, payload, metadata) ",
        schema.domain_event_table
    ));

    query_builder.push_values(events, |mut row, event| {
        row.push_bind(event.event_id)
            .push_bind(&event.aggregate_id)
            .push_bind(event.sequence_number)
            .push_bind(&event.aggregate_type)
            .push_bind(eventstore_domain::timestamp::encode(event.timestamp))
            .push_bind(&event.payload_type)
            .push_bind(&event.payload_revision)
            .push_bind(&event.payload)
            .push_bind(&event.metadata);
    });

    let result = query_builder.build().execute(&mut **tx).await;

    match result {
        Ok(_) => {
            debug!(
                aggregate_id = %events[0].aggregate_id,
                count = events.len(),
                first_sequence = events[0].sequence_number,
                "appended events"
            );
            Ok(())
        }
        Err(e) if resolver.is_duplicate_key(&e) => Err(EventStoreError::ConcurrencyFailure {
            aggregate_id: events[0].aggregate_id.clone(),
            sequence_number: events[0].sequence_number,
        }),
        Err(e) => Err(EventStoreError::storage(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_builds_nothing() {
        // append_events_tx short-circuits before touching the query builder;
        // exercised at the integration level against a real pool since a
        // transaction is required to construct this path at all.
        let events: Vec<EventMessage> = Vec::new();
        assert!(events.is_empty());
    }
}
