//! The `EventStore`: the single entry point wiring a connection pool,
//! schema, configuration and pluggable collaborators to the four storage
//! operations.

use crate::append::append_events;
use crate::config::EventStoreConfig;
use crate::reader::{fetch_domain_events, fetch_latest_snapshot};
use crate::resolver::{PersistenceExceptionResolver, PostgresDuplicateKeyResolver};
use crate::token::TrackingToken;
use crate::tracked_reader::fetch_tracked_events;
use async_trait::async_trait;
use eventstore_domain::{Clock, EventMessage, EventRecord, EventStoreError, EventStoreSchema, SnapshotRecord, SystemClock};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;

/// The four operations a storage engine must provide, named so callers can
/// depend on the trait rather than the concrete [`EventStore`], useful for
/// test doubles that don't want a real pool.
#[async_trait]
pub trait EventStorageEngine: Send + Sync {
    /// Append a batch of events for one aggregate.
    async fn append_events(&self, events: &[EventMessage]) -> Result<(), EventStoreError>;

    /// Store a snapshot, pruning older ones for the same aggregate.
    async fn store_snapshot(&self, snapshot: &EventMessage) -> Result<(), EventStoreError>;

    /// Read a page of one aggregate's events, ascending.
    async fn fetch_domain_events(
        &self,
        aggregate_id: &str,
        first_sequence_number: i64,
        batch_size: i64,
    ) -> Result<Vec<EventRecord>, EventStoreError>;

    /// Read the latest snapshot for an aggregate, if any.
    async fn fetch_latest_snapshot(&self, aggregate_id: &str) -> Result<Option<SnapshotRecord>, EventStoreError>;

    /// Read the next page of the global stream after `previous`, paired
    /// with the token observed after each event.
    async fn fetch_tracked_events(
        &self,
        previous: Option<TrackingToken>,
    ) -> Result<Vec<(TrackingToken, EventRecord)>, EventStoreError>;
}

/// The engine's concrete, Postgres-backed implementation.
///
/// Cheaply `Clone`: the pool, resolver and clock are all reference-counted
/// or `Copy`, and the config is a small value type, so a fresh `EventStore`
/// can be built per request without hidden sharing surprises.
#[derive(Clone)]
pub struct EventStore {
    pool: PgPool,
    schema: EventStoreSchema,
    config: EventStoreConfig,
    resolver: Arc<dyn PersistenceExceptionResolver>,
    clock: Arc<dyn Clock>,
}

impl EventStore {
    /// Construct a store with every collaborator supplied explicitly.
    pub fn new(
        pool: PgPool,
        schema: EventStoreSchema,
        config: EventStoreConfig,
        resolver: Arc<dyn PersistenceExceptionResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            schema,
            config,
            resolver,
            clock,
        }
    }

    /// Construct a store with the default schema, default config, the
    /// Postgres duplicate-key resolver, and the system clock. The usual
    /// entry point for production callers.
    pub fn with_defaults(pool: PgPool) -> Self {
        Self::new(
            pool,
            EventStoreSchema::default(),
            EventStoreConfig::default(),
            Arc::new(PostgresDuplicateKeyResolver),
            Arc::new(SystemClock),
        )
    }

    /// The underlying pool, for callers that need to append events and
    /// update a projection in the same transaction via
    /// [`crate::append::append_events_tx`].
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The schema this store was constructed with.
    pub fn schema(&self) -> &EventStoreSchema {
        &self.schema
    }

    /// The config this store was constructed with.
    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    /// Append within a caller-supplied transaction.
    pub async fn append_events_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        events: &[EventMessage],
    ) -> Result<(), EventStoreError> {
        crate::append::append_events_tx(tx, &self.schema, self.resolver.as_ref(), events).await
    }
}

#[async_trait]
impl EventStorageEngine for EventStore {
    async fn append_events(&self, events: &[EventMessage]) -> Result<(), EventStoreError> {
        append_events(&self.pool, &self.schema, self.resolver.as_ref(), events).await
    }

    async fn store_snapshot(&self, snapshot: &EventMessage) -> Result<(), EventStoreError> {
        crate::snapshot::store_snapshot(&self.pool, &self.schema, self.resolver.as_ref(), snapshot).await
    }

    async fn fetch_domain_events(
        &self,
        aggregate_id: &str,
        first_sequence_number: i64,
        batch_size: i64,
    ) -> Result<Vec<EventRecord>, EventStoreError> {
        fetch_domain_events(&self.pool, &self.schema, aggregate_id, first_sequence_number, batch_size).await
    }

    async fn fetch_latest_snapshot(&self, aggregate_id: &str) -> Result<Option<SnapshotRecord>, EventStoreError> {
        fetch_latest_snapshot(&self.pool, &self.schema, aggregate_id).await
    }

    async fn fetch_tracked_events(
        &self,
        previous: Option<TrackingToken>,
    ) -> Result<Vec<(TrackingToken, EventRecord)>, EventStoreError> {
        fetch_tracked_events(&self.pool, &self.schema, &self.config, self.clock.as_ref(), previous).await
    }
}
