//! Relational-backed event storage engine with a gap-aware global tracking
//! token.
//!
//! An aggregate's events are appended in one batch per call, ordered by a
//! per-aggregate `sequence_number`, with optimistic concurrency enforced by
//! a unique constraint on `(aggregate_id, sequence_number)`. A separate
//! global stream, ordered by an auto-increment `global_index`, can be read
//! independently of aggregate boundaries by projectors; because that index
//! is assigned before commit, a resuming reader needs more than "the last
//! index I saw" to be correct, see [`token::TrackingToken`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod append;
mod config;
mod reader;
mod resolver;
mod snapshot;
mod store;
mod token;
mod tracked_reader;

pub use append::{append_events, append_events_tx};
pub use config::EventStoreConfig;
pub use eventstore_domain::{
    Clock, EventMessage, EventRecord, EventStoreError, EventStoreSchema, PayloadBlob, PayloadDataType, Result,
    Serializer, SnapshotRecord, SystemClock,
};
pub use reader::{fetch_domain_events, fetch_latest_snapshot};
pub use resolver::{PersistenceExceptionResolver, PostgresDuplicateKeyResolver};
pub use snapshot::store_snapshot;
pub use store::{EventStorageEngine, EventStore};
pub use token::{TrackingToken, TrackingTokenWire};
pub use tracked_reader::fetch_tracked_events;
