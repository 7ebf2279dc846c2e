//! Domain Layer
//!
//! Pure value types shared by the event storage engine and its callers:
//! event/snapshot records, the schema descriptor, timestamp helpers, the
//! clock and serializer collaborator traits, and the error type.
//!
//! Nothing in this crate talks to a database or the network.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clock;
mod error;
mod event_message;
mod record;
mod schema;
mod serializer;
pub mod timestamp;

pub use clock::{Clock, SystemClock};
pub use error::{EventStoreError, Result};
pub use event_message::EventMessage;
pub use record::EventRecord;
pub use schema::EventStoreSchema;
pub use serializer::{PayloadBlob, PayloadDataType, Serializer};

/// A snapshot row has the same shape as an event row; it lives in a
/// separate table (`snapshot_event_entry` by default, see [`EventStoreSchema`]).
pub type SnapshotRecord = EventRecord;
