//! The persisted event (and, by shape reuse, snapshot) record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the domain event table (or, via [`crate::SnapshotRecord`], the
/// snapshot table: same shape, different table).
///
/// `global_index` is database-assigned, strictly increasing in
/// commit-visible order, but not necessarily contiguous: concurrent
/// committers can leave visible holes. `(aggregate_id, sequence_number)` is
/// unique, and `sequence_number` is contiguous starting at 0 within one
/// aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Database-assigned global position. Gaps are permitted.
    pub global_index: i64,
    /// Globally unique event identifier.
    pub event_id: Uuid,
    /// The aggregate this event belongs to.
    pub aggregate_id: String,
    /// Position within the aggregate's own event sequence, starting at 0.
    pub sequence_number: i64,
    /// The aggregate's type name, for routing/debugging.
    pub aggregate_type: String,
    /// When the event occurred, millisecond precision.
    pub timestamp: DateTime<Utc>,
    /// The payload's logical type name (for deserialization dispatch).
    pub payload_type: String,
    /// The payload's schema revision (for upcasting, handled by the caller).
    pub payload_revision: String,
    /// The serialized payload.
    pub payload: Vec<u8>,
    /// The serialized metadata (correlation ids, actor, etc.).
    pub metadata: Vec<u8>,
}
