//! The event as handed to the append/snapshot paths, before the engine
//! assigns it a `global_index`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One event awaiting persistence.
///
/// Carries everything [`crate::EventRecord`] does except `global_index`,
/// which only exists once the database has assigned it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMessage {
    /// Globally unique event identifier.
    pub event_id: Uuid,
    /// The aggregate this event belongs to.
    pub aggregate_id: String,
    /// Position within the aggregate's own event sequence.
    pub sequence_number: i64,
    /// The aggregate's type name.
    pub aggregate_type: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The payload's logical type name.
    pub payload_type: String,
    /// The payload's schema revision.
    pub payload_revision: String,
    /// The serialized payload.
    pub payload: Vec<u8>,
    /// The serialized metadata.
    pub metadata: Vec<u8>,
}

impl EventMessage {
    /// Construct a new event message, stamping `timestamp` with the given
    /// instant (callers typically pass their clock's `now()`).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: Uuid,
        aggregate_id: impl Into<String>,
        sequence_number: i64,
        aggregate_type: impl Into<String>,
        timestamp: DateTime<Utc>,
        payload_type: impl Into<String>,
        payload_revision: impl Into<String>,
        payload: Vec<u8>,
        metadata: Vec<u8>,
    ) -> Self {
        Self {
            event_id,
            aggregate_id: aggregate_id.into(),
            sequence_number,
            aggregate_type: aggregate_type.into(),
            timestamp,
            payload_type: payload_type.into(),
            payload_revision: payload_revision.into(),
            payload,
            metadata,
        }
    }
}
