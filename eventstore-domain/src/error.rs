//! Event store error kinds.

/// Errors surfaced by the event storage engine.
///
/// There are exactly three kinds, per the error handling design: a
/// concurrency conflict on append, an opaque storage failure wrapping the
/// driver's cause, and a rejected tracking token.
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// Optimistic concurrency violation: the batch's first event collided
    /// with an existing `(aggregate_id, sequence_number)` row.
    #[error("concurrency failure appending to aggregate {aggregate_id}: sequence {sequence_number} already exists")]
    ConcurrencyFailure {
        /// Aggregate the append targeted.
        aggregate_id: String,
        /// Sequence number of the first event in the rejected batch.
        sequence_number: i64,
    },

    /// Any other driver or SQL failure. The original cause is attached for
    /// diagnostics; callers should not pattern-match on its contents.
    #[error("storage failure: {0}")]
    StorageFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A tracking token of an unrecognized shape was rejected before any
    /// query was issued (gaps not ascending, a gap `>= index`, and so on).
    #[error("invalid tracking token: {0}")]
    InvalidToken(String),
}

impl EventStoreError {
    /// Wrap an arbitrary error as a [`EventStoreError::StorageFailure`].
    pub fn storage(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::StorageFailure(Box::new(cause))
    }
}

/// Convenience alias for results returned by the engine.
pub type Result<T> = std::result::Result<T, EventStoreError>;
