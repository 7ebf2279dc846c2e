//! Test helpers shared across `eventstore`'s integration tests.

mod clock;
mod fixtures;
mod tracing_support;

pub use clock::FakeClock;
pub use fixtures::{insert_raw_event, insert_raw_event_at, sample_event, sample_event_at, seed_aggregate, setup_test_db};
pub use tracing_support::init_test_tracing;
