//! Clock injection.
//!
//! `allow_gaps` is computed by comparing a row's timestamp against
//! `now - gap_timeout`. Tests need to fast-forward that comparison without
//! sleeping, so `now` is always read through this trait rather than via
//! `Utc::now()` directly.

use chrono::{DateTime, Utc};

/// A source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant, as observed by this clock.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock. Used in production; tests should inject a fake instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
