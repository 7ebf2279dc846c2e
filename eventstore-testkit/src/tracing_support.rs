//! Tracing bootstrap for tests, mirroring how a real binary would wire up
//! `tracing-subscriber` at startup: a registry, an `EnvFilter` so
//! `RUST_LOG` controls verbosity, and a compact formatting layer.

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Install a global tracing subscriber once per process, so running a test
/// with `RUST_LOG=debug cargo test -- --nocapture` shows the engine's
/// structured log output. Safe to call from every test; only the first
/// call takes effect.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .try_init();
    });
}
