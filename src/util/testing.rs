//! Logging for tests.

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

static TEST_SETUP: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// `RUST_LOG` selects the level; without it everything from `debug` up is shown.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
        if let Err(e) = installed {
            // another subscriber won the race, keep it
            eprintln!("test logging not installed: {}", e);
        }
        debug!("test logging ready");
    });
}
