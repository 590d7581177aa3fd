pub mod builders;
pub mod fakes;

use std::sync::Once;

use pipeline_queue::logging::{LOG_ENV_VAR, crate_filter};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary.
///
/// Reads directives from `PIPELINE_QUEUE_LOG` (e.g.
/// `PIPELINE_QUEUE_LOG=pipeline_queue::barrier=trace`); without it, barrier
/// and source logs show at `debug` and HTTP internals at `warn`. Output goes
/// through the test writer, so only failing tests print it.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| crate_filter(tracing::Level::DEBUG));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
