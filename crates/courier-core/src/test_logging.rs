//! Logging helpers for tests

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

static INIT: Once = Once::new();

/// Initialize test logging with info level (called once per test run)
pub fn init_test_logging() {
    init_once("info");
}

/// Initialize test logging with debug level (called once per test run)
pub fn init_debug_logging() {
    init_once("debug");
}

fn init_once(level: &str) {
    INIT.call_once(|| {
        // Another subscriber may already be installed by the test binary
        let _ = init_test_subscriber(level);
    });
}

fn init_test_subscriber(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_test_writer();
    tracing::subscriber::set_global_default(Registry::default().with(env_filter).with(fmt_layer))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        init_debug_logging();
        tracing::info!("test logging ready");
    }
}
