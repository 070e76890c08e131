// Tracing setup for binaries and services embedding the codec

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    EnvFilter, Registry,
};

/// Installs the global tracing subscriber.
///
/// # Arguments
///
/// * `log_level`: Filter directives used when `RUST_LOG` is unset. Defaults to
///   "info". Module directives work too, e.g. "courier_core=debug,info".
/// * `json_output`: Emit JSON lines instead of the human-readable format.
///   Defaults to `false`.
///
/// Fails if the directives do not parse or a global subscriber is already set.
pub fn init_tracing(log_level: Option<&str>, json_output: Option<bool>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))?;

    let subscriber = Registry::default().with(env_filter);

    if json_output.unwrap_or(false) {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_span_list(true);
        tracing::subscriber::set_global_default(subscriber.with(json_layer))?;
    } else {
        let fmt_layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(fmt_layer))?;
    }

    Ok(())
}
