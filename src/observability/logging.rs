//! Structured logging setup for binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to this crate
/// and `warn` to everything else.
pub fn init_logging(default_level: &str) {
    let fallback = format!("warn,circuit_breaker={default_level},breaker_demo={default_level}");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init();
}
