//! Structured logging.
//!
//! Both binaries log through `tracing`. The filter comes from `RUST_LOG`
//! and falls back to `greet_http=info`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directive when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "greet_http=info";

/// Install the global subscriber, writing to stderr
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
