//! Logging setup for binaries and tests embedding the provider.
//!
//! Logs go to **stderr** so stdout stays free for whatever drives the
//! provider. Filtering follows `RUST_LOG`:
//!
//! ```bash
//! # Request/response tracing for the API client and handlers
//! RUST_LOG=phare_provider=debug ./my-orchestrator
//!
//! # Everything at debug, including reqwest and hyper
//! RUST_LOG=debug ./my-orchestrator
//! ```
//!
//! The access token is never logged.

use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn subscriber(default_level: &str) -> impl Subscriber + Send + Sync + 'static {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Initialize the default logging subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    subscriber("info").init();
}

/// Like [`init_logging`], with `default_level` used when `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to initialize logging, returning `false` if a subscriber was already set.
///
/// Safe to call from every test.
pub fn try_init_logging() -> bool {
    subscriber("info").try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("phare_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,phare_provider::client=debug").is_ok());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        let _ = try_init_logging();
        assert!(!try_init_logging());
    }
}
