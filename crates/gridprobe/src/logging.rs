//! Subscriber setup for test binaries
//!
//! Both initializers honour `RUST_LOG` and fall back to
//! [`DEFAULT_FILTER`]. They use `try_init`, so calling them from several
//! tests in one process is harmless: only the first call installs.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "gridprobe=info";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Human-readable output on the test writer.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer().with_target(false))
        .with(env_filter(DEFAULT_FILTER))
        .try_init()
        .is_ok()
}

/// JSON lines on stdout, for CI artifacts
pub fn init_json_tracing(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_current_span(false))
        .with(env_filter(default_filter))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let _ = init_tracing();
        assert!(!init_tracing());
        assert!(!init_json_tracing("debug"));
    }
}
