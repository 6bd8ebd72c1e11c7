//! Logging setup
//!
//! Installs a `tracing` subscriber that writes to stderr. `RUST_LOG` takes
//! precedence; otherwise the level follows the `-v` count.

use tracing_subscriber::EnvFilter;

/// Map a `-v` count to a default filter directive
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; later calls are no-ops
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "debug");
        assert_eq!(default_directive(5), "trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(0);
        init(1);
    }
}
