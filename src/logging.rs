//! Diagnostic logging setup for the binary.
//!
//! Library code logs through `tracing` macros; this module installs the
//! subscriber. Logs go to stderr so stdout stays the user-facing report.

use tracing_subscriber::EnvFilter;

const CRATE_TARGET: &str = "cuckoo_calendar";

/// Filter directive for a `-v` count.
///
/// - 0 (none) -> warn
/// - 1 (-v)   -> info
/// - 2 (-vv)  -> debug
/// - 3+ (-vvv)-> trace
pub fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("{CRATE_TARGET}={level}")
}

/// Initialize tracing based on CLI verbosity level.
///
/// `RUST_LOG` overrides the CLI flag if set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_filter(0), "cuckoo_calendar=warn");
        assert_eq!(default_filter(1), "cuckoo_calendar=info");
        assert_eq!(default_filter(2), "cuckoo_calendar=debug");
        assert_eq!(default_filter(3), "cuckoo_calendar=trace");
        assert_eq!(default_filter(9), "cuckoo_calendar=trace");
    }
}
