// blackline/src/logger.rs
//! Logger setup for the `blackline` binary.
//!
//! Logs go to stderr so that stdout stays clean for document text, tables and JSON.
//! `RUST_LOG` is honoured unless an explicit level is passed.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Default filter when neither `RUST_LOG` nor a CLI flag selects a level.
const DEFAULT_FILTER: &str = "warn";

/// Initializes the global logger. Calling it twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.target(Target::Stderr).format_timestamp(None);
    let _ = builder.try_init();
}

/// Maps the global verbosity flags to a level override.
///
/// `--quiet` wins over everything; `--disable-debug` caps an otherwise debug
/// setting (including one coming from `RUST_LOG`) at `info`.
pub fn resolve_level(quiet: bool, debug: bool, disable_debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Error)
    } else if disable_debug {
        Some(LevelFilter::Info)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_takes_precedence() {
        assert_eq!(resolve_level(true, true, false), Some(LevelFilter::Error));
        assert_eq!(resolve_level(false, true, true), Some(LevelFilter::Info));
        assert_eq!(resolve_level(false, true, false), Some(LevelFilter::Debug));
        assert_eq!(resolve_level(false, false, false), None);
    }
}
