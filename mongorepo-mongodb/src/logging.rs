//! Structured logging setup.
//!
//! The crate logs through `tracing`: `info!` for connection bootstrap, `debug!` for each
//! repository operation, `warn!` when an identity string cannot be parsed. Applications that
//! already install a subscriber need nothing from this module.
//!
//! With the `tracing-subscriber` feature, [`init`] installs one, configured from:
//!
//! - `MONGOREPO_DEBUG=true|1|yes` - enable debug logging
//! - `MONGOREPO_LOG_LEVEL=trace|debug|info|warn|error` - set a specific level
//! - `MONGOREPO_LOG_FORMAT=json|pretty|compact` - output format (default: json)

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "MONGOREPO_DEBUG";
const LEVEL_VAR: &str = "MONGOREPO_LOG_LEVEL";
const FORMAT_VAR: &str = "MONGOREPO_LOG_FORMAT";

/// Check if debug logging is enabled via `MONGOREPO_DEBUG`.
pub fn is_debug_enabled() -> bool {
    parse_debug(env::var(DEBUG_VAR).ok().as_deref())
}

/// The log level from `MONGOREPO_LOG_LEVEL`, falling back to "debug" when
/// `MONGOREPO_DEBUG` is set and "warn" otherwise.
pub fn log_level() -> &'static str {
    parse_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// The output format from `MONGOREPO_LOG_FORMAT`; defaults to "json".
pub fn log_format() -> &'static str {
    parse_format(env::var(FORMAT_VAR).ok().as_deref())
}

fn parse_debug(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

fn parse_level(value: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match value.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

fn parse_format(value: Option<&str>) -> &'static str {
    match value.map(str::to_lowercase).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

/// Install a global subscriber once. Later calls are no-ops.
///
/// Does nothing unless `MONGOREPO_DEBUG` or `MONGOREPO_LOG_LEVEL` is set, or when the
/// `tracing-subscriber` feature is disabled.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = log_level();
            let filter = EnvFilter::try_new(format!(
                "mongorepo={},mongorepo_mongodb={},mongodb=warn",
                level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match log_format() {
                "pretty" => registry.with(fmt::layer().pretty()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().json()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = log_format(), "mongorepo logging initialized");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_debug() {
        assert!(parse_debug(Some("true")));
        assert!(parse_debug(Some("YES")));
        assert!(parse_debug(Some("1")));
        assert!(!parse_debug(Some("0")));
        assert!(!parse_debug(None));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None, false), "warn");
        assert_eq!(parse_level(None, true), "debug");
        assert_eq!(parse_level(Some("TRACE"), false), "trace");
        assert_eq!(parse_level(Some("loud"), false), "warn");
        assert_eq!(parse_level(Some("loud"), true), "debug");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format(None), "json");
        assert_eq!(parse_format(Some("Pretty")), "pretty");
        assert_eq!(parse_format(Some("compact")), "compact");
        assert_eq!(parse_format(Some("xml")), "json");
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
