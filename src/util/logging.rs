//! Structured logging setup
//!
//! All output goes to stderr so stdout stays free for the plans the CLI prints. The binary
//! picks the level from `--log-level`, then `BehaviorConfig::log_level` (`BP_LOG_LEVEL`);
//! `RUST_LOG` directives are honored on top of it.
//!
//! # Example
//!
//! ```no_run
//! use dotnet_launch::util::logging::{init_logging, parse_level, LoggingConfig};
//!
//! init_logging(LoggingConfig::with_level(parse_level("DEBUG")));
//!
//! tracing::info!("Detecting .NET app");
//! tracing::debug!(root = "/workspace", "Looking for runtimeconfig.json");
//! ```

use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's events
    pub level: Level,

    /// One JSON object per event instead of plain lines
    pub use_json: bool,

    /// Include the module target (e.g., dotnet_launch::detect) in logs
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Parses a log level, case-insensitively
///
/// ```
/// use dotnet_launch::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("DEBUG"), Level::DEBUG);
/// assert_eq!(parse_level("info"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = format!("dotnet_launch={}", config.level).parse() {
            filter = filter.add_directive(directive);
        }

        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(config.include_target);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.without_time())
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        trace = { "trace", Level::TRACE },
        debug_upper = { "DEBUG", Level::DEBUG },
        info_mixed = { "Info", Level::INFO },
        warning = { "warning", Level::WARN },
        error = { "error", Level::ERROR },
        invalid = { "verbose", Level::INFO },
        empty = { "", Level::INFO },
    )]
    fn test_parse_level(input: &str, expected: Level) {
        assert_eq!(parse_level(input), expected);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(!config.include_target);
    }

    #[test]
    fn test_with_level() {
        let config = LoggingConfig::with_level(Level::DEBUG);
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.use_json);
    }
}
