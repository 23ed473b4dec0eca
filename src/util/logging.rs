//! Structured logging setup
//!
//! Installs a `tracing` subscriber writing to stderr, so stdout only ever
//! carries generated documentation. `RUST_LOG` takes precedence over the
//! configured level when it is set.
//!
//! ```no_run
//! use docsmith::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(snippet_len = 42, "Generating docstring");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for docsmith's own targets
    pub level: Level,

    /// Emit JSON lines instead of human-readable output
    pub use_json: bool,

    /// Include the module target (e.g. docsmith::pipeline) in each line
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
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

    /// JSON output with source locations, for log collectors
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }
}

/// Parses a log level, falling back to INFO on unknown input
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
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

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let directives = [
        format!("docsmith={}", level),
        "h2=warn".to_string(),
        "hyper=warn".to_string(),
        "reqwest=warn".to_string(),
        "hf_hub=warn".to_string(),
    ];

    directives
        .iter()
        .filter_map(|d| d.parse().ok())
        .fold(EnvFilter::new("warn"), |filter, directive| {
            filter.add_directive(directive)
        })
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

/// Initializes logging from `DOCSMITH_LOG_LEVEL` and `DOCSMITH_LOG_JSON`
pub fn init_from_env() {
    let level_str = env::var("DOCSMITH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let use_json = env::var("DOCSMITH_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level: parse_level(&level_str),
        use_json,
        ..Default::default()
    });
}
