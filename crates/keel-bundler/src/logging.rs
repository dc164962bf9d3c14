//! Logging utilities for keel-bundler
//!
//! This module is only available with the `logging` feature.
//!
//! For library users: keel emits tracing events - install your own subscriber.
//! For application developers: use these convenience functions.

use std::sync::Once;

use keel_config::LogLevel;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Tracing filter for an engine log level.
pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Verbose => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warning => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Silent => LevelFilter::OFF,
    }
}

/// Initialize keel logging with the given level.
///
/// Installs a global subscriber; only the first call in a process takes effect.
/// `RUST_LOG` directives are still honored on top of the default level.
///
/// # Example
///
/// ```rust,no_run
/// use keel_bundler::logging::init_logging;
/// use keel_config::LogLevel;
///
/// init_logging(LogLevel::Info);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(level_filter(level).into())
            .from_env_lossy();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).without_time())
            .init();
    });
}

/// Initialize logging from `RUST_LOG`, falling back to info.
pub fn init_logging_from_env() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy()
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).without_time())
            .init();
    });
}
