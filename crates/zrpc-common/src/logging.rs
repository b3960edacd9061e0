//! Logging and tracing initialization.
//!
//! Library code logs through `tracing`; binaries call [`init`] once at
//! startup. Output is pretty console text by default, or JSON for log
//! aggregation. The level can always be overridden at runtime via the
//! `RUST_LOG` environment variable.

use tracing::Level;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Configuration for the logging system.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Output logs as JSON (for machine parsing)
    pub json: bool,
    /// Enable verbose logging (sets the default level to DEBUG)
    pub verbose: bool,
}

/// Initializes the tracing subscriber; call once, early in `main`.
///
/// Panics if a global subscriber is already set; use [`try_init`] when that
/// is not certain (tests, embedders).
pub fn init(config: LogConfig) {
    if !try_init(config) {
        panic!("a global tracing subscriber is already installed");
    }
}

/// Like [`init`], returning `false` instead of panicking when a global
/// subscriber is already installed.
pub fn try_init(config: LogConfig) -> bool {
    let default_level = if config.verbose { Level::DEBUG } else { Level::INFO };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .is_ok()
    }
}
