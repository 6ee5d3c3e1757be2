use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Prefix of every tracing target used by the eolfmt crates (`eolfmt.config`, `eolfmt.format`).
pub const LOG_TARGET: &str = "eolfmt";

const DEFAULT_LEVEL: &str = "info";

static TRACING_INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Verbosity of the eolfmt crates.
    ///
    /// A simple level (`info`, `debug`, ...) applies to the `eolfmt.*` targets only. Anything else
    /// is used verbatim as `tracing_subscriber::EnvFilter` directives.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled no fmt layer is installed.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        DEFAULT_LEVEL.to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// The `EnvFilter` directives selected by [`LoggingConfig::level`].
    pub fn directives(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            return scoped_directive(DEFAULT_LEVEL);
        }
        match simple_level(level) {
            Some(level) => scoped_directive(level),
            None => level.to_owned(),
        }
    }

    /// The effective filter: these directives, extended by `RUST_LOG` when it is set.
    pub fn env_filter(&self) -> EnvFilter {
        self.env_filter_with(std::env::var("RUST_LOG").ok().as_deref())
    }

    fn env_filter_with(&self, rust_log: Option<&str>) -> EnvFilter {
        let directives = self.directives();
        let rust_log = rust_log.map(str::trim).filter(|value| !value.is_empty());

        if let Some(rust_log) = rust_log {
            match EnvFilter::try_new(format!("{directives},{rust_log}")) {
                Ok(filter) => return filter,
                Err(err) => tracing::warn!(
                    target: "eolfmt.config",
                    rust_log,
                    error = %err,
                    "ignoring invalid RUST_LOG directives"
                ),
            }
        }

        EnvFilter::try_new(&directives).unwrap_or_else(|err| {
            tracing::warn!(
                target: "eolfmt.config",
                level = %self.level,
                error = %err,
                "invalid logging level; using the default"
            );
            EnvFilter::new(scoped_directive(DEFAULT_LEVEL))
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

/// Accepts level names in any case, plus `warning`.
fn simple_level(input: &str) -> Option<&'static str> {
    let level = match input.to_ascii_lowercase().as_str() {
        "off" => "off",
        "error" => "error",
        "warn" | "warning" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => return None,
    };
    Some(level)
}

fn scoped_directive(level: &str) -> String {
    format!("{LOG_TARGET}={level}")
}

/// Install the global tracing subscriber.
///
/// Only the first call installs a subscriber. A global subscriber installed by a host
/// application is left in place.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let fmt_layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if !config.stderr {
            tracing_subscriber::layer::Identity::new().boxed()
        } else if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!(
                target: "eolfmt.config",
                directives = %config.directives(),
                json = config.json,
                "tracing initialized"
            );
        }
    });
}
