//! Configuration for eolfmt: per-document coding conventions, the `eolfmt.toml` file, and logging.

use std::path::Path;

use eolfmt_core::LineEnding;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod conventions;
mod logging;

pub use conventions::{ConventionsSnapshot, END_OF_LINE_KEY};
pub use logging::{init_tracing, LoggingConfig, LOG_TARGET};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "eolfmt.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EolfmtConfig {
    /// Terminator used when `end_of_line` is set to a value that is not `lf`, `cr` or `crlf`.
    ///
    /// When unset, the host platform's native terminator is used.
    #[serde(default)]
    pub fallback_end_of_line: Option<LineEnding>,

    /// Conventions applied to every document formatted with this config.
    #[serde(default)]
    pub conventions: ConventionsSnapshot,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EolfmtConfig {
    /// The injected fallback terminator for unrecognised `end_of_line` values.
    pub fn fallback_end_of_line(&self) -> LineEnding {
        self.fallback_end_of_line
            .unwrap_or_else(LineEnding::platform)
    }

    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_from_path_with_diagnostics(path).map(|(config, _)| config)
    }

    /// Load a config file from TOML and return any keys that were not recognised.
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str_with_diagnostics(&text)
    }

    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) = deserialize_toml_with_unknown_keys::<EolfmtConfig>(text)?;
        for key in &unknown_keys {
            tracing::warn!(target: "eolfmt.config", key = %key, "ignoring unknown config key");
        }
        Ok((config, ConfigDiagnostics { unknown_keys }))
    }
}

/// Diagnostics produced while loading a config.
///
/// Loading is best effort: unknown keys are reported here instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Keys present in the input TOML that are not part of the schema, as dotted paths
    /// (e.g. `logging.colour`). Keys inside `[conventions]` are free-form and never reported.
    pub unknown_keys: Vec<String>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep just the message; the default `Display` includes a source snippet.
        ConfigError::Toml(err.message().to_owned())
    }
}

fn deserialize_toml_with_unknown_keys<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut unknown = Vec::<String>::new();
    let deserializer = toml::de::Deserializer::new(text);
    let value = serde_ignored::deserialize(deserializer, |path| {
        unknown.push(path.to_string().trim_start_matches('.').to_owned());
    })?;
    unknown.sort();
    unknown.dedup();
    Ok((value, unknown))
}
