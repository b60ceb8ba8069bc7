//! Error types for pages-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading a pages configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the config file.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, including file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the given path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },
}
