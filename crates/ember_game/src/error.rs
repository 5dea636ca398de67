//! Error types for game construction and zone loading

use thiserror::Error;

/// Fatal game errors. All of these indicate unrecoverable misconfiguration
/// detected at startup or at zone-transition resolution; the process logs
/// the diagnostic and exits.
#[derive(Debug, Error)]
pub enum GameError {
    /// The configured starting zone is not among the loaded zones.
    #[error("starting zone '{0}' not found among zone loaders")]
    MissingStartingZone(String),

    /// A portal points at a zone that is not loaded.
    #[error("portal destination '{0}' not found among zone loaders")]
    MissingZone(String),

    /// A config or zone file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A config or zone file could not be parsed.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
