//! Everything that can go wrong between disk and a usable [`crate::Config`].

/// Failure while loading, persisting, or validating engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("could not write config file: {0}")]
    Write(#[source] std::io::Error),

    #[error("config file is not valid RON: {0}")]
    Parse(#[source] ron::error::SpannedError),

    #[error("config could not be serialized: {0}")]
    Serialize(#[source] ron::Error),

    /// A value parsed fine but cannot run the engine (zero tick rate,
    /// non-positive radius, and the like).
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
