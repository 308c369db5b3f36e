use thiserror::Error;

/// Malformed or missing configuration.
///
/// Raised when a detector is configured, or when an observation arrives for a
/// metric that has no threshold. Never retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("no threshold configured for metric `{name}`")]
    MissingThreshold { name: String },

    #[error("threshold for metric `{name}` must be finite, got {value}")]
    InvalidThreshold { name: String, value: f64 },

    #[error("flap window capacity must be within 1..={max}, got {0}", max = crate::config::MAX_INTERVAL)]
    InvalidCapacity(usize),

    #[error("invalid weight profile: low={low}, high={high} (weights must be finite and non-negative)")]
    InvalidWeights { low: f64, high: f64 },

    #[error("invalid {which} score threshold {value}")]
    InvalidScoreThreshold { which: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum FlapError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    ConfigSyntax(#[from] toml::de::Error),

    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, FlapError>;
