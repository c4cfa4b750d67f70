use thiserror::Error;

/// Errors from the bucket pipeline.
#[derive(Debug, Error)]
pub enum DedupeError {
    /// A per-bucket task panicked or was cancelled
    #[error("Bucket '{key}' failed: {reason}")]
    BucketFailed { key: String, reason: String },

    /// A per-bucket task exceeded the worker pool's safety timeout
    #[error("Bucket '{0}' timed out")]
    BucketTimedOut(String),

    /// The dedicated runtime for the blocking entry point could not start
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl DedupeError {
    pub fn bucket_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BucketFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reading or updating the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `set` was given a key outside the known settings
    #[error("Unknown setting '{0}'")]
    UnknownKey(String),

    /// `set` was given a value the key does not accept
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl SettingsError {
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
