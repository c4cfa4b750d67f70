use thiserror::Error;

use datkit_dat::DatError;
use datkit_lib::{DedupeError, SettingsError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// DAT file could not be read or written
    #[error("DAT error: {0}")]
    Dat(#[from] DatError),

    /// The dedupe pipeline could not run
    #[error("Dedupe error: {0}")]
    Dedupe(#[from] DedupeError),

    /// Settings file error
    #[error("Config error: {0}")]
    Settings(#[from] SettingsError),

    /// Bad command-line input
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
