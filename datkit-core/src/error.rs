use thiserror::Error;

use crate::hash::HashKind;

/// Errors raised while building catalog values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A hash string contained a non-hex character or an odd number of digits
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    /// A digest did not have the byte length its algorithm requires
    #[error("{kind} digest must be {expected} bytes, got {actual}")]
    DigestLength {
        kind: HashKind,
        expected: usize,
        actual: usize,
    },

    /// A variable-length digest (SpamSum) was empty
    #[error("{0} digest must not be empty")]
    EmptyDigest(HashKind),
}

impl CoreError {
    pub fn invalid_hex(msg: impl Into<String>) -> Self {
        Self::InvalidHex(msg.into())
    }
}
