//! Errors raised while splitting, joining, or decoding parts.

use num_bigint::BigUint;
use thiserror::Error;

/// The four families of failure a caller may want to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Format,
    Arithmetic,
    Reconstruction,
}

/// Secret sharing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SharingError {
    /// Malformed thresholds, counts, lengths, or an inconsistent set of parts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A part could not be parsed, or parsed into out-of-range values.
    #[error("malformed part: {0}")]
    Format(String),

    /// The operand has no inverse modulo the field prime.
    #[error("{0} is not invertible modulo the field prime")]
    NotInvertible(BigUint),

    /// Interpolation was given an insufficient or inconsistent point set.
    #[error("reconstruction failed: {0}")]
    Reconstruction(String),
}

impl SharingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Format(_) => ErrorKind::Format,
            Self::NotInvertible(_) => ErrorKind::Arithmetic,
            Self::Reconstruction(_) => ErrorKind::Reconstruction,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn reconstruction(msg: impl Into<String>) -> Self {
        Self::Reconstruction(msg.into())
    }
}

pub type Result<T, E = SharingError> = std::result::Result<T, E>;
