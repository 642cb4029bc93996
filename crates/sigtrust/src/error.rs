//! Error types for trust-list loading and the trust gate.
//!
//! Per-request validation never produces one of these: validation failures
//! are reported through [`crate::ValidationResult`].

use thiserror::Error;

/// Result type alias for sigtrust operations.
pub type Result<T> = std::result::Result<T, TrustError>;

/// Errors that can occur while bootstrapping or accessing the trust store.
#[derive(Error, Debug)]
pub enum TrustError {
    /// The trust-list container (PDF) could not be parsed at all.
    #[error("failed to parse trust-list container: {reason}")]
    ContainerParse {
        /// Underlying parser message
        reason: String,
    },

    /// The container parsed, but has no attachment with the expected name.
    #[error("trust-list attachment {name:?} not found in container")]
    TrustListNotFound {
        /// Attachment name that was looked up
        name: String,
    },

    /// A single certificate could not be decoded.
    #[error("certificate #{index} could not be decoded: {reason}")]
    CertificateDecode {
        /// Position of the candidate in its source (0 for single decodes)
        index: usize,
        /// Decoder message
        reason: String,
    },

    /// A validation was requested before the trust store finished loading.
    #[error("trust store is not ready: initialization has not completed")]
    NotReady,

    /// The trust store was already initialized for this process.
    #[error("trust store is already initialized")]
    AlreadyInitialized,

    /// Configuration is invalid or missing required fields.
    #[error("config error: {0}")]
    Config(String),

    /// Reading the trust-list artifact failed.
    #[error("io error on {path}: {source}")]
    Io {
        /// Path that was being read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl TrustError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn container(reason: impl std::fmt::Display) -> Self {
        Self::ContainerParse {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode(index: usize, reason: impl std::fmt::Display) -> Self {
        Self::CertificateDecode {
            index,
            reason: reason.to_string(),
        }
    }

    /// True for errors that must abort startup (see [`crate::TrustGate`]).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ContainerParse { .. } | Self::TrustListNotFound { .. } | Self::Io { .. }
        )
    }
}
