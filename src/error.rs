//! Error types for the batch protocol engine.
//!
//! The error taxonomy mirrors the trust boundaries of the protocol:
//!
//! | Class | Variants | Effect |
//! |-------|----------|--------|
//! | Build-time | [`BatchError::InvalidResource`], [`BatchError::EmptyBatch`] | submission aborts before any network I/O |
//! | Transport | [`BatchError::Http`] | whole call fails, no partial result |
//! | Protocol framing | [`BatchError::MissingBoundary`], [`BatchError::Frame`], [`BatchError::CountMismatch`], [`BatchError::UnexpectedStatus`] | whole call fails; slot boundaries cannot be trusted |
//!
//! Per-sub-operation failures are deliberately NOT part of this enum: a
//! sub-response that decodes to a service error is captured in its own slot of
//! the batch result (see [`crate::batch::SubRequestFailure`]) and never
//! propagates out of the call.

use thiserror::Error;

/// Result type alias using the crate error type.
pub type Result<T> = std::result::Result<T, BatchError>;

/// Call-level errors for batch submission.
#[derive(Error, Debug)]
pub enum BatchError {
    /// A resource address could not be turned into a sub-request URL
    #[error("invalid resource address: {0}")]
    InvalidResource(String),

    /// The batch contains no sub-requests
    #[error("batch contains no sub-requests")]
    EmptyBatch,

    /// The outer HTTP exchange failed
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The outer response status does not indicate an accepted batch
    #[error("unexpected batch response status: {0}")]
    UnexpectedStatus(u16),

    /// The outer response Content-Type carries no `boundary=` parameter
    #[error("response Content-Type '{0}' carries no multipart boundary")]
    MissingBoundary(String),

    /// The multipart response body violates the wire format
    #[error("malformed multipart response at byte {offset}: {message}")]
    Frame {
        /// Byte offset into the response body where parsing stopped
        offset: usize,
        /// What the parser expected at that offset
        message: String,
    },

    /// The response contained a different number of parts than sub-requests
    #[error("batch returned {actual} sub-responses for {expected} sub-requests")]
    CountMismatch {
        /// Number of sub-requests submitted
        expected: usize,
        /// Number of parts found in the response
        actual: usize,
    },

    /// A service URL could not be parsed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BatchError {
    /// Check if this error is worth retrying the outer exchange for.
    ///
    /// Only transport-level failures are retryable; framing and build-time
    /// errors are deterministic and will fail again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BatchError::Http(_))
    }

    /// Shorthand for a framing error at a cursor offset.
    pub(crate) fn frame(offset: usize, message: impl Into<String>) -> Self {
        BatchError::Frame {
            offset,
            message: message.into(),
        }
    }
}
