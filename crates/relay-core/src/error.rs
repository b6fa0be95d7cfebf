//! Error taxonomy for adapted callback operations.
//!
//! Three kinds of failure reach a caller:
//!
//! - the external source's own error, passed through untouched
//!   ([`RequestError::External`], [`SendFailure::GeneralFailure`],
//!   [`SendFailure::SendingFailed`]);
//! - an [`InvariantViolation`], raised by the adapter itself when a callback
//!   breaks its "exactly one of value or error" contract.
//!
//! Nothing in this crate retries.

use thiserror::Error;

// =============================================================================
// Invariant Violations
// =============================================================================

/// The external callback contract was broken.
///
/// This signals a defect in the wrapped SDK (or in the assumptions made about
/// it), not a normal runtime condition. It is always surfaced as its own error
/// kind and logged at `error` level when detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The callback delivered neither a value nor an error.
    #[error("callback delivered neither a value nor an error")]
    Empty,

    /// The callback delivered both a value and an error.
    #[error("callback delivered both a value and an error")]
    Conflicting,

    /// The completion handler was dropped without ever being invoked.
    #[error("completion handler dropped without being invoked")]
    Abandoned,
}

// =============================================================================
// Request Errors
// =============================================================================

/// Failure of a single-shot or progress-extended request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError<E> {
    /// The error reported by the external source, unchanged.
    #[error(transparent)]
    External(E),

    /// The external source broke the callback contract.
    #[error("callback contract violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl<E> RequestError<E> {
    /// Returns `true` for adapter-detected contract violations.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }

    /// Returns the external error, if that is what this is.
    pub fn external(&self) -> Option<&E> {
        match self {
            Self::External(err) => Some(err),
            Self::Invariant(_) => None,
        }
    }
}

// =============================================================================
// Send Failures
// =============================================================================

/// Failure of a message-producing operation.
///
/// Distinguishes whether the external source handed back a message object
/// along with the error, so callers can mark a provisional message as failed
/// in place instead of discarding it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendFailure<M, E> {
    /// Failed before any message object existed.
    #[error("send failed: {0}")]
    GeneralFailure(E),

    /// Failed after a message object was created.
    #[error("message could not be sent: {error}")]
    SendingFailed {
        /// The message object returned alongside the error.
        message: M,
        /// The error reported by the external source.
        error: E,
    },

    /// The external source broke the callback contract.
    #[error("callback contract violated: {0}")]
    Invariant(InvariantViolation),
}

impl<M, E> From<InvariantViolation> for SendFailure<M, E> {
    fn from(violation: InvariantViolation) -> Self {
        Self::Invariant(violation)
    }
}

impl<M, E> SendFailure<M, E> {
    /// Returns `true` for adapter-detected contract violations.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }

    /// The message object that failed to send, if one exists.
    pub fn failed_message(&self) -> Option<&M> {
        match self {
            Self::SendingFailed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// The external error, if any.
    pub fn external(&self) -> Option<&E> {
        match self {
            Self::GeneralFailure(error) | Self::SendingFailed { error, .. } => Some(error),
            Self::Invariant(_) => None,
        }
    }
}

/// Result type for single-shot requests.
pub type RequestResult<T, E> = Result<T, RequestError<E>>;

/// Result type for message-producing operations.
pub type SendResult<M, E> = Result<M, SendFailure<M, E>>;
