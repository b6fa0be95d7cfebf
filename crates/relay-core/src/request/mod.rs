//! Callback-to-async adaptation.
//!
//! External operations report their outcome through a completion handler of
//! the form `(value?, error?)`. This module turns such operations into one of
//! three shapes:
//!
//! | Shape | Type | Items |
//! |-------|------|-------|
//! | Simple | [`CallbackFuture`] | one value or error |
//! | Progress-extended | [`ProgressStream`] | progress updates, then one terminal |
//! | Two-phase send | [`PendingSend`] | provisional, progress updates, then one terminal |
//!
//! The external call is started as soon as the adapter is constructed; polling
//! only observes the outcome. Dropping the future or stream leaves the
//! operation running and ignores its result.
//!
//! A completion that reports neither a value nor an error, or both, or is
//! dropped without being called, violates the callback contract and surfaces
//! as [`InvariantViolation`](crate::InvariantViolation) after being logged at
//! `error` level.

mod future;
mod progress;
mod send;

pub use future::{
    CallbackFuture, request, request_message, request_or_default, request_unit, signal,
};
pub use progress::{Progress, ProgressStream, request_with_progress};
pub use send::{PendingSend, SendEvent, send, send_with_progress};

use tokio::sync::mpsc;
use tracing::error;

use crate::error::{InvariantViolation, RequestError, SendFailure};

/// Completion handler for operations that produce a value.
pub type Completion<T, E> = Box<dyn FnOnce(Option<T>, Option<E>) + Send + 'static>;

/// Completion handler for operations that only report an optional error.
pub type ErrorCompletion<E> = Box<dyn FnOnce(Option<E>) + Send + 'static>;

/// Completion handler for operations that cannot fail.
pub type SignalCompletion = Box<dyn FnOnce() + Send + 'static>;

/// Progress handler for transfers.
pub type ProgressHandler = Box<dyn FnMut(TransferProgress) + Send + 'static>;

/// Byte counters reported during an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferProgress {
    /// Bytes sent since the previous report.
    pub bytes_sent: i64,
    /// Bytes sent so far.
    pub total_bytes_sent: i64,
    /// Bytes expected in total.
    pub total_bytes_expected: i64,
}

impl TransferProgress {
    pub fn new(bytes_sent: i64, total_bytes_sent: i64, total_bytes_expected: i64) -> Self {
        Self {
            bytes_sent,
            total_bytes_sent,
            total_bytes_expected,
        }
    }

    /// Fraction completed in `0.0..=1.0`, or `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        (self.total_bytes_expected > 0)
            .then(|| (self.total_bytes_sent as f64 / self.total_bytes_expected as f64).min(1.0))
    }
}

// =============================================================================
// Terminal delivery
// =============================================================================

/// Sender for the single terminal signal of a multi-item operation.
///
/// If it is dropped before [`Terminal::fire`] runs, the `abandoned` signal is
/// delivered instead, so a stream never hangs on a lost completion handler.
pub(crate) struct Terminal<S> {
    tx: Option<mpsc::UnboundedSender<S>>,
    abandoned: fn() -> S,
}

impl<S> Terminal<S> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<S>, abandoned: fn() -> S) -> Self {
        Self {
            tx: Some(tx),
            abandoned,
        }
    }

    pub(crate) fn fire(mut self, signal: S) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(signal);
        }
    }
}

impl<S> Drop for Terminal<S> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send((self.abandoned)());
        }
    }
}

// =============================================================================
// Settling
// =============================================================================

pub(crate) fn violation(violation: InvariantViolation) -> InvariantViolation {
    error!(%violation, "External callback contract violated");
    violation
}

/// Resolves a `(value?, error?)` pair where exactly one side must be present.
pub(crate) fn settle<T, E>(value: Option<T>, err: Option<E>) -> Result<T, RequestError<E>> {
    match (value, err) {
        (Some(value), None) => Ok(value),
        (None, Some(err)) => Err(RequestError::External(err)),
        (None, None) => Err(violation(InvariantViolation::Empty).into()),
        (Some(_), Some(_)) => Err(violation(InvariantViolation::Conflicting).into()),
    }
}

/// Like [`settle`], but an absent value without an error means "empty".
pub(crate) fn settle_or_default<T: Default, E>(
    value: Option<T>,
    err: Option<E>,
) -> Result<T, RequestError<E>> {
    match (value, err) {
        (None, None) => Ok(T::default()),
        (value, err) => settle(value, err),
    }
}

/// Resolves a message-producing completion.
///
/// An error that arrives with a message object keeps the message so the
/// caller can mark it failed in place.
pub(crate) fn settle_message<M, E>(message: Option<M>, err: Option<E>) -> Result<M, SendFailure<M, E>> {
    match (message, err) {
        (Some(message), None) => Ok(message),
        (None, Some(error)) => Err(SendFailure::GeneralFailure(error)),
        (Some(message), Some(error)) => Err(SendFailure::SendingFailed { message, error }),
        (None, None) => Err(violation(InvariantViolation::Empty).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle() {
        assert_eq!(settle::<_, ()>(Some(1), None), Ok(1));
        assert_eq!(settle::<u8, _>(None, Some("e")), Err(RequestError::External("e")));
        assert_eq!(
            settle::<u8, ()>(None, None),
            Err(RequestError::Invariant(InvariantViolation::Empty))
        );
        assert_eq!(
            settle(Some(1), Some("e")),
            Err(RequestError::Invariant(InvariantViolation::Conflicting))
        );
    }

    #[test]
    fn test_settle_or_default_substitutes_empty() {
        assert_eq!(settle_or_default::<Vec<u8>, ()>(None, None), Ok(vec![]));
        assert_eq!(
            settle_or_default::<Vec<u8>, _>(None, Some("e")),
            Err(RequestError::External("e"))
        );
    }

    #[test]
    fn test_settle_message_keeps_failed_message() {
        assert_eq!(
            settle_message(Some("m"), Some("e")),
            Err(SendFailure::SendingFailed {
                message: "m",
                error: "e"
            })
        );
        assert_eq!(
            settle_message::<&str, _>(None, Some("e")),
            Err(SendFailure::GeneralFailure("e"))
        );
        assert!(
            settle_message::<&str, &str>(None, None)
                .unwrap_err()
                .is_invariant_violation()
        );
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(TransferProgress::new(5, 50, 100).fraction(), Some(0.5));
        assert_eq!(TransferProgress::new(5, 5, 0).fraction(), None);
    }
}
