//! Single-value adaptation.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::sync::oneshot;

use super::{
    Completion, ErrorCompletion, SignalCompletion, settle, settle_message, settle_or_default,
    violation,
};
use crate::error::{InvariantViolation, RequestError, SendFailure};

/// Future resolving to the outcome of one callback-style operation.
///
/// Resolves to `Err(InvariantViolation::Abandoned)` if the completion handler
/// is dropped without being invoked.
#[must_use = "the operation runs regardless; dropping the future discards its result"]
#[derive(Debug)]
pub struct CallbackFuture<T, Err> {
    rx: oneshot::Receiver<Result<T, Err>>,
}

impl<T, Err> CallbackFuture<T, Err> {
    fn channel() -> (oneshot::Sender<Result<T, Err>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
}

impl<T, Err> Future for CallbackFuture<T, Err>
where
    Err: From<InvariantViolation>,
{
    type Output = Result<T, Err>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(Pin::new(&mut self.rx).poll(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(_) => Poll::Ready(Err(violation(InvariantViolation::Abandoned).into())),
        }
    }
}

/// Adapts an operation whose completion reports `(value?, error?)`.
///
/// Both sides absent, or both present, resolve to an invariant violation.
pub fn request<T, E, F>(start: F) -> CallbackFuture<T, RequestError<E>>
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(Completion<T, E>),
{
    let (tx, future) = CallbackFuture::channel();
    start(Box::new(move |value, err| {
        let _ = tx.send(settle(value, err));
    }));
    future
}

/// Like [`request`], but a completion with neither value nor error resolves to
/// `T::default()`.
///
/// Used for operations that report an empty collection as "nothing".
pub fn request_or_default<T, E, F>(start: F) -> CallbackFuture<T, RequestError<E>>
where
    T: Default + Send + 'static,
    E: Send + 'static,
    F: FnOnce(Completion<T, E>),
{
    let (tx, future) = CallbackFuture::channel();
    start(Box::new(move |value, err| {
        let _ = tx.send(settle_or_default(value, err));
    }));
    future
}

/// Adapts an operation whose completion reports only an optional error.
pub fn request_unit<E, F>(start: F) -> CallbackFuture<(), RequestError<E>>
where
    E: Send + 'static,
    F: FnOnce(ErrorCompletion<E>),
{
    let (tx, future) = CallbackFuture::channel();
    start(Box::new(move |err| {
        let _ = tx.send(match err {
            Some(err) => Err(RequestError::External(err)),
            None => Ok(()),
        });
    }));
    future
}

/// Adapts an operation whose completion carries no payload at all.
pub fn signal<E, F>(start: F) -> CallbackFuture<(), RequestError<E>>
where
    E: Send + 'static,
    F: FnOnce(SignalCompletion),
{
    let (tx, future) = CallbackFuture::channel();
    start(Box::new(move || {
        let _ = tx.send(Ok(()));
    }));
    future
}

/// Adapts a message-producing operation that returns no provisional value.
///
/// An error delivered together with a message resolves to
/// [`SendFailure::SendingFailed`].
pub fn request_message<M, E, F>(start: F) -> CallbackFuture<M, SendFailure<M, E>>
where
    M: Send + 'static,
    E: Send + 'static,
    F: FnOnce(Completion<M, E>),
{
    let (tx, future) = CallbackFuture::channel();
    start(Box::new(move |message, err| {
        let _ = tx.send(settle_message(message, err));
    }));
    future
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test]
    async fn test_value_resolves() {
        let result = request::<_, String, _>(|done| done(Some(7), None)).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_external_error_passes_through() {
        let result = request::<u32, _, _>(|done| done(None, Some("boom"))).await;
        assert_eq!(result.unwrap_err().external(), Some(&"boom"));
    }

    #[tokio::test]
    async fn test_empty_completion_is_invariant_violation() {
        let result = request::<u32, String, _>(|done| done(None, None)).await;
        assert_eq!(result, Err(RequestError::Invariant(InvariantViolation::Empty)));
    }

    #[tokio::test]
    async fn test_conflicting_completion_is_invariant_violation() {
        let result = request(|done| done(Some(1), Some("e"))).await;
        assert_eq!(
            result,
            Err(RequestError::Invariant(InvariantViolation::Conflicting))
        );
    }

    #[tokio::test]
    async fn test_dropped_completion_is_abandoned() {
        let result = request::<u32, String, _>(drop).await;
        assert_eq!(
            result,
            Err(RequestError::Invariant(InvariantViolation::Abandoned))
        );
    }

    #[tokio::test]
    async fn test_default_substitution() {
        let result = request_or_default::<Vec<u32>, String, _>(|done| done(None, None)).await;
        assert_eq!(result, Ok(vec![]));
    }

    #[tokio::test]
    async fn test_unit_and_signal() {
        assert_eq!(request_unit::<String, _>(|done| done(None)).await, Ok(()));
        assert_eq!(
            request_unit(|done| done(Some("denied"))).await,
            Err(RequestError::External("denied"))
        );
        assert_eq!(signal::<String, _>(|done| done()).await, Ok(()));
    }

    #[tokio::test]
    async fn test_message_failure_keeps_message() {
        let result = request_message(|done| done(Some("draft"), Some("rejected"))).await;
        assert_eq!(result.unwrap_err().failed_message(), Some(&"draft"));
    }

    #[tokio::test]
    async fn test_completion_from_another_thread() {
        let mut future = task::spawn(request::<_, String, _>(|done| {
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                done(Some("late"), None);
            });
        }));

        assert_pending!(future.poll());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(future.is_woken());
        assert_eq!(assert_ready!(future.poll()), Ok("late"));
    }
}
