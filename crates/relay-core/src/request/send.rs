//! Two-phase (provisional, then confirmed) send adaptation.
//!
//! The external send call returns a provisional object synchronously and
//! reports the confirmed object later through its completion handler. The
//! completion may fire before the call has even returned, or concurrently on
//! another thread. [`PendingSend`] holds the provisional object itself and
//! buffers everything else, so the provisional is always observed first.

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use futures::stream::FusedStream;
use tokio::sync::mpsc;

use super::{Completion, ProgressHandler, Terminal, TransferProgress, settle_message, violation};
use crate::error::{InvariantViolation, SendFailure, SendResult};

/// Item of a [`PendingSend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendEvent<M> {
    /// The provisional object returned synchronously by the send call.
    Pending(M),
    /// Upload progress, for sends that carry a payload.
    Progress(TransferProgress),
    /// The confirmed object. Always the last item.
    Sent(M),
}

impl<M> SendEvent<M> {
    /// The message carried by this event, if any.
    pub fn message(&self) -> Option<&M> {
        match self {
            Self::Pending(message) | Self::Sent(message) => Some(message),
            Self::Progress(_) => None,
        }
    }
}

enum Signal<M, E> {
    Progress(TransferProgress),
    Done(SendResult<M, E>),
}

/// Stream of a two-phase send.
///
/// Yields, in order: `Ok(SendEvent::Pending(provisional))`, zero or more
/// `Ok(SendEvent::Progress(_))`, then exactly one terminal item, either
/// `Ok(SendEvent::Sent(_))` or `Err(SendFailure)`. Nothing follows the terminal
/// item.
#[must_use = "streams do nothing unless polled"]
pub struct PendingSend<M, E> {
    provisional: Option<M>,
    rx: mpsc::UnboundedReceiver<Signal<M, E>>,
    finished: bool,
}

impl<M, E> PendingSend<M, E> {
    fn new(provisional: M, rx: mpsc::UnboundedReceiver<Signal<M, E>>) -> Self {
        Self {
            provisional: Some(provisional),
            rx,
            finished: false,
        }
    }

    /// The provisional object, until it has been yielded.
    pub fn provisional(&self) -> Option<&M> {
        self.provisional.as_ref()
    }

    /// Skips the provisional object and progress, and waits for the outcome.
    pub async fn confirmed(mut self) -> SendResult<M, E> {
        while let Some(signal) = self.rx.recv().await {
            if let Signal::Done(outcome) = signal {
                return outcome;
            }
        }
        Err(violation(InvariantViolation::Abandoned).into())
    }
}

impl<M, E> Unpin for PendingSend<M, E> {}

impl<M, E> Stream for PendingSend<M, E> {
    type Item = Result<SendEvent<M>, SendFailure<M, E>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(provisional) = self.provisional.take() {
            return Poll::Ready(Some(Ok(SendEvent::Pending(provisional))));
        }
        if self.finished {
            return Poll::Ready(None);
        }

        match ready!(self.rx.poll_recv(cx)) {
            Some(Signal::Progress(progress)) => {
                Poll::Ready(Some(Ok(SendEvent::Progress(progress))))
            }
            Some(Signal::Done(outcome)) => {
                self.finished = true;
                self.rx.close();
                Poll::Ready(Some(outcome.map(SendEvent::Sent)))
            }
            None => {
                self.finished = true;
                Poll::Ready(None)
            }
        }
    }
}

impl<M, E> FusedStream for PendingSend<M, E> {
    fn is_terminated(&self) -> bool {
        self.provisional.is_none() && self.finished
    }
}

fn abandoned<M, E>() -> Signal<M, E> {
    Signal::Done(Err(SendFailure::Invariant(violation(
        InvariantViolation::Abandoned,
    ))))
}

/// Adapts a send call that returns a provisional object.
///
/// `start` invokes the external call, handing it the completion handler, and
/// returns the provisional object the call produced.
pub fn send<M, E, F>(start: F) -> PendingSend<M, E>
where
    M: Send + 'static,
    E: Send + 'static,
    F: FnOnce(Completion<M, E>) -> M,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let terminal = Terminal::new(tx, abandoned::<M, E>);

    let provisional = start(Box::new(move |message, err| {
        terminal.fire(Signal::Done(settle_message(message, err)))
    }));

    PendingSend::new(provisional, rx)
}

/// Like [`send`], for calls that also report upload progress.
pub fn send_with_progress<M, E, F>(start: F) -> PendingSend<M, E>
where
    M: Send + 'static,
    E: Send + 'static,
    F: FnOnce(ProgressHandler, Completion<M, E>) -> M,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let progress_tx = tx.clone();
    let terminal = Terminal::new(tx, abandoned::<M, E>);

    let provisional = start(
        Box::new(move |progress| {
            let _ = progress_tx.send(Signal::Progress(progress));
        }),
        Box::new(move |message, err| {
            terminal.fire(Signal::Done(settle_message(message, err)))
        }),
    );

    PendingSend::new(provisional, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test]
    async fn test_delayed_confirmation() {
        let stream = send::<_, String, _>(|done| {
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                done(Some("M2"), None);
            });
            "M1"
        });

        let items: Vec<_> = stream.collect().await;
        assert_eq!(
            items,
            vec![Ok(SendEvent::Pending("M1")), Ok(SendEvent::Sent("M2"))]
        );
    }

    #[tokio::test]
    async fn test_completion_before_return_is_reordered() {
        let stream = send::<_, String, _>(|done| {
            done(Some("confirmed"), None);
            "provisional"
        });

        let items: Vec<_> = stream.collect().await;
        assert_eq!(
            items,
            vec![
                Ok(SendEvent::Pending("provisional")),
                Ok(SendEvent::Sent("confirmed"))
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_message() {
        let mut stream = send(|done| {
            done(Some("failed copy"), Some("rate limited"));
            "provisional"
        });

        assert_eq!(
            stream.next().await,
            Some(Ok(SendEvent::Pending("provisional")))
        );
        assert_eq!(
            stream.next().await,
            Some(Err(SendFailure::SendingFailed {
                message: "failed copy",
                error: "rate limited"
            }))
        );
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_progress_between_provisional_and_terminal() {
        let stream = send_with_progress::<_, String, _>(|mut progress, done| {
            progress(TransferProgress::new(4, 4, 8));
            std::thread::spawn(move || {
                progress(TransferProgress::new(4, 8, 8));
                done(Some(2), None);
            });
            1
        });

        let items: Vec<_> = stream.collect().await;
        assert_eq!(
            items,
            vec![
                Ok(SendEvent::Pending(1)),
                Ok(SendEvent::Progress(TransferProgress::new(4, 4, 8))),
                Ok(SendEvent::Progress(TransferProgress::new(4, 8, 8))),
                Ok(SendEvent::Sent(2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_completion_after_provisional() {
        let mut stream = send::<_, String, _>(|done| {
            drop(done);
            "orphan"
        });

        assert_eq!(stream.provisional(), Some(&"orphan"));
        assert!(matches!(stream.next().await, Some(Ok(SendEvent::Pending(_)))));
        assert!(matches!(
            stream.next().await,
            Some(Err(SendFailure::Invariant(InvariantViolation::Abandoned)))
        ));
        assert!(stream.is_terminated());
    }

    #[tokio::test]
    async fn test_confirmed_skips_provisional() {
        let outcome = send::<_, String, _>(|done| {
            std::thread::spawn(move || done(Some(9), None));
            0
        })
        .confirmed()
        .await;

        assert_eq!(outcome, Ok(9));
    }
}
