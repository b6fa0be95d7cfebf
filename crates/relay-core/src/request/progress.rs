//! Progress-extended adaptation.

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use futures::stream::FusedStream;
use tokio::sync::mpsc;

use super::{Completion, ProgressHandler, Terminal, TransferProgress, settle, violation};
use crate::error::{InvariantViolation, RequestError, RequestResult};

/// Item of a [`ProgressStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress<T> {
    /// Intermediate transfer progress.
    Update(TransferProgress),
    /// The operation's value. Always the last item.
    Completed(T),
}

pub(crate) enum Signal<T, E> {
    Update(TransferProgress),
    Done(RequestResult<T, E>),
}

/// Stream of zero or more [`Progress::Update`]s followed by exactly one
/// terminal item: `Ok(Progress::Completed(_))` or `Err(_)`.
///
/// The stream ends right after the terminal item. Progress reported by the
/// external source after completion is discarded.
#[must_use = "streams do nothing unless polled"]
pub struct ProgressStream<T, E> {
    rx: mpsc::UnboundedReceiver<Signal<T, E>>,
    finished: bool,
}

impl<T, E> ProgressStream<T, E> {
    /// Skips progress and waits for the terminal outcome.
    pub async fn finish(mut self) -> RequestResult<T, E> {
        while let Some(signal) = self.rx.recv().await {
            if let Signal::Done(outcome) = signal {
                return outcome;
            }
        }
        Err(violation(InvariantViolation::Abandoned).into())
    }
}

impl<T, E> Unpin for ProgressStream<T, E> {}

impl<T, E> Stream for ProgressStream<T, E> {
    type Item = RequestResult<Progress<T>, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match ready!(self.rx.poll_recv(cx)) {
            Some(Signal::Update(progress)) => Poll::Ready(Some(Ok(Progress::Update(progress)))),
            Some(Signal::Done(outcome)) => {
                self.finished = true;
                self.rx.close();
                Poll::Ready(Some(outcome.map(Progress::Completed)))
            }
            None => {
                self.finished = true;
                Poll::Ready(None)
            }
        }
    }
}

impl<T, E> FusedStream for ProgressStream<T, E> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

/// Adapts an operation that reports transfer progress before completing.
pub fn request_with_progress<T, E, F>(start: F) -> ProgressStream<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(ProgressHandler, Completion<T, E>),
{
    let (tx, rx) = mpsc::unbounded_channel();
    let progress_tx = tx.clone();
    let terminal = Terminal::new(tx, || {
        Signal::Done(Err(RequestError::Invariant(violation(
            InvariantViolation::Abandoned,
        ))))
    });

    start(
        Box::new(move |progress| {
            let _ = progress_tx.send(Signal::Update(progress));
        }),
        Box::new(move |value, err| terminal.fire(Signal::Done(settle(value, err)))),
    );

    ProgressStream {
        rx,
        finished: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn p(n: i64) -> TransferProgress {
        TransferProgress::new(10, n * 10, 30)
    }

    #[tokio::test]
    async fn test_progress_then_terminal_then_nothing() {
        let mut late_progress = None;
        let stream = request_with_progress::<_, String, _>(|mut progress, done| {
            progress(p(1));
            progress(p(2));
            progress(p(3));
            done(Some("uploaded"), None);
            late_progress = Some(progress);
        });

        // Reported after the terminal item; must not be observed.
        if let Some(mut progress) = late_progress {
            progress(p(4));
        }

        let items: Vec<_> = stream.collect().await;
        assert_eq!(
            items,
            vec![
                Ok(Progress::Update(p(1))),
                Ok(Progress::Update(p(2))),
                Ok(Progress::Update(p(3))),
                Ok(Progress::Completed("uploaded")),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_is_terminal() {
        let items: Vec<_> = request_with_progress::<u32, _, _>(|mut progress, done| {
            progress(p(1));
            done(None, Some("too large"));
        })
        .collect()
        .await;

        assert_eq!(
            items,
            vec![
                Ok(Progress::Update(p(1))),
                Err(RequestError::External("too large"))
            ]
        );
    }

    #[tokio::test]
    async fn test_abandoned_completion_ends_stream() {
        let mut stream = request_with_progress::<u32, String, _>(|mut progress, done| {
            progress(p(1));
            drop(done);
            std::thread::spawn(move || progress(p(2)));
        });

        assert_eq!(stream.next().await, Some(Ok(Progress::Update(p(1)))));
        assert_eq!(
            stream.next().await,
            Some(Err(RequestError::Invariant(InvariantViolation::Abandoned)))
        );
        assert_eq!(stream.next().await, None);
        assert!(stream.is_terminated());
    }

    #[tokio::test]
    async fn test_finish_skips_progress() {
        let outcome = request_with_progress::<_, String, _>(|mut progress, done| {
            std::thread::spawn(move || {
                progress(p(1));
                progress(p(2));
                done(Some(3), None);
            });
        })
        .finish()
        .await;

        assert_eq!(outcome, Ok(3));
    }
}
