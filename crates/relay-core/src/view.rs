//! Scope-filtered projections of an envelope broadcast.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::broadcast::{Broadcast, Subscription};
use crate::entity::{EventEnvelope, Scope};

/// A live stream of the events belonging to one [`Scope`].
///
/// The scope is checked when an envelope is published, so envelopes for any
/// other scope never reach the view's queue and never wake its task. Matching
/// ones are unwrapped to their payload in publish order. Dropping the view
/// detaches it from the underlying broadcast and affects nothing else.
#[derive(Debug)]
pub struct FilteredView<E> {
    scope: Scope,
    subscription: Subscription<EventEnvelope<E>>,
}

impl<E> FilteredView<E> {
    /// Attaches a view of `scope` to `source`.
    pub fn new(source: &Broadcast<EventEnvelope<E>>, scope: Scope) -> Self
    where
        E: 'static,
    {
        let admitted = scope.clone();
        Self {
            scope,
            subscription: source.subscribe_where(move |envelope| envelope.is_in(&admitted)),
        }
    }

    /// The scope this view admits.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Receives the next matching event.
    ///
    /// Returns `None` once the source has been closed and drained.
    pub async fn recv(&mut self) -> Option<E> {
        self.subscription.recv().await.map(EventEnvelope::into_event)
    }

    /// Returns the next already-queued matching event without waiting.
    pub fn try_recv(&mut self) -> Option<E> {
        self.subscription.try_recv().map(EventEnvelope::into_event)
    }
}

impl<E> Stream for FilteredView<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        Pin::new(&mut self.subscription)
            .poll_next(cx)
            .map(|envelope| envelope.map(EventEnvelope::into_event))
    }
}
