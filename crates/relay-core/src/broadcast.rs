//! Multi-subscriber, replay-none broadcast.
//!
//! [`Broadcast`] is a passthrough bus: each [`Subscription`] receives every
//! value published after it attached, in publish order, and nothing from
//! before. Unlike `tokio::sync::broadcast`, a slow subscriber never loses
//! values to lagging; each subscriber has its own unbounded queue.
//!
//! Publishing is synchronous and never blocks on subscribers, so it is safe to
//! call straight from an SDK callback thread. A subscriber attached with
//! [`Broadcast::subscribe_where`] is only sent the values its predicate
//! accepts; everything else is never cloned into its queue.
//!
//! ```rust,ignore
//! let bus = Broadcast::new();
//! let mut sub = bus.subscribe();
//! bus.publish("hello");
//! assert_eq!(sub.recv().await, Some("hello"));
//! ```

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::trace;

/// Subscriber table shared by the bus and its subscriptions.
///
/// `None` once the bus has been closed.
struct Shared<T> {
    subscribers: RwLock<Option<Vec<Subscriber<T>>>>,
    next_id: AtomicU64,
}

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct Subscriber<T> {
    id: u64,
    tx: mpsc::UnboundedSender<T>,
    accepts: Option<Predicate<T>>,
}

impl<T> Subscriber<T> {
    fn wants(&self, value: &T) -> bool {
        self.accepts.as_ref().is_none_or(|accepts| accepts(value))
    }
}

impl<T> Shared<T> {
    fn detach(&self, id: u64) {
        if let Some(subscribers) = self.subscribers.write().as_mut() {
            subscribers.retain(|s| s.id != id);
        }
    }
}

// =============================================================================
// Broadcast
// =============================================================================

/// A replay-none, multi-subscriber channel.
///
/// Cloning a `Broadcast` yields another handle to the same subscriber set.
pub struct Broadcast<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Broadcast<T> {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                subscribers: RwLock::new(Some(Vec::new())),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Attaches a new subscriber.
    ///
    /// The subscription observes only values published after this call returns.
    /// On a closed bus it ends immediately.
    pub fn subscribe(&self) -> Subscription<T> {
        self.attach(None)
    }

    /// Attaches a subscriber that is only sent values `accepts` returns
    /// `true` for.
    ///
    /// The predicate runs on the publishing thread under the subscriber
    /// table's read lock; keep it cheap.
    pub fn subscribe_where<F>(&self, accepts: F) -> Subscription<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.attach(Some(Box::new(accepts)))
    }

    fn attach(&self, accepts: Option<Predicate<T>>) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        match self.shared.subscribers.write().as_mut() {
            Some(subscribers) => {
                subscribers.push(Subscriber { id, tx, accepts });
                trace!(subscriber = id, "Subscriber attached");
            }
            None => trace!(subscriber = id, "Subscribed to closed broadcast"),
        }

        Subscription {
            id,
            rx,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns the number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.read().as_ref().map_or(0, Vec::len)
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.subscribers.read().is_none()
    }

    /// Detaches every subscriber and rejects new ones. Existing streams end
    /// after draining what was already published to them.
    pub fn close(&self) {
        if let Some(removed) = self.shared.subscribers.write().take() {
            trace!(count = removed.len(), "Broadcast closed");
        }
    }
}

impl<T: Clone> Broadcast<T> {
    /// Publishes `value` to every current subscriber that accepts it.
    ///
    /// Returns how many subscribers received it. Subscribers whose receiving
    /// half has gone away are pruned.
    pub fn publish(&self, value: T) -> usize {
        let mut delivered = 0;
        let mut stale = false;

        if let Some(subscribers) = self.shared.subscribers.read().as_ref() {
            for subscriber in subscribers.iter().filter(|s| s.wants(&value)) {
                if subscriber.tx.send(value.clone()).is_ok() {
                    delivered += 1;
                } else {
                    stale = true;
                }
            }
        }

        if stale && let Some(subscribers) = self.shared.subscribers.write().as_mut() {
            subscribers.retain(|s| !s.tx.is_closed());
        }

        delivered
    }
}

impl<T> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcast")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// One subscriber's view of a [`Broadcast`].
///
/// Dropping the subscription detaches it; nothing else is affected.
pub struct Subscription<T> {
    id: u64,
    rx: mpsc::UnboundedReceiver<T>,
    shared: Weak<Shared<T>>,
}

impl<T> Subscription<T> {
    /// Receives the next value, or `None` once the bus has been closed or
    /// dropped and everything already queued has been drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Receives a queued value without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.detach(self.id);
            trace!(subscriber = self.id, "Subscriber detached");
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_no_replay_for_late_subscribers() {
        let bus = Broadcast::new();
        bus.publish(1);

        let mut sub = bus.subscribe();
        bus.publish(2);
        bus.publish(3);
        bus.close();

        let seen: Vec<_> = (&mut sub).collect().await;
        assert_eq!(seen, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_every_value() {
        let bus = Broadcast::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(bus.publish("x"), 2);

        assert_eq!(a.recv().await, Some("x"));
        assert_eq!(b.recv().await, Some("x"));
    }

    #[test]
    fn test_drop_detaches_only_that_subscriber() {
        let bus = Broadcast::new();
        let a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(a);
        assert_eq!(bus.subscriber_count(), 1);

        assert_eq!(bus.publish(5), 1);
        assert_eq!(b.try_recv(), Some(5));
    }

    #[tokio::test]
    async fn test_subscribe_after_close_ends_immediately() {
        let bus = Broadcast::new();
        bus.close();
        assert!(bus.is_closed());

        let mut late = bus.subscribe();
        assert_eq!(bus.publish(1), 0);
        assert_eq!(late.recv().await, None);
    }

    #[test]
    fn test_rejected_values_are_never_queued() {
        let bus = Broadcast::new();
        let mut evens = bus.subscribe_where(|n: &u32| n % 2 == 0);
        let mut all = bus.subscribe();

        let delivered: Vec<_> = (0..6).map(|n| bus.publish(n)).collect();
        assert_eq!(delivered, vec![2, 1, 2, 1, 2, 1]);

        bus.close();
        let mut queued = Vec::new();
        while let Some(n) = evens.try_recv() {
            queued.push(n);
        }
        assert_eq!(queued, vec![0, 2, 4]);
        assert_eq!(all.try_recv(), Some(0));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus: Broadcast<u32> = Broadcast::new();
        assert_eq!(bus.publish(1), 0);
    }

    #[tokio::test]
    async fn test_concurrent_publish_and_attach() {
        let bus = Broadcast::new();
        let mut observer = bus.subscribe();

        let publisher = {
            let bus = bus.clone();
            std::thread::spawn(move || {
                for i in 0..1000u32 {
                    bus.publish(i);
                }
            })
        };
        let churn = {
            let bus = bus.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let sub = bus.subscribe();
                    drop(sub);
                }
            })
        };

        publisher.join().unwrap();
        churn.join().unwrap();
        bus.close();

        let seen: Vec<_> = (&mut observer).collect().await;
        assert_eq!(seen, (0..1000).collect::<Vec<_>>());
        assert_eq!(bus.subscriber_count(), 0);
    }
}
