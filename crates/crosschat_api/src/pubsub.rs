use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::events::Event;

/// Opaque, process-unique handle of one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Predicate deciding which published events a subscriber receives
pub type Predicate = Box<dyn Fn(&str, &Event) -> bool + Send + Sync>;

#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("channel name cannot be empty")]
    EmptyChannel,

    #[error("mailbox must have capacity for at least one event")]
    NoCapacity,
}

/// Channel-keyed fan-out to bounded subscriber mailboxes
///
/// Publishing never blocks: delivery is a try-send per subscriber under the
/// registry mutex, and a full mailbox silently drops that event for that
/// subscriber only. The mutex also makes a given subscriber observe
/// publishes in publish-start order; there is no cross-subscriber ordering.
///
/// Mailboxes stay owned by the caller. Keep the receiving end alive until
/// [`unsubscribe`](Registry::unsubscribe) has returned so no publish can
/// race its destruction.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriberId, Subscriber>>,
}

struct Subscriber {
    accepts: Predicate,
    mailbox: mpsc::Sender<Event>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every event published on one channel
    pub fn subscribe(
        &self,
        channel: &str,
        mailbox: mpsc::Sender<Event>,
    ) -> Result<SubscriberId, SubscribeError> {
        if channel.is_empty() {
            return Err(SubscribeError::EmptyChannel);
        }

        let channel = channel.to_string();
        self.subscribe_matching(move |published, _| published == channel, mailbox)
    }

    /// Subscribe with an arbitrary `(channel, event)` predicate
    pub fn subscribe_matching<F>(
        &self,
        accepts: F,
        mailbox: mpsc::Sender<Event>,
    ) -> Result<SubscriberId, SubscribeError>
    where
        F: Fn(&str, &Event) -> bool + Send + Sync + 'static,
    {
        if mailbox.max_capacity() == 0 {
            return Err(SubscribeError::NoCapacity);
        }

        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let subscriber = Subscriber {
            accepts: Box::new(accepts),
            mailbox,
        };

        self.inner.subscribers.lock().insert(id, subscriber);
        Ok(id)
    }

    /// Remove a subscription; unknown ids are a no-op
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.inner.subscribers.lock().remove(&id);
    }

    /// Deliver an event to every accepting subscriber without blocking
    pub fn publish(&self, channel: &str, event: &Event) {
        let subscribers = self.inner.subscribers.lock();

        for (id, subscriber) in subscribers.iter() {
            if !(subscriber.accepts)(channel, event) {
                continue;
            }

            match subscriber.mailbox.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(?id, channel, "mailbox full, dropping event");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(?id, channel, "mailbox closed, dropping event");
                }
            }
        }
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receiving half of a subscription that unsubscribes itself when dropped
///
/// Wraps the caller-owned mailbox receiver; dropping the stream first
/// removes the registry entry, then releases the mailbox, in that order.
pub struct Subscription {
    registry: Registry,
    id: SubscriberId,
    mailbox: mpsc::Receiver<Event>,
}

impl Subscription {
    pub fn new(registry: Registry, id: SubscriberId, mailbox: mpsc::Receiver<Event>) -> Self {
        Self {
            registry,
            id,
            mailbox,
        }
    }
}

impl Stream for Subscription {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().mailbox.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.id);
    }
}
