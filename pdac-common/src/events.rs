//! Named-topic publish/subscribe register
//!
//! Provides the EventSink each widget instance owns to deliver `select`,
//! `unselect` and `error` notifications to host application code.
//!
//! Delivery is synchronous and follows registration order. Handlers are
//! invoked after the internal registry lock has been released, so a handler
//! may subscribe or unsubscribe without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Topic that receives every published event
pub const WILDCARD_TOPIC: &str = "*";

/// Token returned by [`EventSink::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Arc<dyn Fn(&str, &E) + Send + Sync>;

struct Subscription<E> {
    id: SubscriptionId,
    topic: String,
    handler: Handler<E>,
}

/// Per-instance event register
///
/// # Examples
///
/// ```
/// use pdac_common::events::EventSink;
/// use std::sync::{Arc, Mutex};
///
/// let sink: EventSink<String> = EventSink::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let seen_clone = Arc::clone(&seen);
/// let token = sink.subscribe("select", move |_topic, payload: &String| {
///     seen_clone.lock().unwrap().push(payload.clone());
/// });
///
/// assert_eq!(sink.publish("select", &"Voorstad".to_string()), 1);
/// assert!(sink.unsubscribe(token));
/// assert_eq!(sink.publish("select", &"Voorstad".to_string()), 0);
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub struct EventSink<E> {
    subscriptions: Mutex<Vec<Subscription<E>>>,
    next_id: AtomicU64,
}

impl<E> EventSink<E> {
    /// Creates an empty register
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `handler` for `topic`
    ///
    /// Subscribing to [`WILDCARD_TOPIC`] receives every event. The handler
    /// receives the topic the event was published under.
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let topic = topic.into();
        tracing::trace!(topic = %topic, id = id.0, "Subscribed");

        self.lock().push(Subscription {
            id,
            topic,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a subscription
    ///
    /// Returns `false` if the token was unknown (already removed).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.lock();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        before != subscriptions.len()
    }

    /// Deliver `event` to every handler registered for `topic` or the wildcard
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, topic: &str, event: &E) -> usize {
        let handlers: Vec<Handler<E>> = self
            .lock()
            .iter()
            .filter(|s| s.topic == topic || s.topic == WILDCARD_TOPIC)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        tracing::trace!(topic = %topic, handlers = handlers.len(), "Publishing event");

        for handler in &handlers {
            handler(topic, event);
        }
        handlers.len()
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscription<E>>> {
        // A panicking handler never runs under the lock, so poisoning only
        // happens on internal bugs; the registry stays usable either way.
        self.subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<E> Default for EventSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventSink<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("subscriptions", &self.subscriber_count())
            .finish()
    }
}
