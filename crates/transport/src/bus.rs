//! Publish/subscribe for inbound chat events.
//!
//! Handlers are keyed by [`EventKind`] and fire in registration order. Every
//! registration hands back a [`Subscription`]; dropping it or calling
//! [`Subscription::unsubscribe`] removes exactly that handler and nothing else.

use behave_core::{EventKind, InboundEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Callback invoked with each published event of the subscribed kind
pub type Handler = Arc<dyn Fn(&InboundEvent) + Send + Sync>;

/// Opaque per-registration identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
}

impl Registry {
    fn remove(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        let Some(handlers) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        before != handlers.len()
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Event dispatcher shared between the connection and its subscribers.
///
/// Cloning is cheap; clones share the same handler registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&InboundEvent) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        let handler: Handler = Arc::new(handler);
        registry.handlers.entry(kind).or_default().push((id, handler));

        tracing::trace!(event = %kind, subscription = id.0, "Handler subscribed");
        Subscription { kind, id, registry: Some(Arc::downgrade(&self.registry)) }
    }

    /// Deliver `event` to every handler registered for its kind.
    ///
    /// The handler list is snapshotted before dispatch, so handlers may
    /// subscribe or unsubscribe from inside a callback. Returns the number of
    /// handlers invoked.
    pub fn publish(&self, event: &InboundEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = lock(&self.registry)
            .handlers
            .get(&kind)
            .map(|handlers| handlers.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default();

        tracing::trace!(event = %kind, handlers = handlers.len(), "Publishing event");
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Number of live handlers for `kind`
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        lock(&self.registry).handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = lock(&self.registry);
        let counts: HashMap<&'static str, usize> =
            registry.handlers.iter().map(|(kind, handlers)| (kind.as_str(), handlers.len())).collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

/// Handle for one registered handler; unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes its handler"]
#[derive(Debug)]
pub struct Subscription {
    kind: EventKind,
    id: SubscriptionId,
    registry: Option<Weak<Mutex<Registry>>>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether the handler is still registered
    pub fn is_active(&self) -> bool {
        let Some(registry) = self.registry.as_ref().and_then(Weak::upgrade) else {
            return false;
        };
        let guard = lock(&registry);
        guard
            .handlers
            .get(&self.kind)
            .is_some_and(|handlers| handlers.iter().any(|(id, _)| *id == self.id))
    }

    /// Remove the handler. Returns `false` if it was already gone.
    pub fn unsubscribe(mut self) -> bool {
        self.detach()
    }

    fn detach(&mut self) -> bool {
        let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) else {
            return false;
        };
        let removed = lock(&registry).remove(self.kind, self.id);
        if removed {
            tracing::trace!(event = %self.kind, subscription = self.id.0, "Handler unsubscribed");
        }
        removed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
