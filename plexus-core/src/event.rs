//! Named events and their subscriber lists.

use crate::value::Value;
use arc_swap::ArcSwap;
use std::{fmt, sync::Arc};

/// A subscriber callback.
///
/// Handlers compare by identity: a clone of a handler equals the original,
/// two separately created handlers never do, even if they wrap the same code.
#[derive(Clone)]
pub struct EventHandler(Arc<dyn Fn(&[Value]) + Send + Sync>);

impl EventHandler {
    /// Wrap a callback.
    pub fn new(f: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, args: &[Value]) {
        (self.0)(args)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for EventHandler {}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Arc::as_ptr(&self.0))
    }
}

/// The subscriber-management handle of one named event.
///
/// The subscriber list is an immutable snapshot swapped on every change, so
/// [`Event::fire`] never holds a lock while handlers run. A handler added
/// during a firing first runs on the next firing; a handler removed during a
/// firing is not called for the rest of it.
pub struct Event {
    handlers: ArcSwap<Vec<EventHandler>>,
}

impl Event {
    /// Create an event with no subscribers.
    pub fn new() -> Self {
        Self {
            handlers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Create an event already wrapped for sharing with an operation table.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Append `handler` to the subscriber list.
    pub fn subscribe(&self, handler: EventHandler) {
        self.handlers.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(handler.clone());
            next
        });
    }

    /// Remove the most recently added occurrence of `handler`.
    ///
    /// Returns `false` if the handler was not subscribed.
    pub fn unsubscribe(&self, handler: &EventHandler) -> bool {
        let mut removed = false;
        self.handlers.rcu(|current| {
            let mut next: Vec<EventHandler> = Vec::clone(current);
            removed = match next.iter().rposition(|h| h == handler) {
                Some(idx) => {
                    next.remove(idx);
                    true
                }
                None => false,
            };
            next
        });
        removed
    }

    /// Invoke every current subscriber in subscription order.
    ///
    /// The list is captured when the firing starts. Each handler is checked
    /// against the live list just before it runs, so one unsubscribed by an
    /// earlier handler in the same firing is skipped.
    ///
    /// Returns the number of handlers invoked.
    pub fn fire(&self, args: &[Value]) -> usize {
        let snapshot = self.handlers.load_full();
        let mut invoked = 0;
        for handler in snapshot.iter() {
            if !self.handlers.load().contains(handler) {
                continue;
            }
            handler.call(args);
            invoked += 1;
        }
        invoked
    }

    /// Current number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.load().len()
    }

    /// Whether there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscriber_count() == 0
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
