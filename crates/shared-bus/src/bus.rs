//! # Event Bus
//!
//! Id-routed dispatch of framework events.
//!
//! `fire` queues an event for the next `update()` pump (the host's frame
//! tick); `fire_now` dispatches synchronously on the calling thread.
//! Handlers never run while a bus lock is held, so a handler may subscribe,
//! unsubscribe or fire again.

use crate::envelope::{EventEnvelope, GameEvent};
use crate::identity::EventId;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Handler over the common envelope type.
pub type EnvelopeHandler = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

/// Pointer identity of a handler, ignoring the vtable half of the fat pointer.
pub(crate) fn handler_addr<F: ?Sized>(handler: &Arc<F>) -> usize {
    Arc::as_ptr(handler).cast::<()>() as usize
}

/// The host's global event service.
pub trait EventBus: Send + Sync {
    /// Add a handler for an event id.
    fn subscribe(&self, id: EventId, handler: EnvelopeHandler);

    /// Remove one registration of `handler` for `id`. Returns `false` if it
    /// was not registered.
    fn unsubscribe(&self, id: EventId, handler: &EnvelopeHandler) -> bool;

    /// Queue an event for the next dispatch pump.
    fn fire(&self, envelope: EventEnvelope);

    /// Dispatch an event immediately.
    fn fire_now(&self, envelope: EventEnvelope);
}

/// Typed helpers over any [`EventBus`].
pub trait EventBusExt: EventBus {
    fn fire_event<E: GameEvent>(&self, event: E) {
        self.fire(EventEnvelope::new(event));
    }

    fn fire_event_now<E: GameEvent>(&self, event: E) {
        self.fire_now(EventEnvelope::new(event));
    }
}

impl<B: EventBus + ?Sized> EventBusExt for B {}

/// In-process event bus.
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<EventId, Vec<EnvelopeHandler>>>,
    queue: Mutex<VecDeque<EventEnvelope>>,
    events_dispatched: AtomicU64,
    events_unhandled: AtomicU64,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            events_dispatched: AtomicU64::new(0),
            events_unhandled: AtomicU64::new(0),
        }
    }

    /// Dispatch every event queued before this call. Events fired by the
    /// handlers themselves wait for the next pump.
    ///
    /// Returns the number of events dispatched.
    pub fn update(&self) -> usize {
        let batch: Vec<EventEnvelope> = self.queue.lock().drain(..).collect();
        let count = batch.len();
        for envelope in batch {
            self.dispatch(&envelope);
        }
        count
    }

    /// Number of handlers registered for `id`.
    pub fn handler_count(&self, id: EventId) -> usize {
        self.handlers.read().get(&id).map_or(0, Vec::len)
    }

    /// Number of events waiting for `update()`.
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Total events dispatched to at least one handler.
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    /// Total events that found no handler.
    pub fn events_unhandled(&self) -> u64 {
        self.events_unhandled.load(Ordering::Relaxed)
    }

    fn dispatch(&self, envelope: &EventEnvelope) {
        let handlers = self
            .handlers
            .read()
            .get(&envelope.id())
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            self.events_unhandled.fetch_add(1, Ordering::Relaxed);
            trace!(
                event = envelope.kind().type_name,
                id = envelope.id().0,
                "No handlers for event"
            );
            return;
        }

        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
        for handler in handlers {
            handler(envelope);
        }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for InMemoryEventBus {
    fn subscribe(&self, id: EventId, handler: EnvelopeHandler) {
        let mut handlers = self.handlers.write();
        let list = handlers.entry(id).or_default();
        list.push(handler);
        debug!(id = id.0, handlers = list.len(), "Handler subscribed");
    }

    fn unsubscribe(&self, id: EventId, handler: &EnvelopeHandler) -> bool {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(&id) else {
            return false;
        };

        let target = handler_addr(handler);
        let Some(index) = list.iter().position(|h| handler_addr(h) == target) else {
            return false;
        };

        list.remove(index);
        if list.is_empty() {
            handlers.remove(&id);
        }
        debug!(id = id.0, "Handler unsubscribed");
        true
    }

    fn fire(&self, envelope: EventEnvelope) {
        self.queue.lock().push_back(envelope);
    }

    fn fire_now(&self, envelope: EventEnvelope) {
        self.dispatch(&envelope);
    }
}
