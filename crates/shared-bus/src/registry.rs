//! # Subscription Registry
//!
//! Binds caller handlers to the bus.
//!
//! The bus only knows [`EnvelopeHandler`]s, while callers subscribe typed
//! `Handler<E>`s. The registry builds the narrowing wrapper, remembers which
//! wrapper belongs to which caller handler, and uses that record to:
//!
//! - reject a second subscription of the same handler instance, and
//! - unsubscribe exactly the wrapper that was registered for it.
//!
//! Handler identity is the `Arc` allocation, so two clones of one handler are
//! the same handler and two equal closures are not.

use crate::bus::{handler_addr, EnvelopeHandler, EventBus};
use crate::envelope::{EventEnvelope, EventKind, GameEvent};
use crate::identity::EventId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Typed subscription handler.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The handler instance is already subscribed.
    #[error("Handler {handler:#x} is already subscribed to '{event}'")]
    DuplicateSubscription { event: &'static str, handler: usize },

    /// The handler was not subscribed to this event through this registry.
    #[error("Unsubscribe from '{event}' does not match any subscription")]
    MismatchedUnsubscription { event: &'static str },
}

struct Binding {
    kind: EventKind,
    id: EventId,
    wrapper: EnvelopeHandler,
}

struct RegistryInner {
    bus: Arc<dyn EventBus>,
    bindings: Mutex<HashMap<usize, Binding>>,
}

impl RegistryInner {
    /// Bus mutation happens under the bindings lock so a concurrent
    /// unsubscribe never runs ahead of its subscribe.
    fn bind(
        self: &Arc<Self>,
        key: usize,
        kind: EventKind,
        wrapper: EnvelopeHandler,
    ) -> Result<SubscriptionHandle, SubscriptionError> {
        let mut bindings = self.bindings.lock();
        if bindings.contains_key(&key) {
            return Err(SubscriptionError::DuplicateSubscription {
                event: kind.type_name,
                handler: key,
            });
        }

        let id = kind.id();
        self.bus.subscribe(id, wrapper.clone());
        bindings.insert(
            key,
            Binding {
                kind,
                id,
                wrapper: wrapper.clone(),
            },
        );
        debug!(event = kind.type_name, id = id.0, "Subscribed");

        Ok(SubscriptionHandle {
            registry: Arc::clone(self),
            key,
            kind,
            id,
            wrapper,
            released: AtomicBool::new(false),
        })
    }

    fn unbind(&self, key: usize, kind: &EventKind) -> Result<(), SubscriptionError> {
        let mut bindings = self.bindings.lock();
        match bindings.get(&key) {
            Some(binding) if binding.kind == *kind => {
                if let Some(binding) = bindings.remove(&key) {
                    self.bus.unsubscribe(binding.id, &binding.wrapper);
                    debug!(event = kind.type_name, id = binding.id.0, "Unsubscribed");
                }
                Ok(())
            }
            _ => Err(SubscriptionError::MismatchedUnsubscription {
                event: kind.type_name,
            }),
        }
    }

    /// Release a binding only if it still holds `wrapper`; a later
    /// subscription of the same handler has its own wrapper.
    fn release(&self, key: usize, wrapper: &EnvelopeHandler) -> bool {
        let mut bindings = self.bindings.lock();
        let owned = bindings
            .get(&key)
            .is_some_and(|b| handler_addr(&b.wrapper) == handler_addr(wrapper));
        if !owned {
            return false;
        }

        match bindings.remove(&key) {
            Some(binding) => {
                self.bus.unsubscribe(binding.id, &binding.wrapper);
                debug!(event = binding.kind.type_name, id = binding.id.0, "Released");
                true
            }
            None => false,
        }
    }
}

/// Typed front end to an [`EventBus`].
#[derive(Clone)]
pub struct SubscriptionRegistry {
    inner: Arc<RegistryInner>,
}

impl SubscriptionRegistry {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                bus,
                bindings: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The bus this registry subscribes to.
    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.inner.bus
    }

    /// Subscribe a typed handler to events of type `E`.
    pub fn subscribe<E: GameEvent>(
        &self,
        handler: &Handler<E>,
    ) -> Result<SubscriptionHandle, SubscriptionError> {
        let kind = EventKind::of::<E>();
        let typed = Arc::clone(handler);
        let wrapper: EnvelopeHandler =
            Arc::new(move |envelope: &EventEnvelope| match envelope.downcast_ref::<E>() {
                Some(event) => typed(event),
                None => warn!(
                    expected = kind.type_name,
                    received = envelope.kind().type_name,
                    id = envelope.id().0,
                    "Event payload does not match its id"
                ),
            });
        self.inner.bind(handler_addr(handler), kind, wrapper)
    }

    /// Subscribe an envelope handler to a kind known only at runtime.
    pub fn subscribe_dyn(
        &self,
        kind: EventKind,
        handler: &EnvelopeHandler,
    ) -> Result<SubscriptionHandle, SubscriptionError> {
        self.inner
            .bind(handler_addr(handler), kind, Arc::clone(handler))
    }

    /// Unsubscribe a handler previously passed to [`subscribe`](Self::subscribe).
    pub fn unsubscribe<E: GameEvent>(&self, handler: &Handler<E>) -> Result<(), SubscriptionError> {
        self.inner
            .unbind(handler_addr(handler), &EventKind::of::<E>())
    }

    /// Unsubscribe a handler previously passed to
    /// [`subscribe_dyn`](Self::subscribe_dyn).
    pub fn unsubscribe_dyn(
        &self,
        kind: EventKind,
        handler: &EnvelopeHandler,
    ) -> Result<(), SubscriptionError> {
        self.inner.unbind(handler_addr(handler), &kind)
    }

    /// Whether `handler` is currently subscribed through this registry.
    pub fn is_subscribed<F: ?Sized>(&self, handler: &Arc<F>) -> bool {
        self.inner
            .bindings
            .lock()
            .contains_key(&handler_addr(handler))
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.inner.bindings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An active subscription.
///
/// Dropping the handle leaves the handler subscribed; call
/// [`unsubscribe`](Self::unsubscribe) or hand it to a
/// [`SubscriptionScope`](crate::SubscriptionScope).
#[must_use = "the subscription stays active until unsubscribed"]
pub struct SubscriptionHandle {
    registry: Arc<RegistryInner>,
    key: usize,
    kind: EventKind,
    id: EventId,
    wrapper: EnvelopeHandler,
    released: AtomicBool,
}

impl SubscriptionHandle {
    /// Detach the handler this handle was created for.
    ///
    /// Idempotent. Returns `true` only for the call that actually detached it;
    /// `false` if it was already released, by this handle or by
    /// unsubscribing the handler directly. Works after every
    /// [`SubscriptionRegistry`] clone has been dropped.
    pub fn unsubscribe(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.registry.release(self.key, &self.wrapper)
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn event_id(&self) -> EventId {
        self.id
    }

    /// Whether this handle's subscription is still bound.
    pub fn is_active(&self) -> bool {
        if self.released.load(Ordering::Acquire) {
            return false;
        }
        self.registry
            .bindings
            .lock()
            .get(&self.key)
            .is_some_and(|b| handler_addr(&b.wrapper) == handler_addr(&self.wrapper))
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("event", &self.kind.type_name)
            .field("id", &self.id)
            .field("released", &self.released.load(Ordering::Relaxed))
            .finish()
    }
}
