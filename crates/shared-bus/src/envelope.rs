//! # Event Envelope
//!
//! The bus dispatches one common envelope type; subscribers narrow it back to
//! the concrete event.

use crate::identity::{EventId, EventIdResolver};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// An event the host framework can fire.
pub trait GameEvent: Any + Send + Sync {
    /// Externally assigned id, for events that predate automatic id
    /// assignment.
    const LEGACY_ID: Option<EventId> = None;
}

/// Runtime description of an event type.
///
/// Equality uses the type id only.
#[derive(Debug, Clone, Copy)]
pub struct EventKind {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub legacy_id: Option<EventId>,
}

impl EventKind {
    pub fn of<E: GameEvent>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            legacy_id: E::LEGACY_ID,
        }
    }

    /// Routing id from the global resolver.
    pub fn id(&self) -> EventId {
        EventIdResolver::global().resolve(self)
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EventKind {}

/// A fired event on its way to subscribers.
#[derive(Clone)]
pub struct EventEnvelope {
    id: EventId,
    kind: EventKind,
    payload: Arc<dyn Any + Send + Sync>,
}

impl EventEnvelope {
    /// Wrap an event, routed by the global resolver.
    pub fn new<E: GameEvent>(event: E) -> Self {
        let kind = EventKind::of::<E>();
        Self {
            id: kind.id(),
            kind,
            payload: Arc::new(event),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Whether the payload is an `E`.
    pub fn is<E: GameEvent>(&self) -> bool {
        self.payload.is::<E>()
    }

    /// Narrow the payload to `E`.
    pub fn downcast_ref<E: GameEvent>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("id", &self.id)
            .field("event", &self.kind.type_name)
            .finish()
    }
}
