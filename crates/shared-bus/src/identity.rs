//! # Event Identity
//!
//! Maps event types to the numeric ids the bus routes on.
//!
//! Resolution order:
//! 1. A type that declares `GameEvent::LEGACY_ID` keeps that id verbatim, so
//!    events with externally assigned ids stay compatible.
//! 2. Any other type gets the next id from a monotonically increasing counter
//!    on first use. The result is memoized for the lifetime of the resolver.
//!
//! Ids are never reused or freed.

use crate::envelope::{EventKind, GameEvent};
use dashmap::DashMap;
use lazy_static::lazy_static;
use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use tracing::debug;

/// Counter seed for automatically assigned ids. The first assigned id is
/// `DYNAMIC_EVENT_ID_SEED + 1`; legacy ids are expected below the seed.
pub const DYNAMIC_EVENT_ID_SEED: i32 = 1000;

lazy_static! {
    static ref GLOBAL_RESOLVER: EventIdResolver = EventIdResolver::new();
}

/// Routing identifier of an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub i32);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Memoizing event id table.
///
/// Safe under concurrent first use: the per-type entry is claimed under the
/// map's shard lock, so exactly one caller runs the assignment and the
/// counter is incremented once per type.
pub struct EventIdResolver {
    ids: DashMap<TypeId, EventId>,
    next_id: AtomicI32,
}

impl EventIdResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: DashMap::new(),
            next_id: AtomicI32::new(DYNAMIC_EVENT_ID_SEED),
        }
    }

    /// The process-wide resolver used by envelopes and the subscription
    /// registry.
    pub fn global() -> &'static EventIdResolver {
        &GLOBAL_RESOLVER
    }

    /// Resolve the id for an event kind.
    pub fn resolve(&self, kind: &EventKind) -> EventId {
        if let Some(id) = self.ids.get(&kind.type_id) {
            return *id;
        }

        *self.ids.entry(kind.type_id).or_insert_with(|| {
            let id = match kind.legacy_id {
                Some(id) => id,
                None => EventId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            };
            debug!(event = kind.type_name, id = id.0, "Assigned event id");
            id
        })
    }

    /// Resolve the id for `E`.
    pub fn resolve_of<E: GameEvent>(&self) -> EventId {
        self.resolve(&EventKind::of::<E>())
    }

    /// Number of event types resolved so far.
    pub fn resolved_count(&self) -> usize {
        self.ids.len()
    }
}

impl Default for EventIdResolver {
    fn default() -> Self {
        Self::new()
    }
}
