//! # Shared Bus - Framework Event Bus
//!
//! The host framework reports the outcome of every long-running operation
//! (scene loaded, entity shown, form opened, message received...) as a
//! global event. This crate is the routing layer for those events.
//!
//! ```text
//! ┌──────────────┐  fire()/fire_now()  ┌──────────────┐  Handler<E>  ┌──────────────┐
//! │ Host service │ ──────────────────→ │  Event Bus   │ ───────────→ │ Subscriber   │
//! └──────────────┘   EventEnvelope     │ (by EventId) │  (narrowed)  └──────────────┘
//!                                      └──────────────┘
//!                                             ↑ subscribe()/unsubscribe()
//!                                   ┌────────────────────┐
//!                                   │SubscriptionRegistry│
//!                                   └────────────────────┘
//! ```
//!
//! - **Event identity:** every event type resolves to a stable [`EventId`],
//!   either its declared legacy id or one assigned on first use.
//! - **Typed subscriptions:** [`SubscriptionRegistry`] wraps a typed
//!   `Handler<E>` into the bus's envelope handler and remembers the pairing so
//!   the same handler can be unsubscribed later, and cannot be subscribed twice.
//! - **Scoped release:** [`SubscriptionScope`] releases a group of handles
//!   together when its owner goes away.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bus;
pub mod envelope;
pub mod events;
pub mod identity;
pub mod registry;
pub mod scope;

// Re-export main types
pub use bus::{EnvelopeHandler, EventBus, EventBusExt, InMemoryEventBus};
pub use envelope::{EventEnvelope, EventKind, GameEvent};
pub use identity::{EventId, EventIdResolver, DYNAMIC_EVENT_ID_SEED};
pub use registry::{Handler, SubscriptionError, SubscriptionHandle, SubscriptionRegistry};
pub use scope::SubscriptionScope;

/// Wrap a closure as a typed subscription handler.
///
/// The returned `Arc` is the handler's identity: keep a clone of it to
/// unsubscribe by handler later.
pub fn handler<E, F>(f: F) -> Handler<E>
where
    E: GameEvent,
    F: Fn(&E) + Send + Sync + 'static,
{
    std::sync::Arc::new(f)
}
