//! # Subscription Scope
//!
//! Ties a group of subscriptions to the lifetime of an owner (a form, an
//! entity, a service). Everything in the scope is unsubscribed when the scope
//! is released or dropped.

use crate::registry::SubscriptionHandle;
use parking_lot::Mutex;

#[derive(Default)]
pub struct SubscriptionScope {
    handles: Mutex<Vec<SubscriptionHandle>>,
}

impl SubscriptionScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a handle.
    pub fn add(&self, handle: SubscriptionHandle) {
        self.handles.lock().push(handle);
    }

    /// Number of handles held.
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unsubscribe every held handle. Returns how many were still bound.
    pub fn release_all(&self) -> usize {
        let handles: Vec<SubscriptionHandle> = self.handles.lock().drain(..).collect();
        handles.iter().filter(|h| h.unsubscribe()).count()
    }
}

impl Drop for SubscriptionScope {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl SubscriptionHandle {
    /// Hand this subscription to `scope`.
    pub fn bind_to(self, scope: &SubscriptionScope) {
        scope.add(self);
    }
}
