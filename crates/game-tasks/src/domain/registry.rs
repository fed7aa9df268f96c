//! # Single-Flight Completion Registry
//!
//! Keyed table of in-flight operations.
//!
//! Flow (caller-chosen keys):
//! 1. Adapter calls `get_or_start(key, starter)`
//! 2. If `key` is in flight, the caller attaches to it and `starter` is skipped
//! 3. Otherwise a pending completion is stored under `key` and `starter` asks
//!    the host to begin the operation
//! 4. The host's terminal event reaches a router, which calls `resolve()`
//! 5. `resolve()` removes `key` and wakes every attached caller
//!
//! Flow (host-assigned keys, `start_then_register`): the key is only known
//! once the start call returns, so an outcome reported before registration is
//! parked and picked up by the registration.
//!
//! ## Invariants
//!
//! - A key maps to at most one pending completion.
//! - The starter runs at most once per pending completion, never under a lock.
//! - A resolved completion is removed in the same step and never handed out
//!   again; the next request for the key starts a fresh operation.

use crate::domain::completion::{Completion, PendingCompletion, TaskValue};
use crate::error::{TaskError, TaskResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared_types::HostError;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Correlation key between a started operation and its terminal event.
pub trait OperationKey: Eq + Hash + Clone + Debug + Display + Send + Sync + 'static {}

impl<K> OperationKey for K where K: Eq + Hash + Clone + Debug + Display + Send + Sync + 'static {}

/// Registry counters.
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Operations started
    pub started: AtomicU64,
    /// Requests that attached to an operation already in flight
    pub attached: AtomicU64,
    /// Operations resolved with a value
    pub resolved: AtomicU64,
    /// Operations resolved with an error
    pub failed: AtomicU64,
    /// Resolutions for keys with nothing pending
    pub ignored: AtomicU64,
}

pub struct CompletionRegistry<K, T> {
    operation: &'static str,
    pending: DashMap<K, PendingCompletion<T>>,
    /// Starts in progress for host-assigned keys.
    starting: AtomicUsize,
    /// Outcomes that arrived for a host-assigned key before it was registered.
    early: Mutex<HashMap<K, TaskResult<T>>>,
    stats: RegistryStats,
}

impl<K: OperationKey, T: TaskValue> CompletionRegistry<K, T> {
    /// Create an empty registry. `operation` names the operation in logs and
    /// errors, e.g. `"load scene"`.
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            pending: DashMap::new(),
            starting: AtomicUsize::new(0),
            early: Mutex::new(HashMap::new()),
            stats: RegistryStats::default(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Attach to the operation in flight for `key`, or start one.
    ///
    /// `starter` runs only when nothing is in flight, after the entry is
    /// stored, so a host that reports completion synchronously from inside
    /// `starter` still finds it. A starter error fails every waiter with
    /// [`TaskError::StartFailed`].
    pub fn get_or_start<F>(&self, key: K, starter: F) -> Completion<T>
    where
        F: FnOnce(&K) -> Result<(), HostError>,
    {
        let completion = match self.pending.entry(key.clone()) {
            Entry::Occupied(entry) => {
                self.stats.attached.fetch_add(1, Ordering::Relaxed);
                debug!(operation = self.operation, key = %key, "Attached to pending operation");
                return entry.get().completion();
            }
            Entry::Vacant(entry) => {
                let pending = PendingCompletion::new(self.operation, key.to_string());
                let completion = pending.completion();
                entry.insert(pending);
                completion
            }
        };

        self.stats.started.fetch_add(1, Ordering::Relaxed);
        debug!(operation = self.operation, key = %key, "Starting operation");

        if let Err(error) = starter(&key) {
            warn!(
                operation = self.operation,
                key = %key,
                error = %error,
                "Host rejected operation start"
            );
            let failure = TaskError::StartFailed {
                operation: self.operation,
                key: key.to_string(),
                source: error,
            };
            self.resolve(&key, Err(failure));
        }

        completion
    }

    /// Attach to the operation in flight for `key`, or register a new one
    /// without starting anything (the host produces the outcome on its own).
    pub fn get_or_wait(&self, key: K) -> Completion<T> {
        self.get_or_start(key, |_| Ok(()))
    }

    /// Start an operation whose key is assigned by the host.
    ///
    /// `starter` runs without any lock held and returns the key. An outcome
    /// the host reports for that key before it is registered (including
    /// synchronously from inside `starter`) is delivered to the returned
    /// completion.
    pub fn start_then_register<F>(&self, starter: F) -> Completion<T>
    where
        F: FnOnce() -> Result<K, HostError>,
    {
        self.starting.fetch_add(1, Ordering::SeqCst);
        let started = starter();

        let mut early = self.early.lock();
        let completion = match started {
            Ok(key) => {
                self.stats.started.fetch_add(1, Ordering::Relaxed);
                match early.remove(&key) {
                    Some(outcome) => {
                        debug!(operation = self.operation, key = %key, "Delivered parked outcome");
                        self.record(&outcome);
                        Completion::ready(outcome)
                    }
                    None => match self.pending.entry(key) {
                        Entry::Occupied(entry) => {
                            self.stats.attached.fetch_add(1, Ordering::Relaxed);
                            entry.get().completion()
                        }
                        Entry::Vacant(entry) => {
                            debug!(operation = self.operation, key = %entry.key(), "Registered operation");
                            let pending = PendingCompletion::new(self.operation, entry.key().to_string());
                            let completion = pending.completion();
                            entry.insert(pending);
                            completion
                        }
                    },
                }
            }
            Err(error) => {
                warn!(operation = self.operation, error = %error, "Host rejected operation start");
                let failure = TaskError::StartFailed {
                    operation: self.operation,
                    key: String::from("<unassigned>"),
                    source: error,
                };
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                Completion::ready(Err(failure))
            }
        };

        if self.starting.fetch_sub(1, Ordering::SeqCst) == 1 && !early.is_empty() {
            debug!(
                operation = self.operation,
                discarded = early.len(),
                "Discarding unclaimed parked outcomes"
            );
            early.clear();
        }

        completion
    }

    /// Resolve the operation in flight for `key`.
    ///
    /// Returns `false` (and does nothing) if nothing is pending for `key`,
    /// unless a host-assigned start is in progress, in which case the outcome
    /// is parked for it.
    pub fn resolve(&self, key: &K, outcome: TaskResult<T>) -> bool {
        let mut early = self.early.lock();
        if let Some((_, pending)) = self.pending.remove(key) {
            drop(early);
            debug!(
                operation = self.operation,
                key = %key,
                success = outcome.is_ok(),
                "Resolved operation"
            );
            self.record(&outcome);
            pending.complete(outcome);
            return true;
        }

        if self.starting.load(Ordering::SeqCst) > 0 {
            debug!(operation = self.operation, key = %key, "Parked outcome for unregistered key");
            early.insert(key.clone(), outcome);
            return true;
        }

        self.stats.ignored.fetch_add(1, Ordering::Relaxed);
        debug!(operation = self.operation, key = %key, "No pending operation for key");
        false
    }

    pub fn resolve_success(&self, key: &K, value: T) -> bool {
        self.resolve(key, Ok(value))
    }

    pub fn resolve_failure(&self, key: &K, error: TaskError) -> bool {
        self.resolve(key, Err(error))
    }

    /// Fail every pending operation with `error`. Returns how many were failed.
    pub fn fail_all(&self, error: &TaskError) -> usize {
        let keys: Vec<K> = self.pending.iter().map(|entry| entry.key().clone()).collect();
        let mut failed = 0;
        for key in keys {
            if let Some((_, pending)) = self.pending.remove(&key) {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                pending.fail(error.clone());
                failed += 1;
            }
        }
        if failed > 0 {
            warn!(operation = self.operation, failed, error = %error, "Failed all pending operations");
        }
        failed
    }

    pub fn contains(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    fn record(&self, outcome: &TaskResult<T>) {
        let counter = if outcome.is_ok() {
            &self.stats.resolved
        } else {
            &self.stats.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl<K: OperationKey, T> Debug for CompletionRegistry<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionRegistry")
            .field("operation", &self.operation)
            .field("pending", &self.pending.len())
            .finish()
    }
}
