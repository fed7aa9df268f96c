//! # Pending Completions
//!
//! One-shot result slot with any number of waiters.
//!
//! ```text
//! PendingCompletion<T> ──complete(outcome)──→ oneshot ──→ Completion<T> (clone 1)
//!                                                     ├─→ Completion<T> (clone 2)
//!                                                     └─→ ...
//! ```
//!
//! Completing consumes the pending side, so a second resolution is
//! impossible by construction. Dropping it unresolved wakes every waiter with
//! [`TaskError::Abandoned`].

use crate::error::{TaskError, TaskResult};
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Values an operation can complete with.
pub trait TaskValue: Clone + Send + Sync + 'static {}

impl<T> TaskValue for T where T: Clone + Send + Sync + 'static {}

/// Awaitable outcome of an operation.
///
/// Cheap to clone; every clone yields the same outcome.
#[must_use = "a Completion does nothing unless awaited"]
pub struct Completion<T> {
    inner: Shared<BoxFuture<'static, TaskResult<T>>>,
}

impl<T: TaskValue> Completion<T> {
    /// An already-resolved completion.
    pub fn ready(outcome: TaskResult<T>) -> Self {
        Self {
            inner: future::ready(outcome).boxed().shared(),
        }
    }

    /// The outcome, if already resolved.
    pub fn peek(&self) -> Option<TaskResult<T>> {
        self.inner.peek().cloned()
    }
}

impl<T: TaskValue> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: TaskValue> Future for Completion<T> {
    type Output = TaskResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

/// The resolving side of an operation.
pub struct PendingCompletion<T> {
    sender: oneshot::Sender<TaskResult<T>>,
    completion: Completion<T>,
}

impl<T: TaskValue> PendingCompletion<T> {
    /// Create an unresolved completion for `operation` on `key`; both only
    /// label the error reported if it is abandoned.
    pub fn new(operation: &'static str, key: impl Into<String>) -> Self {
        let (sender, receiver) = oneshot::channel();
        let key = key.into();
        let inner = async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(TaskError::Abandoned { operation, key }))
        }
        .boxed()
        .shared();

        Self {
            sender,
            completion: Completion { inner },
        }
    }

    /// A waiter for this operation.
    pub fn completion(&self) -> Completion<T> {
        self.completion.clone()
    }

    /// Resolve every waiter with `outcome`.
    pub fn complete(self, outcome: TaskResult<T>) {
        // Send only fails once every waiter is gone, including ours.
        let _ = self.sender.send(outcome);
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: TaskError) {
        self.complete(Err(error));
    }
}

impl<T> fmt::Debug for PendingCompletion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCompletion").finish_non_exhaustive()
    }
}
