//! # Retry Policies
//!
//! The bridge never retries on its own. A caller either drives a retry loop
//! with [`run_with_retry`] or hands a policy to the host (game scene loads)
//! through [`RetryPolicyBridge`], which answers the host's callback-style
//! question by running the async decision on a tokio runtime.
//!
//! A decision that itself fails is reported as
//! [`TaskError::RetryPolicyFailed`], carrying both the policy error and the
//! failure that was being judged.
//! If the runtime is gone before the decision is made, the host is answered
//! with [`TaskError::RuntimeUnavailable`] instead of being left waiting.

use crate::domain::RetryConfig;
use crate::error::{TaskError, TaskResult};
use crate::ports::{AsyncRetryPolicy, RetryPolicy};
use async_trait::async_trait;
use shared_types::HostError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Run `operation` until it succeeds or `policy` declines another attempt.
///
/// `retry_count` passed to the policy is the number of retries already made.
pub async fn run_with_retry<P, T, F, Fut>(policy: &P, mut operation: F) -> TaskResult<T>
where
    P: AsyncRetryPolicy + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = TaskResult<T>>,
{
    let mut retry_count = 0;
    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        match policy.should_retry(retry_count, &error).await {
            Ok(true) => {
                retry_count += 1;
                debug!(retry_count, error = %error, "Retrying operation");
            }
            Ok(false) => return Err(error),
            Err(policy_error) => {
                warn!(policy_error = %policy_error, error = %error, "Retry policy failed");
                return Err(TaskError::RetryPolicyFailed {
                    policy_error: Box::new(policy_error),
                    original: Box::new(error),
                });
            }
        }
    }
}

/// Retry up to `max_retries` times, pausing `delay` before each retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl FixedRetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.delay())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl AsyncRetryPolicy for FixedRetryPolicy {
    async fn should_retry(&self, retry_count: u32, _error: &TaskError) -> Result<bool, TaskError> {
        if retry_count >= self.max_retries {
            return Ok(false);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(true)
    }
}

/// Holds a host failure callback while work for the host is spawned.
///
/// Dropped without being disarmed or failed (the task was cancelled or its
/// runtime shut down), it reports [`TaskError::RuntimeUnavailable`].
pub(crate) struct FailOnDrop {
    operation: &'static str,
    on_failure: Option<Box<dyn FnOnce(TaskError) + Send>>,
}

impl FailOnDrop {
    pub(crate) fn new(operation: &'static str, on_failure: Box<dyn FnOnce(TaskError) + Send>) -> Self {
        Self {
            operation,
            on_failure: Some(on_failure),
        }
    }

    /// The host was answered through another callback.
    pub(crate) fn disarm(mut self) {
        self.on_failure = None;
    }

    pub(crate) fn fail(mut self, error: TaskError) {
        if let Some(on_failure) = self.on_failure.take() {
            on_failure(error);
        }
    }
}

impl Drop for FailOnDrop {
    fn drop(&mut self) {
        if let Some(on_failure) = self.on_failure.take() {
            warn!(operation = self.operation, "Runtime gone before the host was answered");
            on_failure(TaskError::RuntimeUnavailable);
        }
    }
}

/// Exposes an [`AsyncRetryPolicy`] as the host's callback [`RetryPolicy`].
pub struct RetryPolicyBridge<P: ?Sized> {
    policy: Arc<P>,
    runtime: Handle,
}

impl<P: AsyncRetryPolicy + ?Sized + 'static> RetryPolicyBridge<P> {
    /// Bridge `policy` onto the current tokio runtime.
    pub fn new(policy: Arc<P>) -> Result<Self, TaskError> {
        let runtime = Handle::try_current().map_err(|_| TaskError::RuntimeUnavailable)?;
        Ok(Self::with_runtime(policy, runtime))
    }

    pub fn with_runtime(policy: Arc<P>, runtime: Handle) -> Self {
        Self { policy, runtime }
    }
}

impl<P: AsyncRetryPolicy + ?Sized + 'static> RetryPolicy for RetryPolicyBridge<P> {
    fn should_retry(
        &self,
        retry_count: u32,
        error: &HostError,
        on_decision: Box<dyn FnOnce(bool) + Send>,
        on_policy_failed: Box<dyn FnOnce(TaskError) + Send>,
    ) {
        let policy = Arc::clone(&self.policy);
        let error = TaskError::Host(error.clone());
        let guard = FailOnDrop::new("retry decision", on_policy_failed);

        self.runtime.spawn(async move {
            match policy.should_retry(retry_count, &error).await {
                Ok(retry) => {
                    debug!(retry_count, retry, "Retry decision made");
                    guard.disarm();
                    on_decision(retry);
                }
                Err(policy_error) => {
                    warn!(retry_count, policy_error = %policy_error, "Retry policy failed");
                    guard.fail(TaskError::RetryPolicyFailed {
                        policy_error: Box::new(policy_error),
                        original: Box::new(error),
                    });
                }
            }
        });
    }
}
