//! Inbound ports: async policies implemented by callers and plugged into the
//! host through the bridges in `retry` and `initializer`.

use crate::error::{TaskError, TaskResult};
use async_trait::async_trait;
use shared_types::UserData;

/// Decides whether a failed operation should be retried.
#[async_trait]
pub trait AsyncRetryPolicy: Send + Sync {
    /// `retry_count` is the number of retries already made.
    ///
    /// An `Err` means the decision itself failed; it is reported apart from
    /// `error`.
    async fn should_retry(&self, retry_count: u32, error: &TaskError) -> Result<bool, TaskError>;
}

/// Prepares a freshly loaded scene.
#[async_trait]
pub trait AsyncSceneInitializer: Send + Sync {
    async fn initialize(&self, _user_data: Option<UserData>) -> TaskResult<()> {
        Ok(())
    }
}
