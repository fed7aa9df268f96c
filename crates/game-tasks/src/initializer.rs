//! Exposes an [`AsyncSceneInitializer`] as the host's callback
//! [`SceneInitializer`]. A runtime that is gone before the initializer runs
//! reports [`TaskError::RuntimeUnavailable`].

use crate::error::TaskError;
use crate::ports::{AsyncSceneInitializer, SceneInitializer};
use crate::retry::FailOnDrop;
use shared_types::UserData;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

pub struct SceneInitializerBridge<I: ?Sized> {
    initializer: Arc<I>,
    runtime: Handle,
}

impl<I: AsyncSceneInitializer + ?Sized + 'static> SceneInitializerBridge<I> {
    /// Bridge `initializer` onto the current tokio runtime.
    pub fn new(initializer: Arc<I>) -> Result<Self, TaskError> {
        let runtime = Handle::try_current().map_err(|_| TaskError::RuntimeUnavailable)?;
        Ok(Self::with_runtime(initializer, runtime))
    }

    pub fn with_runtime(initializer: Arc<I>, runtime: Handle) -> Self {
        Self {
            initializer,
            runtime,
        }
    }
}

impl<I: AsyncSceneInitializer + ?Sized + 'static> SceneInitializer for SceneInitializerBridge<I> {
    fn initialize(
        &self,
        user_data: Option<UserData>,
        on_success: Box<dyn FnOnce() + Send>,
        on_failure: Box<dyn FnOnce(TaskError) + Send>,
    ) {
        let initializer = Arc::clone(&self.initializer);
        let guard = FailOnDrop::new("scene initializer", on_failure);
        self.runtime.spawn(async move {
            match initializer.initialize(user_data).await {
                Ok(()) => {
                    debug!("Scene initialized");
                    guard.disarm();
                    on_success();
                }
                Err(error) => {
                    warn!(error = %error, "Scene initializer failed");
                    guard.fail(error);
                }
            }
        });
    }
}
