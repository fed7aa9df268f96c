//! Game scene loading: load a scene, run its initializer, retry on failure.
//!
//! The host reports through the callbacks handed to each call, so there is
//! no key and every call is its own operation.

use crate::domain::{Completion, PendingCompletion};
use crate::error::TaskError;
use crate::ports::{AsyncRetryPolicy, GameSceneCallbacks, GameSceneHost, LoadStateListener, RetryPolicy};
use crate::retry::RetryPolicyBridge;
use parking_lot::Mutex;
use shared_types::{AssetAddress, GameSceneLoadState, HostError, UserData};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

const LOAD_GAME_SCENE: &str = "load game scene";

/// Optional inputs of a game scene load.
#[derive(Default, Clone)]
pub struct GameSceneLoadOptions {
    pub progress: Option<LoadStateListener>,
    pub user_data: Option<UserData>,
    pub retry_policy: Option<Arc<dyn RetryPolicy>>,
}

impl GameSceneLoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_progress<F>(mut self, listener: F) -> Self
    where
        F: Fn(GameSceneLoadState) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(listener));
        self
    }

    #[must_use]
    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Use an async policy, bridged onto the current tokio runtime.
    pub fn with_async_retry_policy<P>(self, policy: Arc<P>) -> Result<Self, TaskError>
    where
        P: AsyncRetryPolicy + 'static,
    {
        let bridge = RetryPolicyBridge::new(policy)?;
        Ok(self.with_retry_policy(Arc::new(bridge)))
    }
}

impl fmt::Debug for GameSceneLoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSceneLoadOptions")
            .field("progress", &self.progress.is_some())
            .field("user_data", &self.user_data.is_some())
            .field("retry_policy", &self.retry_policy.is_some())
            .finish()
    }
}

type Slot = Arc<Mutex<Option<PendingCompletion<()>>>>;

pub struct GameSceneTasks {
    host: Arc<dyn GameSceneHost>,
}

impl GameSceneTasks {
    pub fn new(host: Arc<dyn GameSceneHost>) -> Self {
        Self { host }
    }

    /// Load the game scene at `address` and wait for it to be initialized.
    ///
    /// Fails with [`TaskError::Host`] when the host gives up, and with
    /// [`TaskError::Abandoned`] if the host drops the callbacks unanswered.
    pub fn load_game_scene_async(&self, address: &AssetAddress, options: GameSceneLoadOptions) -> Completion<()> {
        let pending = PendingCompletion::new(LOAD_GAME_SCENE, address.to_string());
        let completion = pending.completion();
        let slot: Slot = Arc::new(Mutex::new(Some(pending)));

        let on_success = {
            let slot = Arc::clone(&slot);
            let address = address.clone();
            move || {
                let pending = slot.lock().take();
                if let Some(pending) = pending {
                    debug!(address = %address, "Game scene loaded");
                    pending.succeed(());
                }
            }
        };
        let on_failure = {
            let slot = Arc::clone(&slot);
            let address = address.clone();
            move |error: HostError| {
                let pending = slot.lock().take();
                if let Some(pending) = pending {
                    warn!(address = %address, error = %error, "Game scene load failed");
                    pending.fail(TaskError::Host(error));
                }
            }
        };

        debug!(address = %address, retry = options.retry_policy.is_some(), "Loading game scene");
        let callbacks = GameSceneCallbacks::new(options.progress, on_success, on_failure);
        if let Err(error) =
            self.host
                .load_game_scene(address, callbacks, options.user_data, options.retry_policy)
        {
            warn!(address = %address, error = %error, "Host rejected game scene load");
            let pending = slot.lock().take();
            if let Some(pending) = pending {
                pending.fail(TaskError::StartFailed {
                    operation: LOAD_GAME_SCENE,
                    key: address.to_string(),
                    source: error,
                });
            }
        }

        completion
    }
}
