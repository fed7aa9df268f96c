//! Outbound ports: the host framework services the bridge drives.
//!
//! Every start call is synchronous and only schedules work. Completion is
//! reported later, through a framework event on the bus or, for resources and
//! game scenes, through the callbacks handed to the start call.

use crate::domain::requests::{OpenUiFormRequest, RowType, ShowEntityRequest};
use crate::error::TaskError;
use shared_types::{
    AssetAddress, AssetKind, ChannelId, GameSceneLoadState, HostError, LoadResourceStatus,
    LoadSceneParameters, LoadedAsset, Priority, SerialId, UserData,
};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// RESOURCES
// =============================================================================

type AssetSuccessFn = Box<dyn FnOnce(Option<LoadedAsset>, Duration) + Send>;
type AssetFailureFn = Box<dyn FnOnce(LoadResourceStatus, String) + Send>;

/// Completion callbacks for one asset load. Consumed by whichever outcome
/// the loader reports.
pub struct LoadAssetCallbacks {
    on_success: AssetSuccessFn,
    on_failure: AssetFailureFn,
}

impl LoadAssetCallbacks {
    pub fn new<S, F>(on_success: S, on_failure: F) -> Self
    where
        S: FnOnce(Option<LoadedAsset>, Duration) + Send + 'static,
        F: FnOnce(LoadResourceStatus, String) + Send + 'static,
    {
        Self {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        }
    }

    /// Report the loaded asset. `None` means the loader produced nothing.
    pub fn succeed(self, asset: Option<LoadedAsset>, duration: Duration) {
        (self.on_success)(asset, duration);
    }

    pub fn fail(self, status: LoadResourceStatus, message: impl Into<String>) {
        (self.on_failure)(status, message.into());
    }
}

impl fmt::Debug for LoadAssetCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadAssetCallbacks").finish_non_exhaustive()
    }
}

pub trait ResourceLoader: Send + Sync {
    /// Schedule an asset load. `kind` of `None` lets the loader pick the type.
    fn load_asset(
        &self,
        address: &AssetAddress,
        kind: Option<AssetKind>,
        priority: Option<Priority>,
        user_data: Option<UserData>,
        callbacks: LoadAssetCallbacks,
    ) -> Result<(), HostError>;
}

// =============================================================================
// ENTITIES, SCENES, UI, DATA TABLES
// =============================================================================

/// Reports `ShowEntitySuccess` / `ShowEntityFailure`.
pub trait EntityHost: Send + Sync {
    fn show_entity(&self, request: &ShowEntityRequest, priority: Priority) -> Result<(), HostError>;
}

/// Reports `LoadSceneSuccess` / `LoadSceneFailure` and
/// `UnloadSceneSuccess` / `UnloadSceneFailure`.
pub trait SceneHost: Send + Sync {
    fn load_scene(
        &self,
        address: &AssetAddress,
        priority: Priority,
        parameters: LoadSceneParameters,
    ) -> Result<(), HostError>;

    fn unload_scene(&self, address: &AssetAddress) -> Result<(), HostError>;
}

/// Reports `OpenUiFormSuccess` / `OpenUiFormFailure` keyed by the serial id
/// it returns.
pub trait UiHost: Send + Sync {
    fn open_ui_form(&self, request: &OpenUiFormRequest) -> Result<SerialId, HostError>;
}

/// A created, not yet loaded data table.
pub trait DataTable: Send + Sync {
    /// Schedule reading rows from `asset_name`. Reports
    /// `LoadDataTableSuccess` / `LoadDataTableFailure`.
    fn read_data(&self, asset_name: &str, priority: Priority) -> Result<(), HostError>;
}

pub trait DataTableHost: Send + Sync {
    fn create_data_table(
        &self,
        row_type: &RowType,
        name: Option<&str>,
    ) -> Result<Arc<dyn DataTable>, HostError>;

    /// Switch the resource package subsequent reads resolve against.
    fn set_current_package(&self, package_name: &str) -> Result<(), HostError>;
}

// =============================================================================
// GAME SCENES
// =============================================================================

/// Host-side retry decision, answered through callbacks.
pub trait RetryPolicy: Send + Sync {
    fn should_retry(
        &self,
        retry_count: u32,
        error: &HostError,
        on_decision: Box<dyn FnOnce(bool) + Send>,
        on_policy_failed: Box<dyn FnOnce(TaskError) + Send>,
    );
}

/// Host-side scene initialization, answered through callbacks.
pub trait SceneInitializer: Send + Sync {
    fn initialize(
        &self,
        user_data: Option<UserData>,
        on_success: Box<dyn FnOnce() + Send>,
        on_failure: Box<dyn FnOnce(TaskError) + Send>,
    );
}

pub type LoadStateListener = Arc<dyn Fn(GameSceneLoadState) + Send + Sync>;

/// Completion callbacks for one game scene load.
pub struct GameSceneCallbacks {
    pub state_changed: Option<LoadStateListener>,
    on_success: Box<dyn FnOnce() + Send>,
    on_failure: Box<dyn FnOnce(HostError) + Send>,
}

impl GameSceneCallbacks {
    pub fn new<S, F>(state_changed: Option<LoadStateListener>, on_success: S, on_failure: F) -> Self
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(HostError) + Send + 'static,
    {
        Self {
            state_changed,
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        }
    }

    pub fn report_state(&self, state: GameSceneLoadState) {
        if let Some(listener) = &self.state_changed {
            listener(state);
        }
    }

    /// The scene is loaded and initialized.
    pub fn succeed(self) {
        (self.on_success)();
    }

    pub fn fail(self, error: HostError) {
        (self.on_failure)(error);
    }
}

impl fmt::Debug for GameSceneCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSceneCallbacks")
            .field("state_changed", &self.state_changed.is_some())
            .finish_non_exhaustive()
    }
}

/// Loads a scene and runs its initializer, retrying per `retry_policy`.
pub trait GameSceneHost: Send + Sync {
    fn load_game_scene(
        &self,
        address: &AssetAddress,
        callbacks: GameSceneCallbacks,
        user_data: Option<UserData>,
        retry_policy: Option<Arc<dyn RetryPolicy>>,
    ) -> Result<(), HostError>;
}

// =============================================================================
// NETWORK
// =============================================================================

/// A network channel. Reports `NetworkConnected`, `NetworkMessage`,
/// `NetworkError` and `NetworkClosed` under its id.
pub trait NetworkChannel: Send + Sync {
    fn id(&self) -> ChannelId;

    fn is_connected(&self) -> bool;

    fn connect(&self, address: SocketAddr) -> Result<(), HostError>;
}
