//! Ports layer: trait boundaries to the host framework and to callers.

pub mod inbound;
pub mod outbound;

pub use inbound::{AsyncRetryPolicy, AsyncSceneInitializer};
pub use outbound::{
    DataTable, DataTableHost, EntityHost, GameSceneCallbacks, GameSceneHost, LoadAssetCallbacks,
    LoadStateListener, NetworkChannel, ResourceLoader, RetryPolicy, SceneHost, SceneInitializer,
    UiHost,
};
