//! # Game Tasks
//!
//! Awaitable, single-flight operations over a callback and event driven game
//! framework. The host starts an operation and later reports its outcome as
//! a framework event; this crate turns that protocol into one `Completion`
//! per logical operation, shared by every caller that asked for it.
//!
//! ## Flow
//!
//! ```text
//! caller ──load_scene_async(addr)──→ SceneTasks ──get_or_start──→ CompletionRegistry
//!                                        │                              │
//!                                        └──SceneHost::load_scene       │ (addr already in flight:
//!                                                   │                   │  attach, no second start)
//!                                                   ↓                   │
//!                               Event Bus ──LoadSceneSuccess──→ router ─┴─resolve(addr)──→ all waiters
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Description |
//! |-----------|-------------|
//! | Single flight | One host start per key while the key is pending |
//! | One outcome | Every waiter of an operation observes the same result |
//! | Fresh restart | A resolved key is removed; the next request starts anew |
//! | No lost result | An outcome reported from inside the start call is delivered |
//! | Cascade | Channel errors and closure fail every pending receive on the channel |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Completions, the single-flight registry, requests, configuration
//! - `ports/` - Host services (outbound) and caller policies (inbound)
//! - `adapters/` - One front end per host service, with its event routers
//! - `retry.rs`, `initializer.rs` - Bridges from async policies to host callbacks
//! - `service.rs` - [`TaskBridge`], wiring adapters to the bus
//!
//! ## Usage
//!
//! ```ignore
//! use game_tasks::TaskBridge;
//!
//! let bridge = TaskBridge::builder(bus)
//!     .with_scene_host(scene_manager)
//!     .build()?;
//!
//! let scenes = bridge.scenes().expect("scene host configured");
//! let scene = scenes
//!     .load_scene_async(address, LoadSceneParameters::default(), None)
//!     .await?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod initializer;
pub mod ports;
pub mod retry;
pub mod service;

// Re-export key types for convenience
pub use adapters::{
    DataTableTasks, EntityTasks, GameSceneLoadOptions, GameSceneTasks, NetworkTasks, ResourceTasks,
    SceneTasks, UiFormTasks,
};
pub use domain::{
    BridgeConfig, Completion, CompletionRegistry, LoadDataTableRequest, OpenUiFormRequest,
    OperationKey, PendingCompletion, PriorityConfig, RegistryStats, RetryConfig, RowType,
    ShowEntityRequest, TaskValue,
};
pub use error::{CascadeCause, TaskError, TaskResult};
pub use initializer::SceneInitializerBridge;
pub use ports::{
    AsyncRetryPolicy, AsyncSceneInitializer, DataTable, DataTableHost, EntityHost,
    GameSceneCallbacks, GameSceneHost, LoadAssetCallbacks, LoadStateListener, NetworkChannel,
    ResourceLoader, RetryPolicy, SceneHost, SceneInitializer, UiHost,
};
pub use retry::{run_with_retry, FixedRetryPolicy, RetryPolicyBridge};
pub use service::{TaskBridge, TaskBridgeBuilder};
