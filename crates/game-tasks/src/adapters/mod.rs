//! Adapters layer: one single-flight front end per host service.
//!
//! Each adapter starts operations through its host port and installs the
//! routers that turn the host's terminal events into resolutions.

pub mod data_table;
pub mod entity;
pub mod game_scene;
pub mod network;
pub mod resource;
pub mod scene;
pub mod ui_form;

pub use data_table::DataTableTasks;
pub use entity::EntityTasks;
pub use game_scene::{GameSceneLoadOptions, GameSceneTasks};
pub use network::NetworkTasks;
pub use resource::ResourceTasks;
pub use scene::SceneTasks;
pub use ui_form::UiFormTasks;

use crate::error::TaskError;
use shared_bus::{GameEvent, Handler, SubscriptionRegistry, SubscriptionScope};
use std::fmt::Display;
use std::sync::Arc;

/// Subscribe `route` for events of type `E`, owned by `scope`.
pub(crate) fn route<E, F>(
    subscriptions: &SubscriptionRegistry,
    scope: &SubscriptionScope,
    route: F,
) -> Result<(), TaskError>
where
    E: GameEvent,
    F: Fn(&E) + Send + Sync + 'static,
{
    let handler: Handler<E> = Arc::new(route);
    subscriptions.subscribe(&handler)?.bind_to(scope);
    Ok(())
}

pub(crate) fn operation_failed(
    operation: &'static str,
    key: impl Display,
    message: impl Into<String>,
) -> TaskError {
    TaskError::OperationFailed {
        operation,
        key: key.to_string(),
        message: message.into(),
    }
}

pub(crate) fn malformed_success(
    operation: &'static str,
    key: impl Display,
    reason: impl Into<String>,
) -> TaskError {
    TaskError::MalformedSuccess {
        operation,
        key: key.to_string(),
        reason: reason.into(),
    }
}
