//! Scene loading and unloading, keyed by the scene asset address.

use crate::adapters::{malformed_success, operation_failed, route};
use crate::domain::{Completion, CompletionRegistry, PriorityConfig};
use crate::error::{TaskError, TaskResult};
use crate::ports::SceneHost;
use shared_bus::events::{LoadSceneFailure, LoadSceneSuccess, UnloadSceneFailure, UnloadSceneSuccess};
use shared_bus::{SubscriptionRegistry, SubscriptionScope};
use shared_types::{AssetAddress, LoadSceneParameters, Priority, Scene};
use std::sync::Arc;
use tracing::warn;

const LOAD_SCENE: &str = "load scene";
const UNLOAD_SCENE: &str = "unload scene";

pub struct SceneTasks {
    host: Arc<dyn SceneHost>,
    loads: Arc<CompletionRegistry<AssetAddress, Scene>>,
    unloads: Arc<CompletionRegistry<AssetAddress, ()>>,
    default_priority: Priority,
}

impl SceneTasks {
    pub fn new(host: Arc<dyn SceneHost>, priorities: &PriorityConfig) -> Self {
        Self {
            host,
            loads: Arc::new(CompletionRegistry::new(LOAD_SCENE)),
            unloads: Arc::new(CompletionRegistry::new(UNLOAD_SCENE)),
            default_priority: priorities.scene_asset,
        }
    }

    pub fn loads(&self) -> &CompletionRegistry<AssetAddress, Scene> {
        &self.loads
    }

    pub fn unloads(&self) -> &CompletionRegistry<AssetAddress, ()> {
        &self.unloads
    }

    pub fn load_scene_async(
        &self,
        address: AssetAddress,
        parameters: LoadSceneParameters,
        priority: Option<Priority>,
    ) -> Completion<Scene> {
        let priority = priority.unwrap_or(self.default_priority);
        let host = &self.host;
        self.loads
            .get_or_start(address, |address| host.load_scene(address, priority, parameters))
    }

    pub fn unload_scene_async(&self, address: AssetAddress) -> Completion<()> {
        let host = &self.host;
        self.unloads
            .get_or_start(address, |address| host.unload_scene(address))
    }

    pub fn install(
        &self,
        subscriptions: &SubscriptionRegistry,
        scope: &SubscriptionScope,
    ) -> Result<(), TaskError> {
        let loads = Arc::clone(&self.loads);
        route(subscriptions, scope, move |event: &LoadSceneSuccess| {
            loads.resolve(&event.scene_asset_address, loaded_scene(event));
        })?;

        let loads = Arc::clone(&self.loads);
        route(subscriptions, scope, move |event: &LoadSceneFailure| {
            loads.resolve_failure(
                &event.scene_asset_address,
                operation_failed(LOAD_SCENE, &event.scene_asset_address, &event.error_message),
            );
        })?;

        let unloads = Arc::clone(&self.unloads);
        route(subscriptions, scope, move |event: &UnloadSceneSuccess| {
            unloads.resolve_success(&event.scene_asset_address, ());
        })?;

        let unloads = Arc::clone(&self.unloads);
        route(subscriptions, scope, move |event: &UnloadSceneFailure| {
            unloads.resolve_failure(
                &event.scene_asset_address,
                operation_failed(UNLOAD_SCENE, &event.scene_asset_address, &event.error_message),
            );
        })
    }
}

fn loaded_scene(event: &LoadSceneSuccess) -> TaskResult<Scene> {
    let address = &event.scene_asset_address;
    let Some(asset) = &event.scene_asset else {
        warn!(address = %address, "Scene load reported success without a scene asset");
        return Err(malformed_success(LOAD_SCENE, address, "scene asset is null"));
    };

    match asset.downcast_ref::<Scene>() {
        Some(scene) => Ok(scene.clone()),
        None => {
            warn!(address = %address, "Loaded scene asset is not a scene");
            Err(malformed_success(LOAD_SCENE, address, "scene asset is not a scene"))
        }
    }
}
