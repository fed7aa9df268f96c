//! # Task Bridge Service
//!
//! Wires the adapters to the host services and the framework event bus.
//!
//! ## Architecture
//!
//! The bridge:
//! 1. Creates one adapter per host service it was given
//! 2. Subscribes every adapter's routers to the bus, all owned by one scope
//! 3. Releases those subscriptions on [`TaskBridge::shutdown`] or drop
//!
//! Network support needs no host service (channels are passed per call) and
//! is always present.

use crate::adapters::{
    DataTableTasks, EntityTasks, GameSceneTasks, NetworkTasks, ResourceTasks, SceneTasks, UiFormTasks,
};
use crate::domain::BridgeConfig;
use crate::error::TaskError;
use crate::ports::{DataTableHost, EntityHost, GameSceneHost, ResourceLoader, SceneHost, UiHost};
use shared_bus::{EventBus, SubscriptionRegistry, SubscriptionScope};
use std::sync::Arc;
use tracing::info;

/// The single-flight bridge over a set of host services.
pub struct TaskBridge {
    config: BridgeConfig,
    subscriptions: SubscriptionRegistry,
    scope: SubscriptionScope,
    resources: Option<ResourceTasks>,
    entities: Option<EntityTasks>,
    scenes: Option<SceneTasks>,
    game_scenes: Option<GameSceneTasks>,
    ui_forms: Option<UiFormTasks>,
    data_tables: Option<DataTableTasks>,
    network: NetworkTasks,
}

impl TaskBridge {
    pub fn builder(bus: Arc<dyn EventBus>) -> TaskBridgeBuilder {
        TaskBridgeBuilder::new(bus)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The registry the routers are subscribed through. Callers may use it
    /// for their own subscriptions on the same bus.
    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    pub fn resources(&self) -> Option<&ResourceTasks> {
        self.resources.as_ref()
    }

    pub fn entities(&self) -> Option<&EntityTasks> {
        self.entities.as_ref()
    }

    pub fn scenes(&self) -> Option<&SceneTasks> {
        self.scenes.as_ref()
    }

    pub fn game_scenes(&self) -> Option<&GameSceneTasks> {
        self.game_scenes.as_ref()
    }

    pub fn ui_forms(&self) -> Option<&UiFormTasks> {
        self.ui_forms.as_ref()
    }

    pub fn data_tables(&self) -> Option<&DataTableTasks> {
        self.data_tables.as_ref()
    }

    pub fn network(&self) -> &NetworkTasks {
        &self.network
    }

    /// Unsubscribe every router. Pending operations stay pending; events
    /// fired afterwards no longer reach them.
    pub fn shutdown(&self) -> usize {
        let released = self.scope.release_all();
        info!(released, "Task bridge shut down");
        released
    }
}

/// Builder for [`TaskBridge`].
pub struct TaskBridgeBuilder {
    bus: Arc<dyn EventBus>,
    config: BridgeConfig,
    resource_loader: Option<Arc<dyn ResourceLoader>>,
    entity_host: Option<Arc<dyn EntityHost>>,
    scene_host: Option<Arc<dyn SceneHost>>,
    game_scene_host: Option<Arc<dyn GameSceneHost>>,
    ui_host: Option<Arc<dyn UiHost>>,
    data_table_host: Option<Arc<dyn DataTableHost>>,
}

impl TaskBridgeBuilder {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus,
            config: BridgeConfig::default(),
            resource_loader: None,
            entity_host: None,
            scene_host: None,
            game_scene_host: None,
            ui_host: None,
            data_table_host: None,
        }
    }

    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_resource_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.resource_loader = Some(loader);
        self
    }

    pub fn with_entity_host(mut self, host: Arc<dyn EntityHost>) -> Self {
        self.entity_host = Some(host);
        self
    }

    pub fn with_scene_host(mut self, host: Arc<dyn SceneHost>) -> Self {
        self.scene_host = Some(host);
        self
    }

    pub fn with_game_scene_host(mut self, host: Arc<dyn GameSceneHost>) -> Self {
        self.game_scene_host = Some(host);
        self
    }

    pub fn with_ui_host(mut self, host: Arc<dyn UiHost>) -> Self {
        self.ui_host = Some(host);
        self
    }

    pub fn with_data_table_host(mut self, host: Arc<dyn DataTableHost>) -> Self {
        self.data_table_host = Some(host);
        self
    }

    /// Validate the configuration, create the adapters and subscribe their
    /// routers.
    pub fn build(self) -> Result<TaskBridge, TaskError> {
        self.config.validate()?;

        let subscriptions = SubscriptionRegistry::new(self.bus);
        let scope = SubscriptionScope::new();
        let priorities = &self.config.priorities;

        let entities = self
            .entity_host
            .map(|host| EntityTasks::new(host, priorities));
        let scenes = self
            .scene_host
            .map(|host| SceneTasks::new(host, priorities));
        let ui_forms = self.ui_host.map(UiFormTasks::new);
        let data_tables = self
            .data_table_host
            .map(|host| DataTableTasks::new(host, priorities));
        let network = NetworkTasks::new();

        if let Some(tasks) = &entities {
            tasks.install(&subscriptions, &scope)?;
        }
        if let Some(tasks) = &scenes {
            tasks.install(&subscriptions, &scope)?;
        }
        if let Some(tasks) = &ui_forms {
            tasks.install(&subscriptions, &scope)?;
        }
        if let Some(tasks) = &data_tables {
            tasks.install(&subscriptions, &scope)?;
        }
        network.install(&subscriptions, &scope)?;

        info!(routers = scope.len(), "Task bridge ready");

        Ok(TaskBridge {
            resources: self.resource_loader.map(ResourceTasks::new),
            game_scenes: self.game_scene_host.map(GameSceneTasks::new),
            entities,
            scenes,
            ui_forms,
            data_tables,
            network,
            subscriptions,
            scope,
            config: self.config,
        })
    }
}
