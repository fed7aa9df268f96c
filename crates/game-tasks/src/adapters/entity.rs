//! Entity showing, keyed by the caller-chosen entity id.

use crate::adapters::{operation_failed, route};
use crate::domain::{Completion, CompletionRegistry, PriorityConfig, ShowEntityRequest};
use crate::error::TaskError;
use crate::ports::EntityHost;
use shared_bus::events::{ShowEntityFailure, ShowEntitySuccess};
use shared_bus::{SubscriptionRegistry, SubscriptionScope};
use shared_types::{Entity, EntityId, Priority};
use std::sync::Arc;

const SHOW_ENTITY: &str = "show entity";

pub struct EntityTasks {
    host: Arc<dyn EntityHost>,
    shows: Arc<CompletionRegistry<EntityId, Entity>>,
    default_priority: Priority,
}

impl EntityTasks {
    pub fn new(host: Arc<dyn EntityHost>, priorities: &PriorityConfig) -> Self {
        Self {
            host,
            shows: Arc::new(CompletionRegistry::new(SHOW_ENTITY)),
            default_priority: priorities.entity_asset,
        }
    }

    pub fn registry(&self) -> &CompletionRegistry<EntityId, Entity> {
        &self.shows
    }

    /// Show an entity, or attach to the show in flight for its id.
    pub fn show_entity_async(&self, request: ShowEntityRequest) -> Completion<Entity> {
        let priority = request.priority.unwrap_or(self.default_priority);
        let host = &self.host;
        self.shows
            .get_or_start(request.entity_id, |_| host.show_entity(&request, priority))
    }

    pub fn install(
        &self,
        subscriptions: &SubscriptionRegistry,
        scope: &SubscriptionScope,
    ) -> Result<(), TaskError> {
        let shows = Arc::clone(&self.shows);
        route(subscriptions, scope, move |event: &ShowEntitySuccess| {
            shows.resolve_success(&event.entity.id, event.entity.clone());
        })?;

        let shows = Arc::clone(&self.shows);
        route(subscriptions, scope, move |event: &ShowEntityFailure| {
            shows.resolve_failure(
                &event.entity_id,
                operation_failed(SHOW_ENTITY, event.entity_id, &event.error_message),
            );
        })
    }
}
