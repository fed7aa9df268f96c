//! Data table loading, keyed by the data table asset name.

use crate::adapters::{operation_failed, route};
use crate::domain::{Completion, CompletionRegistry, LoadDataTableRequest, PriorityConfig};
use crate::error::TaskError;
use crate::ports::DataTableHost;
use shared_bus::events::{LoadDataTableFailure, LoadDataTableSuccess};
use shared_bus::{SubscriptionRegistry, SubscriptionScope};
use shared_types::Priority;
use std::sync::Arc;
use tracing::debug;

const LOAD_DATA_TABLE: &str = "load data table";

pub struct DataTableTasks {
    host: Arc<dyn DataTableHost>,
    loads: Arc<CompletionRegistry<String, ()>>,
    default_priority: Priority,
}

impl DataTableTasks {
    pub fn new(host: Arc<dyn DataTableHost>, priorities: &PriorityConfig) -> Self {
        Self {
            host,
            loads: Arc::new(CompletionRegistry::new(LOAD_DATA_TABLE)),
            default_priority: priorities.data_table,
        }
    }

    pub fn registry(&self) -> &CompletionRegistry<String, ()> {
        &self.loads
    }

    /// Create the table and read its rows, or attach to the read in flight
    /// for the same asset.
    ///
    /// Only the asset name identifies the load; a second request naming the
    /// same asset with another row type or table name attaches to the first.
    pub fn load_data_table_async(&self, request: LoadDataTableRequest) -> Completion<()> {
        let priority = request.priority.unwrap_or(self.default_priority);
        let host = &self.host;

        self.loads
            .get_or_start(request.asset_name.clone(), |asset_name| {
                let table = host.create_data_table(&request.row_type, request.table_name.as_deref())?;
                if let Some(package_name) = &request.package_name {
                    debug!(package = %package_name, asset = %asset_name, "Switching resource package");
                    host.set_current_package(package_name)?;
                }
                table.read_data(asset_name, priority)
            })
    }

    pub fn install(
        &self,
        subscriptions: &SubscriptionRegistry,
        scope: &SubscriptionScope,
    ) -> Result<(), TaskError> {
        let loads = Arc::clone(&self.loads);
        route(subscriptions, scope, move |event: &LoadDataTableSuccess| {
            loads.resolve_success(&event.data_table_asset_name, ());
        })?;

        let loads = Arc::clone(&self.loads);
        route(subscriptions, scope, move |event: &LoadDataTableFailure| {
            loads.resolve_failure(
                &event.data_table_asset_name,
                operation_failed(LOAD_DATA_TABLE, &event.data_table_asset_name, &event.error_message),
            );
        })
    }
}
