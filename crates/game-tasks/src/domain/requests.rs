//! Request parameters for operations with more than a key and a priority.

use shared_types::{AssetAddress, EntityId, Priority, UserData};
use std::any::{Any, TypeId};
use std::fmt;

/// Show an entity.
#[derive(Clone)]
pub struct ShowEntityRequest {
    pub entity_id: EntityId,
    /// Name of the logic type to attach.
    pub logic_type: String,
    pub asset_address: AssetAddress,
    pub group: String,
    /// `None` uses the configured entity priority.
    pub priority: Option<Priority>,
    pub user_data: Option<UserData>,
}

impl ShowEntityRequest {
    pub fn new(
        entity_id: EntityId,
        logic_type: impl Into<String>,
        asset_address: AssetAddress,
        group: impl Into<String>,
    ) -> Self {
        Self {
            entity_id,
            logic_type: logic_type.into(),
            asset_address,
            group: group.into(),
            priority: None,
            user_data: None,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

impl fmt::Debug for ShowEntityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShowEntityRequest")
            .field("entity_id", &self.entity_id)
            .field("logic_type", &self.logic_type)
            .field("asset_address", &self.asset_address)
            .field("group", &self.group)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Open a UI form.
#[derive(Clone)]
pub struct OpenUiFormRequest {
    pub asset_name: String,
    pub group: String,
    /// Empty for the host's current package.
    pub package_name: String,
    pub pause_covered_form: bool,
    pub priority: Option<Priority>,
    pub user_data: Option<UserData>,
}

impl OpenUiFormRequest {
    pub fn new(asset_name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            asset_name: asset_name.into(),
            group: group.into(),
            package_name: String::new(),
            pause_covered_form: false,
            priority: None,
            user_data: None,
        }
    }

    #[must_use]
    pub fn in_package(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = package_name.into();
        self
    }

    #[must_use]
    pub fn pause_covered_form(mut self, pause: bool) -> Self {
        self.pause_covered_form = pause;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

impl fmt::Debug for OpenUiFormRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenUiFormRequest")
            .field("asset_name", &self.asset_name)
            .field("group", &self.group)
            .field("package_name", &self.package_name)
            .field("pause_covered_form", &self.pause_covered_form)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Row type of a data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowType {
    pub id: TypeId,
    pub name: &'static str,
}

impl RowType {
    pub fn of<R: Any>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: std::any::type_name::<R>(),
        }
    }
}

/// Create a data table and read its rows from an asset.
#[derive(Debug, Clone)]
pub struct LoadDataTableRequest {
    pub row_type: RowType,
    pub asset_name: String,
    /// Optional table name, for several tables of one row type.
    pub table_name: Option<String>,
    /// Switch the resource package before reading.
    pub package_name: Option<String>,
    /// `None` uses the configured data table priority.
    pub priority: Option<Priority>,
}

impl LoadDataTableRequest {
    pub fn new<R: Any>(asset_name: impl Into<String>) -> Self {
        Self {
            row_type: RowType::of::<R>(),
            asset_name: asset_name.into(),
            table_name: None,
            package_name: None,
            priority: None,
        }
    }

    #[must_use]
    pub fn named(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    #[must_use]
    pub fn in_package(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}
