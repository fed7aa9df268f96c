//! Domain layer: completion primitives, the single-flight registry and
//! configuration. Depends on the host vocabulary in `shared_types` only, never
//! on the bus.

pub mod completion;
pub mod config;
pub mod registry;
pub mod requests;

pub use completion::{Completion, PendingCompletion, TaskValue};
pub use config::{BridgeConfig, PriorityConfig, RetryConfig};
pub use registry::{CompletionRegistry, OperationKey, RegistryStats};
pub use requests::{LoadDataTableRequest, OpenUiFormRequest, RowType, ShowEntityRequest};
