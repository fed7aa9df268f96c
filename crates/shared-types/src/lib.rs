//! # Shared Types Crate
//!
//! Domain vocabulary shared by `shared-bus` and `game-tasks`.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses the host boundary
//!   (asset addresses, serial ids, channel identities, framework objects) is
//!   defined here.
//! - **Opaque framework objects**: assets, scene handles and network messages
//!   are owned by the host and travel as [`AssetObject`] / [`MessageObject`]
//!   (`Arc<dyn Any + Send + Sync>`); the bridge never looks inside them except
//!   to downcast to the type a caller asked for.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
