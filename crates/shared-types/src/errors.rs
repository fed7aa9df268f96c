//! # Error Types
//!
//! Errors reported by host services across the boundary.

use thiserror::Error;

/// A host service refused or failed an operation.
///
/// `Clone` so a single host failure can be fanned out to every waiter of
/// the operation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The start call was rejected before anything was scheduled.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The service is not ready to accept the request (e.g. not initialized).
    #[error("Service not ready: {0}")]
    NotReady(String),

    /// The scene asset failed to load.
    #[error("Scene load failed for '{address}': {message}")]
    SceneLoad { address: String, message: String },

    /// The scene loaded but its initializer failed.
    #[error("Scene initialize failed for '{address}': {message}")]
    SceneInitialize { address: String, message: String },

    /// Any other host-side failure.
    #[error("{0}")]
    Other(String),
}
