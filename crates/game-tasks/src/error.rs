//! Error types for the game task bridge

use shared_bus::SubscriptionError;
use shared_types::{ChannelId, HostError, NetworkErrorCode};
use std::fmt;
use thiserror::Error;

/// Result of an awaited operation.
pub type TaskResult<T> = Result<T, TaskError>;

/// Why a whole channel's pending operations were failed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeCause {
    /// The channel reported a non-connection error.
    Error(NetworkErrorCode),
    /// The channel was closed.
    Closed,
}

impl fmt::Display for CascadeCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(code) => write!(f, "{code}"),
            Self::Closed => f.write_str("Closed"),
        }
    }
}

/// Failure outcome of an awaited operation.
///
/// `Clone` because one outcome is delivered to every waiter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The host reported failure for this operation.
    #[error("{operation} '{key}' failed: {message}")]
    OperationFailed {
        operation: &'static str,
        key: String,
        message: String,
    },

    /// The host reported success but the result did not pass local checks.
    #[error("{operation} '{key}' reported success with an invalid result: {reason}")]
    MalformedSuccess {
        operation: &'static str,
        key: String,
        reason: String,
    },

    /// A channel-level error that could not be attributed to one operation.
    #[error("Channel '{channel}' failed ({cause}): {message}")]
    CascadedFailure {
        channel: ChannelId,
        cause: CascadeCause,
        message: String,
    },

    /// The host rejected the start call.
    #[error("Failed to start {operation} '{key}': {source}")]
    StartFailed {
        operation: &'static str,
        key: String,
        source: HostError,
    },

    /// Host failure delivered through a callback.
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// The pending operation was dropped without being resolved.
    #[error("{operation} '{key}' was abandoned before completion")]
    Abandoned { operation: &'static str, key: String },

    /// The retry decision itself failed.
    #[error("Retry policy failed ({policy_error}) while handling: {original}")]
    RetryPolicyFailed {
        policy_error: Box<TaskError>,
        original: Box<TaskError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A bridge that spawns work was used outside a tokio runtime.
    #[error("No tokio runtime available")]
    RuntimeUnavailable,

    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),
}

impl TaskError {
    /// True for failures the host attributed to this specific operation,
    /// including successes rejected as malformed.
    pub fn is_operation_failure(&self) -> bool {
        matches!(
            self,
            Self::OperationFailed { .. } | Self::MalformedSuccess { .. }
        )
    }

    /// True for channel-wide failures.
    pub fn is_cascade(&self) -> bool {
        matches!(self, Self::CascadedFailure { .. })
    }
}
