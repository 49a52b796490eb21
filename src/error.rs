//! Error types for the component runtime.

use crate::types::InstanceId;
use thiserror::Error;

/// Main error type for runtime operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The instance (or one of its state cells) was unmounted or dropped.
    #[error("Stale reference: instance {id} is no longer mounted")]
    StaleReference { id: InstanceId },

    /// A render requested a different number, order or type of state cells
    /// than the previous render of the same instance.
    #[error("Order violation in instance {id}: {detail}")]
    OrderViolation { id: InstanceId, detail: String },
}

impl HookError {
    pub fn is_stale(&self) -> bool {
        matches!(self, HookError::StaleReference { .. })
    }

    pub fn is_order_violation(&self) -> bool {
        matches!(self, HookError::OrderViolation { .. })
    }
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, HookError>;
