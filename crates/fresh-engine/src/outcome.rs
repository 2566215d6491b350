use crate::backend::BackendError;
use std::time::Duration;

/// Failure taxonomy for element interactions.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ActionError {
    #[error("Element '{element}' not found (tried {})", .attempted.join(", "))]
    NotFound {
        element: String,
        attempted: Vec<String>,
    },

    #[error("Timed out after {after:?} waiting for {operation} on '{element}'")]
    TimedOut {
        operation: String,
        element: String,
        after: Duration,
    },

    #[error("{operation} on '{element}' failed after {attempts} attempt(s): {last_error}")]
    Exhausted {
        operation: String,
        element: String,
        attempts: u32,
        last_error: BackendError,
    },

    #[error("Rejected value '{value}' for '{element}': expected one of [{}]", .allowed.join(", "))]
    ValidationRejected {
        element: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{operation} on '{element}' failed: {source}")]
    Backend {
        operation: String,
        element: String,
        #[source]
        source: BackendError,
    },
}

impl ActionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::NotFound { .. } => "not_found",
            ActionError::TimedOut { .. } => "timed_out",
            ActionError::Exhausted { .. } => "exhausted",
            ActionError::ValidationRejected { .. } => "validation_rejected",
            ActionError::Backend { .. } => "backend",
        }
    }

    pub(crate) fn backend(
        operation: impl Into<String>,
        element: impl Into<String>,
        source: BackendError,
    ) -> Self {
        ActionError::Backend {
            operation: operation.into(),
            element: element.into(),
            source,
        }
    }
}

/// Result of one resilient action. Consumed by the caller right away.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Success { attempts: u32 },
    TimedOut { after: Duration },
    Exhausted { attempts: u32, last_error: BackendError },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success { .. })
    }

    /// Convert into a `Result`, naming the operation and element for the error message.
    pub fn into_result(self, operation: &str, element: &str) -> Result<u32, ActionError> {
        match self {
            ActionOutcome::Success { attempts } => Ok(attempts),
            ActionOutcome::TimedOut { after } => Err(ActionError::TimedOut {
                operation: operation.to_string(),
                element: element.to_string(),
                after,
            }),
            ActionOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(ActionError::Exhausted {
                operation: operation.to_string(),
                element: element.to_string(),
                attempts,
                last_error,
            }),
        }
    }
}
