/// Errors reported by a browser automation provider.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("Element {element} not found")]
    ElementNotFound { element: String },

    #[error("Element {element} is detached from the DOM")]
    ElementDetached { element: String },

    #[error("Element {element} is not visible")]
    ElementNotVisible { element: String },

    #[error("Element {element} is disabled")]
    ElementDisabled { element: String },

    #[error("Element {element} is not interactable: {reason}")]
    ElementNotInteractable { element: String, reason: String },

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Timeout: {operation}")]
    TimeoutWithContext { operation: String },

    #[error("Timeout")]
    Timeout,

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Connection lost")]
    ConnectionLost,

    #[error("Not ready")]
    NotReady,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

impl BackendError {
    /// Stable error code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Navigation(_) => "NAVIGATION_ERROR",
            BackendError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            BackendError::ElementDetached { .. } => "ELEMENT_DETACHED",
            BackendError::ElementNotVisible { .. } => "ELEMENT_NOT_VISIBLE",
            BackendError::ElementDisabled { .. } => "ELEMENT_DISABLED",
            BackendError::ElementNotInteractable { .. } => "ELEMENT_NOT_INTERACTABLE",
            BackendError::SelectorInvalid { .. } => "SELECTOR_INVALID",
            BackendError::ScriptError(_) => "SCRIPT_ERROR",
            BackendError::TimeoutWithContext { .. } | BackendError::Timeout => "TIMEOUT",
            BackendError::ConnectionLost => "CONNECTION_LOST",
            BackendError::NotReady => "NOT_READY",
            BackendError::Io(_) => "IO_ERROR",
            BackendError::Serialization(_) => "SERIALIZATION_ERROR",
            BackendError::Other(_) => "INTERNAL_ERROR",
            BackendError::NotSupported(_) => "NOT_SUPPORTED",
        }
    }

    /// Whether the failure is the kind a short wait can clear up
    /// (element mid-render, detached by a re-render, navigation in flight).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::ElementNotFound { .. }
                | BackendError::ElementDetached { .. }
                | BackendError::ElementNotVisible { .. }
                | BackendError::ElementDisabled { .. }
                | BackendError::ElementNotInteractable { .. }
                | BackendError::Navigation(_)
                | BackendError::Timeout
                | BackendError::TimeoutWithContext { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactability_errors_are_transient() {
        let err = BackendError::ElementNotInteractable {
            element: "#loginBtn".into(),
            reason: "covered by overlay".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.code(), "ELEMENT_NOT_INTERACTABLE");
    }

    #[test]
    fn structural_errors_are_not_transient() {
        assert!(!BackendError::NotSupported("pdf".into()).is_transient());
        assert!(
            !BackendError::SelectorInvalid {
                selector: "a[".into()
            }
            .is_transient()
        );
    }
}
