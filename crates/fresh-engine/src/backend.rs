use async_trait::async_trait;
pub use fresh_common::error::BackendError;
use fresh_common::protocol::{ElementRef, Geolocation, Strategy, Viewport};
pub use fresh_common::protocol::NavigationResult;
use std::time::Duration;

/// The capability set every browser automation provider must offer.
///
/// One instance drives exactly one tab in one isolated browser context. Calls
/// are sequential; nothing here is shared across tests.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, open the tab).
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to an absolute URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    async fn current_url(&mut self) -> Result<String, BackendError>;

    async fn title(&mut self) -> Result<String, BackendError>;

    /// Number of live elements matching `strategy` right now.
    async fn count(&mut self, strategy: &Strategy) -> Result<usize, BackendError>;

    /// Instantaneous visibility of one element. Missing elements are not visible.
    async fn is_visible(&mut self, element: &ElementRef) -> Result<bool, BackendError>;

    async fn click(&mut self, element: &ElementRef) -> Result<(), BackendError>;

    /// Set the value of an input-like element, replacing whatever it held.
    async fn fill(&mut self, element: &ElementRef, value: &str) -> Result<(), BackendError>;

    async fn clear(&mut self, element: &ElementRef) -> Result<(), BackendError>;

    /// Check a checkbox or radio input.
    async fn check(&mut self, element: &ElementRef) -> Result<(), BackendError>;

    async fn read_text(&mut self, element: &ElementRef) -> Result<Option<String>, BackendError>;

    async fn read_attribute(
        &mut self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, BackendError>;

    async fn input_value(&mut self, element: &ElementRef) -> Result<String, BackendError>;

    async fn is_checked(&mut self, element: &ElementRef) -> Result<bool, BackendError>;

    async fn get_storage(&mut self, key: &str) -> Result<Option<String>, BackendError>;

    async fn set_storage(&mut self, key: &str, value: &str) -> Result<(), BackendError>;

    async fn clear_storage(&mut self) -> Result<(), BackendError>;

    /// Wait until no navigation or network activity is pending, bounded by `timeout`.
    async fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), BackendError>;

    /// Constraint-validation message of a form control, `None` when the control is valid.
    async fn validation_message(
        &mut self,
        _element: &ElementRef,
    ) -> Result<Option<String>, BackendError> {
        Err(BackendError::NotSupported("validation_message".into()))
    }

    /// Text of the first `strategy` match among the descendants of `scope`.
    ///
    /// `Ok(None)` when the scope holds no match; `ElementNotFound` when the
    /// scope itself is gone.
    async fn read_text_within(
        &mut self,
        _scope: &ElementRef,
        _strategy: &Strategy,
    ) -> Result<Option<String>, BackendError> {
        Err(BackendError::NotSupported("read_text_within".into()))
    }

    /// Press a key while `element` has focus.
    async fn press_key(&mut self, _element: &ElementRef, _key: &str) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("press_key".into()))
    }

    async fn set_viewport(&mut self, _viewport: Viewport) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("set_viewport".into()))
    }

    async fn set_geolocation(&mut self, _location: Geolocation) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("set_geolocation".into()))
    }

    async fn grant_permission(&mut self, _permission: &str) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("grant_permission".into()))
    }

    /// Refresh the current page.
    async fn reload(&mut self) -> Result<NavigationResult, BackendError> {
        Err(BackendError::NotSupported("reload".into()))
    }

    /// Navigate back in browser history.
    async fn go_back(&mut self) -> Result<NavigationResult, BackendError> {
        Err(BackendError::NotSupported("go_back".into()))
    }

    /// Capture a full-page screenshot as PNG bytes.
    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::NotSupported("screenshot".into()))
    }

    /// Execute a script in the page context.
    async fn execute_script(&mut self, _script: &str) -> Result<serde_json::Value, BackendError> {
        Err(BackendError::NotSupported("execute_script".into()))
    }
}
