//! Per-test page session.
//!
//! A `PageSession` owns the one browser tab a test drives, plus the probe and
//! executor configured for it. Page objects borrow it to expose screen-level
//! workflows. Sessions are built fresh for every test and torn down by the
//! caller; nothing here outlives a test.

use crate::backend::{Backend, BackendError, NavigationResult};
use crate::config::FreshConfig;
use crate::executor::{ChoiceGroup, ResilientExecutor, RetryPolicy};
use crate::outcome::ActionError;
use crate::probe::Probe;
use crate::resolution::LocatorHandle;
use fresh_common::protocol::{ElementDescriptor, Geolocation, StoredUser, Viewport};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const CURRENT_USER_KEY: &str = "currentUser";
pub const IS_LOGGED_IN_KEY: &str = "isLoggedIn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// Transient state of one test's session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub viewport: Viewport,
    pub base_url: Url,
    /// Values this session wrote into client-side storage.
    pub markers: BTreeMap<String, String>,
    auth: AuthState,
}

impl SessionState {
    pub fn auth(&self) -> AuthState {
        self.auth
    }
}

pub struct PageSession<B: Backend> {
    backend: B,
    config: FreshConfig,
    state: SessionState,
    probe: Probe,
    executor: ResilientExecutor,
}

impl<B: Backend> PageSession<B> {
    /// Wrap a launched backend. Fails only when the configured base URL is not a URL.
    pub fn new(backend: B, config: FreshConfig) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&config.base_url)?;
        let t = &config.timeouts;
        let probe = Probe::new(t.probe(), t.poll_interval());
        let executor = ResilientExecutor::new(
            probe,
            t.action(),
            RetryPolicy {
                max_attempts: t.click_attempts,
                backoff: t.click_backoff(),
            },
        );
        let state = SessionState {
            viewport: config.viewport,
            base_url,
            markers: BTreeMap::new(),
            auth: AuthState::Unauthenticated,
        };
        Ok(Self {
            backend,
            config,
            state,
            probe,
            executor,
        })
    }

    pub fn config(&self) -> &FreshConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn auth_state(&self) -> AuthState {
        self.state.auth
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    pub fn executor(&self) -> &ResilientExecutor {
        &self.executor
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ============================================================
    // Navigation
    // ============================================================

    /// Append `path` to the base URL, keeping any path prefix the base carries.
    /// Absolute http(s) URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.state.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn goto(&mut self, path: &str) -> Result<NavigationResult, ActionError> {
        let url = self.url_for(path);
        info!(%url, "navigating");
        match tokio::time::timeout(self.config.timeouts.navigation(), self.backend.navigate(&url))
            .await
        {
            Ok(result) => result.map_err(|e| ActionError::backend("goto", url, e)),
            Err(_) => Err(ActionError::TimedOut {
                operation: "goto".into(),
                element: url,
                after: self.config.timeouts.navigation(),
            }),
        }
    }

    /// Wait for network and navigation quiescence after an action.
    pub async fn settle(&mut self) -> Result<(), ActionError> {
        let budget = self.config.timeouts.navigation();
        self.backend
            .wait_for_network_idle(budget)
            .await
            .map_err(|e| match e {
                BackendError::Timeout | BackendError::TimeoutWithContext { .. } => {
                    ActionError::TimedOut {
                        operation: "settle".into(),
                        element: "page".into(),
                        after: budget,
                    }
                }
                other => ActionError::backend("settle", "page", other),
            })
    }

    /// Refresh the current page and wait for it to settle.
    pub async fn reload(&mut self) -> Result<NavigationResult, ActionError> {
        let result = self
            .backend
            .reload()
            .await
            .map_err(|e| ActionError::backend("reload", "page", e))?;
        self.settle().await?;
        Ok(result)
    }

    /// Go back one history entry and wait for the page to settle.
    pub async fn go_back(&mut self) -> Result<NavigationResult, ActionError> {
        let result = self
            .backend
            .go_back()
            .await
            .map_err(|e| ActionError::backend("go_back", "page", e))?;
        self.settle().await?;
        Ok(result)
    }

    /// Fixed pause for UI transitions the page gives no signal for.
    pub async fn pause(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    // ============================================================
    // Read-only queries (never fail)
    // ============================================================

    pub async fn current_url(&mut self) -> String {
        self.backend.current_url().await.unwrap_or_else(|e| {
            warn!(error = %e, "could not read current url");
            String::new()
        })
    }

    pub async fn title(&mut self) -> String {
        self.backend.title().await.unwrap_or_default()
    }

    /// Short-budget visibility probe.
    pub async fn is_visible(&mut self, descriptor: &ElementDescriptor) -> bool {
        self.probe
            .is_visible_default(&mut self.backend, LocatorHandle::new(descriptor))
            .await
    }

    pub async fn is_visible_within(&mut self, descriptor: &ElementDescriptor, budget: Duration) -> bool {
        self.probe
            .is_visible(&mut self.backend, LocatorHandle::new(descriptor), budget)
            .await
    }

    /// Text content of the first match, empty when absent.
    pub async fn text(&mut self, descriptor: &ElementDescriptor) -> String {
        self.text_of(LocatorHandle::new(descriptor)).await
    }

    pub async fn text_of(&mut self, handle: LocatorHandle<'_>) -> String {
        let Some(element) = handle.element(&mut self.backend).await else {
            return String::new();
        };
        match self.backend.read_text(&element).await {
            Ok(text) => text.unwrap_or_default(),
            Err(e) => {
                debug!(element = %handle.name(), error = %e, "read_text failed");
                String::new()
            }
        }
    }

    /// Text of `field` looked up inside the element `scope` points at.
    ///
    /// Strategies of `field` are tried in order within the scope only; empty
    /// when the scope is gone or holds no match.
    pub async fn text_within(&mut self, scope: LocatorHandle<'_>, field: &ElementDescriptor) -> String {
        let Some(container) = scope.element(&mut self.backend).await else {
            return String::new();
        };
        for strategy in field.strategies() {
            match self.backend.read_text_within(&container, strategy).await {
                Ok(Some(text)) => return text,
                Ok(None) => {}
                Err(e) => {
                    debug!(scope = %scope.name(), element = field.name(), %strategy, error = %e, "scoped read failed");
                    return String::new();
                }
            }
        }
        String::new()
    }

    /// Number of matches of the winning strategy, zero when absent.
    pub async fn count(&mut self, descriptor: &ElementDescriptor) -> usize {
        LocatorHandle::new(descriptor).count(&mut self.backend).await
    }

    pub async fn attribute(&mut self, descriptor: &ElementDescriptor, name: &str) -> Option<String> {
        let element = LocatorHandle::new(descriptor)
            .element(&mut self.backend)
            .await?;
        self.backend
            .read_attribute(&element, name)
            .await
            .ok()
            .flatten()
    }

    pub async fn input_value(&mut self, descriptor: &ElementDescriptor) -> String {
        let Some(element) = LocatorHandle::new(descriptor)
            .element(&mut self.backend)
            .await
        else {
            return String::new();
        };
        self.backend.input_value(&element).await.unwrap_or_default()
    }

    pub async fn is_checked(&mut self, descriptor: &ElementDescriptor) -> bool {
        let Some(element) = LocatorHandle::new(descriptor)
            .element(&mut self.backend)
            .await
        else {
            return false;
        };
        self.backend.is_checked(&element).await.unwrap_or(false)
    }

    /// Value of the checked member of a radio group, if any.
    pub async fn checked_value(&mut self, group: &ChoiceGroup) -> Option<String> {
        for value in group.allowed() {
            let Some(descriptor) = group.get(&value) else {
                continue;
            };
            if self.is_checked(descriptor).await {
                return Some(value);
            }
        }
        None
    }

    pub async fn validation_message(&mut self, descriptor: &ElementDescriptor) -> Option<String> {
        let element = LocatorHandle::new(descriptor)
            .element(&mut self.backend)
            .await?;
        match self.backend.validation_message(&element).await {
            Ok(message) => message.filter(|m| !m.is_empty()),
            Err(e) => {
                debug!(element = descriptor.name(), error = %e, "validation_message failed");
                None
            }
        }
    }

    // ============================================================
    // Actions
    // ============================================================

    pub async fn wait_until_visible(
        &mut self,
        descriptor: &ElementDescriptor,
        budget: Duration,
    ) -> Result<(), ActionError> {
        self.probe
            .wait_until_visible(&mut self.backend, LocatorHandle::new(descriptor), budget)
            .await
            .map(|_| ())
    }

    pub async fn wait_until_hidden(
        &mut self,
        descriptor: &ElementDescriptor,
        budget: Duration,
    ) -> Result<(), ActionError> {
        self.probe
            .wait_until_hidden(&mut self.backend, LocatorHandle::new(descriptor), budget)
            .await
    }

    pub async fn click(&mut self, descriptor: &ElementDescriptor) -> Result<(), ActionError> {
        self.executor
            .click_default(&mut self.backend, LocatorHandle::new(descriptor))
            .await
    }

    pub async fn fill(&mut self, descriptor: &ElementDescriptor, value: &str) -> Result<(), ActionError> {
        self.executor
            .fill(&mut self.backend, LocatorHandle::new(descriptor), value)
            .await
    }

    pub async fn press(&mut self, descriptor: &ElementDescriptor, key: &str) -> Result<(), ActionError> {
        self.executor
            .press(&mut self.backend, LocatorHandle::new(descriptor), key)
            .await
    }

    pub async fn select_single(&mut self, group: &ChoiceGroup, value: &str) -> Result<(), ActionError> {
        self.executor
            .select_single(&mut self.backend, group, value)
            .await
    }

    pub async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, ActionError> {
        self.backend
            .execute_script(script)
            .await
            .map_err(|e| ActionError::backend("execute_script", "page", e))
    }

    // ============================================================
    // Client-side storage
    // ============================================================

    pub async fn storage_item(&mut self, key: &str) -> Option<String> {
        self.backend.get_storage(key).await.ok().flatten()
    }

    pub async fn set_storage_item(&mut self, key: &str, value: &str) -> Result<(), ActionError> {
        self.backend
            .set_storage(key, value)
            .await
            .map_err(|e| ActionError::backend("set_storage", key, e))?;
        self.state.markers.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub async fn clear_storage(&mut self) -> Result<(), ActionError> {
        self.backend
            .clear_storage()
            .await
            .map_err(|e| ActionError::backend("clear_storage", "localStorage", e))?;
        self.state.markers.clear();
        self.state.auth = AuthState::Unauthenticated;
        Ok(())
    }

    /// Whether persisted storage carries the logged-in marker.
    pub async fn has_auth_marker(&mut self) -> bool {
        self.storage_item(IS_LOGGED_IN_KEY).await.as_deref() == Some("true")
    }

    // ============================================================
    // Authentication state
    // ============================================================

    /// TEST-ONLY BACKDOOR: authenticate by writing the application's session
    /// keys straight into persisted storage, skipping the login form.
    ///
    /// Use only in tests that are not about login itself.
    pub async fn bootstrap_auth_backdoor(&mut self, user: &StoredUser) -> Result<(), ActionError> {
        self.goto("/").await?;
        let encoded = serde_json::to_string(user)
            .map_err(|e| ActionError::backend("bootstrap_auth_backdoor", CURRENT_USER_KEY, e.into()))?;
        self.set_storage_item(CURRENT_USER_KEY, &encoded).await?;
        self.set_storage_item(IS_LOGGED_IN_KEY, "true").await?;
        self.state.auth = AuthState::Authenticated;
        info!(user = %user.email, "session bootstrapped through storage backdoor");
        Ok(())
    }

    /// Record a completed login workflow.
    pub fn mark_authenticated(&mut self) {
        self.state.auth = AuthState::Authenticated;
    }

    /// Record a completed logout workflow.
    pub fn mark_logged_out(&mut self) {
        self.state.auth = AuthState::Unauthenticated;
    }

    // ============================================================
    // Browser context
    // ============================================================

    pub async fn set_viewport(&mut self, viewport: Viewport) -> Result<(), ActionError> {
        self.backend
            .set_viewport(viewport)
            .await
            .map_err(|e| ActionError::backend("set_viewport", "page", e))?;
        self.state.viewport = viewport;
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    pub async fn set_geolocation(&mut self, location: Geolocation) -> Result<(), ActionError> {
        self.backend
            .set_geolocation(location)
            .await
            .map_err(|e| ActionError::backend("set_geolocation", "context", e))
    }

    pub async fn grant_permission(&mut self, permission: &str) -> Result<(), ActionError> {
        self.backend
            .grant_permission(permission)
            .await
            .map_err(|e| ActionError::backend("grant_permission", permission, e))
    }

    /// Save a full-page screenshot as `<screenshot_dir>/<name>.png`.
    pub async fn screenshot(&mut self, name: &str) -> Result<PathBuf, ActionError> {
        let bytes = self
            .backend
            .screenshot()
            .await
            .map_err(|e| ActionError::backend("screenshot", name, e))?;
        let dir = self.config.screenshot_dir.clone();
        let path = dir.join(format!("{}.png", name));
        let write = async {
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(&path, &bytes).await
        };
        write
            .await
            .map_err(|e| ActionError::backend("screenshot", name, e.into()))?;
        Ok(path)
    }

    /// Clear persisted storage and close the tab. Called by the scenario driver
    /// once a test is over, whatever its result.
    pub async fn teardown(mut self) -> Result<(), BackendError> {
        if let Err(e) = self.backend.clear_storage().await {
            warn!(error = %e, "storage clear during teardown failed");
        }
        self.backend.close().await
    }
}
