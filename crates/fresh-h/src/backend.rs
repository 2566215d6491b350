use crate::cdp::{CdpClient, LaunchOptions};
use crate::eval::evaluate;
use crate::scripts;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetGeolocationOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use fresh_common::protocol::{ElementRef, Geolocation, Strategy, Viewport};
use fresh_engine::backend::{Backend, BackendError, NavigationResult};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

/// Quiet period with no new resource loads that counts as network idle.
const IDLE_WINDOW: Duration = Duration::from_millis(500);
const IDLE_POLL: Duration = Duration::from_millis(100);

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    visible: bool,
    viewport: Viewport,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::new_with_visibility(false)
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            client: None,
            visible,
            viewport: Viewport::default(),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    fn page(&self) -> Result<&Page, BackendError> {
        self.client
            .as_ref()
            .map(|c| &c.page)
            .ok_or(BackendError::NotReady)
    }

    async fn eval(&self, expression: &str) -> Result<Value, BackendError> {
        evaluate(self.page()?, expression).await
    }

    /// Run `body` against the element; `ElementNotFound` when it is gone.
    async fn on_element(&self, element: &ElementRef, body: &str) -> Result<Value, BackendError> {
        let script = scripts::on_element(element, body)?;
        let result = self.eval(&script).await?;
        if result.get("found").and_then(Value::as_bool) == Some(true) {
            Ok(result.get("value").cloned().unwrap_or(Value::Null))
        } else {
            Err(BackendError::ElementNotFound {
                element: element.to_string(),
            })
        }
    }

    async fn get_navigation_result(page: &Page) -> Result<NavigationResult, BackendError> {
        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult {
            url,
            title,
            status: 200,
        })
    }

    async fn dispatch_key(&self, key: &str, kind: DispatchKeyEventType) -> Result<(), BackendError> {
        let mut builder = DispatchKeyEventParams::builder().r#type(kind.clone()).key(key).code(key);
        if key == "Enter" {
            builder = builder.windows_virtual_key_code(13);
            if kind == DispatchKeyEventType::KeyDown {
                builder = builder.text("\r");
            }
        }
        let event = builder
            .build()
            .map_err(|e| BackendError::Other(format!("Failed to build key event: {:?}", e)))?;
        self.page()?
            .execute(event)
            .await
            .map_err(|e| BackendError::Other(format!("press_key failed: {}", e)))?;
        Ok(())
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn as_status(value: Value, element: &ElementRef) -> Result<(), BackendError> {
    match value.as_str() {
        Some("ok") => Ok(()),
        Some("disabled") => Err(BackendError::ElementDisabled {
            element: element.to_string(),
        }),
        Some("covered") => Err(BackendError::ElementNotInteractable {
            element: element.to_string(),
            reason: "covered by another element".into(),
        }),
        other => Err(BackendError::ScriptError(format!(
            "unexpected action result: {:?}",
            other
        ))),
    }
}

fn permission_type(name: &str) -> Option<PermissionType> {
    match name {
        "geolocation" => Some(PermissionType::Geolocation),
        "notifications" => Some(PermissionType::Notifications),
        "clipboard-read" | "clipboard-write" => Some(PermissionType::ClipboardReadWrite),
        _ => None,
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching headless backend (Chromium)...");
        let options = LaunchOptions::from_env(self.visible, self.viewport);
        let client = CdpClient::launch(&options)
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        let viewport = self.viewport;
        self.set_viewport(viewport).await
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let page = self.page()?;
        info!("Navigating to: {}", url);
        page.goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
        Self::get_navigation_result(page).await
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        Ok(self
            .page()?
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default())
    }

    async fn title(&mut self) -> Result<String, BackendError> {
        Ok(self
            .page()?
            .get_title()
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?
            .unwrap_or_default())
    }

    async fn count(&mut self, strategy: &Strategy) -> Result<usize, BackendError> {
        let value = match self.eval(&scripts::count(strategy)?).await {
            Ok(value) => value,
            Err(BackendError::ScriptError(msg)) if msg.contains("not a valid selector") => {
                return Err(BackendError::SelectorInvalid {
                    selector: strategy.to_string(),
                });
            }
            Err(e) => return Err(e),
        };
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn is_visible(&mut self, element: &ElementRef) -> Result<bool, BackendError> {
        match self.on_element(element, scripts::IS_VISIBLE).await {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(BackendError::ElementNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn click(&mut self, element: &ElementRef) -> Result<(), BackendError> {
        debug!(%element, "click");
        let status = self.on_element(element, scripts::CLICK).await?;
        as_status(status, element)
    }

    async fn fill(&mut self, element: &ElementRef, value: &str) -> Result<(), BackendError> {
        self.on_element(element, &scripts::fill(value)?).await?;
        Ok(())
    }

    async fn clear(&mut self, element: &ElementRef) -> Result<(), BackendError> {
        self.on_element(element, &scripts::fill("")?).await?;
        Ok(())
    }

    async fn check(&mut self, element: &ElementRef) -> Result<(), BackendError> {
        let status = self.on_element(element, scripts::CHECK).await?;
        as_status(status, element)
    }

    async fn read_text(&mut self, element: &ElementRef) -> Result<Option<String>, BackendError> {
        let value = self.on_element(element, scripts::READ_TEXT).await?;
        Ok(value.as_str().map(String::from))
    }

    async fn read_attribute(
        &mut self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        let value = self
            .on_element(element, &scripts::read_attribute(name)?)
            .await?;
        Ok(value.as_str().map(String::from))
    }

    async fn input_value(&mut self, element: &ElementRef) -> Result<String, BackendError> {
        let value = self.on_element(element, scripts::INPUT_VALUE).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn is_checked(&mut self, element: &ElementRef) -> Result<bool, BackendError> {
        let value = self.on_element(element, scripts::IS_CHECKED).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn get_storage(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        let value = self.eval(&scripts::get_storage(key)?).await?;
        Ok(value.as_str().map(String::from))
    }

    async fn set_storage(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.eval(&scripts::set_storage(key, value)?).await?;
        Ok(())
    }

    async fn clear_storage(&mut self) -> Result<(), BackendError> {
        self.eval(scripts::CLEAR_STORAGE).await?;
        Ok(())
    }

    /// Document complete and no new resource entries for `IDLE_WINDOW`.
    async fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), BackendError> {
        let deadline = Instant::now() + timeout;
        let mut last_count = None;
        let mut quiet_since = Instant::now();

        while Instant::now() < deadline {
            let ready = self.eval(scripts::READY_STATE).await?;
            if ready.as_str() == Some("complete") {
                let count = self.eval(scripts::RESOURCE_COUNT).await?.as_u64();
                if count != last_count {
                    last_count = count;
                    quiet_since = Instant::now();
                } else if quiet_since.elapsed() >= IDLE_WINDOW {
                    return Ok(());
                }
            }
            sleep(IDLE_POLL).await;
        }
        Err(BackendError::TimeoutWithContext {
            operation: "network idle".into(),
        })
    }

    async fn validation_message(
        &mut self,
        element: &ElementRef,
    ) -> Result<Option<String>, BackendError> {
        let value = self.on_element(element, scripts::VALIDATION_MESSAGE).await?;
        Ok(value.as_str().map(String::from))
    }

    async fn read_text_within(
        &mut self,
        scope: &ElementRef,
        strategy: &Strategy,
    ) -> Result<Option<String>, BackendError> {
        let value = self
            .on_element(scope, &scripts::text_within(strategy)?)
            .await?;
        Ok(value.as_str().map(String::from))
    }

    async fn press_key(&mut self, element: &ElementRef, key: &str) -> Result<(), BackendError> {
        self.on_element(element, scripts::FOCUS).await?;
        self.dispatch_key(key, DispatchKeyEventType::KeyDown).await?;
        self.dispatch_key(key, DispatchKeyEventType::KeyUp).await
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> Result<(), BackendError> {
        let params = SetDeviceMetricsOverrideParams::new(
            viewport.width as i64,
            viewport.height as i64,
            1.0,
            false,
        );
        self.page()?
            .execute(params)
            .await
            .map_err(|e| BackendError::Other(format!("set_viewport failed: {}", e)))?;
        self.viewport = viewport;
        Ok(())
    }

    async fn set_geolocation(&mut self, location: Geolocation) -> Result<(), BackendError> {
        let params = SetGeolocationOverrideParams::builder()
            .latitude(location.latitude)
            .longitude(location.longitude)
            .accuracy(1.0)
            .build();
        self.page()?
            .execute(params)
            .await
            .map_err(|e| BackendError::Other(format!("set_geolocation failed: {}", e)))?;
        Ok(())
    }

    async fn grant_permission(&mut self, permission: &str) -> Result<(), BackendError> {
        let kind = permission_type(permission)
            .ok_or_else(|| BackendError::NotSupported(format!("permission {}", permission)))?;
        let client = self.client.as_ref().ok_or(BackendError::NotReady)?;
        let mut params = GrantPermissionsParams::builder().permissions(vec![kind]);
        if let Some(id) = &client.context_id {
            params = params.browser_context_id(id.clone());
        }
        let params = params
            .build()
            .map_err(|e| BackendError::Other(format!("Failed to build permission params: {}", e)))?;
        client
            .browser
            .execute(params)
            .await
            .map_err(|e| BackendError::Other(format!("grant_permission failed: {}", e)))?;
        Ok(())
    }

    async fn reload(&mut self) -> Result<NavigationResult, BackendError> {
        let page = self.page()?;
        page.reload()
            .await
            .map_err(|e| BackendError::Navigation(format!("reload failed: {}", e)))?;
        Self::get_navigation_result(page).await
    }

    async fn go_back(&mut self) -> Result<NavigationResult, BackendError> {
        let page = self.page()?;
        page.evaluate("history.back();")
            .await
            .map_err(|e| BackendError::Navigation(format!("go_back failed: {}", e)))?;
        sleep(Duration::from_millis(300)).await;
        Self::get_navigation_result(page).await
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        let bytes = self
            .page()?
            .screenshot(
                chromiumoxide::page::ScreenshotParams::builder()
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| BackendError::Other(format!("Screenshot failed: {}", e)))?;
        Ok(bytes)
    }

    async fn execute_script(&mut self, script: &str) -> Result<Value, BackendError> {
        self.eval(script).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el() -> ElementRef {
        ElementRef {
            strategy: Strategy::css("#go"),
            index: 0,
        }
    }

    #[test]
    fn action_status_maps_to_transient_errors() {
        assert!(as_status(Value::from("ok"), &el()).is_ok());
        let covered = as_status(Value::from("covered"), &el()).unwrap_err();
        assert_eq!(covered.code(), "ELEMENT_NOT_INTERACTABLE");
        assert!(covered.is_transient());
        let disabled = as_status(Value::from("disabled"), &el()).unwrap_err();
        assert!(matches!(disabled, BackendError::ElementDisabled { .. }));
    }

    #[test]
    fn unknown_permissions_are_rejected() {
        assert!(permission_type("geolocation").is_some());
        assert!(permission_type("camera-roll").is_none());
    }
}
