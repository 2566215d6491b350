use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::cdp::js_protocol::runtime::{ConsoleApiCalledType, EventConsoleApiCalled};
use chromiumoxide::{Browser, BrowserConfig, Page};
use fresh_common::protocol::Viewport;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

type LaunchError = Box<dyn std::error::Error + Send + Sync>;

/// Overrides the Chromium binary.
pub const CHROME_BIN_ENV: &str = "CHROME_BIN";
/// Reuses one profile directory instead of a throwaway one per test.
pub const USER_DATA_DIR_ENV: &str = "FRESH_USER_DATA_DIR";

/// How one test's browser is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub visible: bool,
    pub viewport: Viewport,
    pub chrome_bin: Option<PathBuf>,
    /// Shared profile directory; `None` means a private one per launch.
    pub user_data_dir: Option<PathBuf>,
}

impl LaunchOptions {
    pub fn new(visible: bool, viewport: Viewport) -> Self {
        Self {
            visible,
            viewport,
            chrome_bin: None,
            user_data_dir: None,
        }
    }

    /// Fill the binary and profile overrides from the environment.
    pub fn from_env(visible: bool, viewport: Viewport) -> Self {
        let var = |name| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };
        Self {
            chrome_bin: var(CHROME_BIN_ENV),
            user_data_dir: var(USER_DATA_DIR_ENV),
            ..Self::new(visible, viewport)
        }
    }

    fn browser_config(&self, profile: &Path) -> Result<BrowserConfig, LaunchError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile)
            .window_size(self.viewport.width, self.viewport.height);
        if self.visible {
            builder = builder.with_head();
        }
        if let Some(bin) = &self.chrome_bin {
            builder = builder.chrome_executable(bin);
        }
        builder
            .build()
            .map_err(|e| format!("Failed to build browser config: {}", e).into())
    }
}

/// Chromium profile directory. A private one is removed when dropped.
#[derive(Debug)]
struct Profile {
    path: PathBuf,
    private: bool,
}

impl Profile {
    fn for_options(options: &LaunchOptions) -> Result<Self, LaunchError> {
        let (path, private) = match &options.user_data_dir {
            Some(shared) => (shared.clone(), false),
            None => {
                let nanos = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_err(|e| format!("System clock error: {}", e))?
                    .as_nanos();
                let name = format!("fresh-chromium-profile-{}-{}", std::process::id(), nanos);
                (std::env::temp_dir().join(name), true)
            }
        };
        std::fs::create_dir_all(&path)?;
        tracing::debug!(path = %path.display(), private, "chromium profile");
        Ok(Self { path, private })
    }
}

impl Drop for Profile {
    fn drop(&mut self) {
        if self.private
            && let Err(e) = std::fs::remove_dir_all(&self.path)
        {
            tracing::debug!(path = %self.path.display(), error = %e, "profile cleanup failed");
        }
    }
}

/// One browser process driving one tab inside its own browser context.
///
/// The context keeps storage and permissions private to the test even when
/// several launches share a profile directory.
pub struct CdpClient {
    pub browser: Browser,
    pub page: Page,
    pub context_id: Option<BrowserContextId>,
    handler_task: JoinHandle<()>,
    _profile: Profile,
}

impl CdpClient {
    pub async fn launch(options: &LaunchOptions) -> Result<Self, LaunchError> {
        let profile = Profile::for_options(options)?;
        tracing::info!(
            visible = options.visible,
            width = options.viewport.width,
            height = options.viewport.height,
            chrome = ?options.chrome_bin,
            "launching chromium"
        );

        let (mut browser, mut handler) = Browser::launch(options.browser_config(&profile.path)?)
            .await
            .map_err(|e| format!("Failed to launch browser: {}", e))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler error");
                }
            }
            tracing::debug!("browser handler task ended");
        });

        let (page, context_id) = match open_isolated_page(&browser).await {
            Ok(opened) => opened,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(e);
            }
        };

        forward_console(&page).await?;
        accept_dialogs(&page).await?;

        Ok(Self {
            browser,
            page,
            context_id: Some(context_id),
            handler_task,
            _profile: profile,
        })
    }

    pub async fn close(mut self) -> Result<(), LaunchError> {
        if let Some(id) = self.context_id.take()
            && let Err(e) = self.browser.execute(DisposeBrowserContextParams::new(id)).await
        {
            tracing::debug!(error = %e, "disposing browser context failed");
        }
        self.browser
            .close()
            .await
            .map_err(|e| format!("Error closing browser: {}", e))?;
        self.handler_task
            .await
            .map_err(|e| format!("Error awaiting handler: {}", e))?;
        Ok(())
    }
}

async fn open_isolated_page(browser: &Browser) -> Result<(Page, BrowserContextId), LaunchError> {
    let context_id = browser
        .execute(CreateBrowserContextParams::default())
        .await
        .map_err(|e| format!("Failed to create browser context: {}", e))?
        .result
        .browser_context_id;
    let target = CreateTargetParams::builder()
        .url("about:blank")
        .browser_context_id(context_id.clone())
        .build()
        .map_err(|e| format!("Failed to build target params: {}", e))?;
    let page = browser
        .new_page(target)
        .await
        .map_err(|e| format!("Failed to create page: {}", e))?;
    Ok((page, context_id))
}

/// Page console output goes to the log; errors and warnings stay visible
/// without raising the log level.
async fn forward_console(page: &Page) -> Result<(), LaunchError> {
    let mut events = page
        .event_listener::<EventConsoleApiCalled>()
        .await
        .map_err(|e| format!("Failed to subscribe to console events: {}", e))?;

    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let text = event
                .args
                .iter()
                .map(|arg| {
                    arg.description
                        .clone()
                        .or_else(|| arg.value.as_ref().map(|v| v.to_string()))
                        .unwrap_or_else(|| "unknown".to_string())
                })
                .collect::<Vec<_>>()
                .join(" ");
            match event.r#type {
                ConsoleApiCalledType::Error | ConsoleApiCalledType::Warning => {
                    tracing::warn!(kind = ?event.r#type, "page console: {}", text)
                }
                _ => tracing::debug!(kind = ?event.r#type, "page console: {}", text),
            }
        }
    });
    Ok(())
}

/// An open alert or confirm blocks every later evaluation, so accept them.
async fn accept_dialogs(page: &Page) -> Result<(), LaunchError> {
    let mut events = page
        .event_listener::<EventJavascriptDialogOpening>()
        .await
        .map_err(|e| format!("Failed to subscribe to dialog events: {}", e))?;

    let page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            tracing::info!(kind = ?event.r#type, message = %event.message, "accepting dialog");
            if let Err(e) = page.execute(HandleJavaScriptDialogParams::new(true)).await {
                tracing::error!(error = %e, "failed to accept dialog");
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_profiles_are_removed_on_drop() {
        let options = LaunchOptions::new(false, Viewport::default());
        let profile = Profile::for_options(&options).unwrap();
        let path = profile.path.clone();
        assert!(path.exists());
        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn shared_profiles_are_kept() {
        let shared = std::env::temp_dir().join(format!("fresh-shared-profile-{}", std::process::id()));
        let options = LaunchOptions {
            user_data_dir: Some(shared.clone()),
            ..LaunchOptions::new(false, Viewport::default())
        };
        drop(Profile::for_options(&options).unwrap());
        assert!(shared.exists());
        std::fs::remove_dir_all(&shared).unwrap();
    }

    #[test]
    fn browser_config_builds_without_touching_chromium() {
        let options = LaunchOptions {
            chrome_bin: Some(PathBuf::from("/opt/chromium/chrome")),
            ..LaunchOptions::new(true, Viewport { width: 375, height: 667 })
        };
        let profile = Profile::for_options(&options).unwrap();
        assert!(options.browser_config(&profile.path).is_ok());
    }
}
