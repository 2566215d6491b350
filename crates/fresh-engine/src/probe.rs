//! Bounded visibility checks.
//!
//! `is_visible` is a cheap existence probe for conditional branches and never
//! fails. The `wait_until_*` variants are hard preconditions and return
//! `ActionError::TimedOut` when the budget runs out.

use crate::backend::Backend;
use crate::outcome::ActionError;
use crate::resolution::LocatorHandle;
use fresh_common::protocol::ElementRef;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};
use tracing::debug;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Attached,
    Visible,
    Hidden,
}

impl Condition {
    fn operation(self) -> &'static str {
        match self {
            Condition::Attached => "attach",
            Condition::Visible => "visibility",
            Condition::Hidden => "hide",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Probe {
    default_timeout: Duration,
    poll_interval: Duration,
}

impl Default for Probe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

impl Probe {
    pub fn new(default_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            default_timeout,
            poll_interval,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether the element becomes visible within `budget`. Errors count as "not yet".
    pub async fn is_visible<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        budget: Duration,
    ) -> bool {
        self.poll(backend, handle, Condition::Visible, budget)
            .await
            .is_some()
    }

    /// `is_visible` with the probe's default budget.
    pub async fn is_visible_default<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
    ) -> bool {
        self.is_visible(backend, handle, self.default_timeout).await
    }

    pub async fn wait_until_visible<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        budget: Duration,
    ) -> Result<ElementRef, ActionError> {
        self.poll(backend, handle, Condition::Visible, budget)
            .await
            .flatten()
            .ok_or_else(|| timed_out(handle, Condition::Visible, budget))
    }

    /// Wait until the element exists in the DOM, visible or not.
    pub async fn wait_until_attached<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        budget: Duration,
    ) -> Result<ElementRef, ActionError> {
        self.poll(backend, handle, Condition::Attached, budget)
            .await
            .flatten()
            .ok_or_else(|| timed_out(handle, Condition::Attached, budget))
    }

    /// Wait until the element is gone or hidden.
    pub async fn wait_until_hidden<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        budget: Duration,
    ) -> Result<(), ActionError> {
        self.poll(backend, handle, Condition::Hidden, budget)
            .await
            .map(|_| ())
            .ok_or_else(|| timed_out(handle, Condition::Hidden, budget))
    }

    /// Poll until `condition` holds or `budget` elapses.
    ///
    /// `Some(element)` for attached/visible, `Some(None)` for hidden.
    async fn poll<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        condition: Condition,
        budget: Duration,
    ) -> Option<Option<ElementRef>> {
        let deadline = Instant::now() + budget;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match timeout(remaining, Self::check(backend, handle, condition)).await {
                Ok(Some(found)) => return Some(found),
                Ok(None) => {}
                Err(_) => break,
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
        debug!(
            element = %handle.name(),
            condition = condition.operation(),
            ?budget,
            "probe budget elapsed"
        );
        None
    }

    async fn check<B: Backend + ?Sized>(
        backend: &mut B,
        handle: LocatorHandle<'_>,
        condition: Condition,
    ) -> Option<Option<ElementRef>> {
        let element = handle.element(backend).await;
        match (condition, element) {
            (Condition::Attached, Some(el)) => Some(Some(el)),
            (Condition::Attached, None) => None,
            (Condition::Visible, Some(el)) => match backend.is_visible(&el).await {
                Ok(true) => Some(Some(el)),
                Ok(false) => None,
                Err(e) => {
                    debug!(element = %handle.name(), error = %e, "visibility check failed");
                    None
                }
            },
            (Condition::Visible, None) => None,
            (Condition::Hidden, None) => Some(None),
            (Condition::Hidden, Some(el)) => match backend.is_visible(&el).await {
                Ok(false) => Some(None),
                Ok(true) | Err(_) => None,
            },
        }
    }
}

fn timed_out(handle: LocatorHandle<'_>, condition: Condition, after: Duration) -> ActionError {
    ActionError::TimedOut {
        operation: condition.operation().to_string(),
        element: handle.name(),
        after,
    }
}
