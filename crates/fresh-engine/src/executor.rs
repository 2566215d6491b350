//! Element interactions with bounded retry.
//!
//! Only `click` retries: a fixed backoff between attempts, no growth, no jitter.
//! `fill`, `check` and `press` get one bounded attempt so that a wrong element
//! surfaces immediately. None of these wait for navigation; callers settle
//! explicitly afterwards.

use crate::backend::{Backend, BackendError};
use crate::outcome::{ActionError, ActionOutcome};
use crate::probe::Probe;
use crate::resolution::LocatorHandle;
use fresh_common::protocol::ElementDescriptor;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_CLICK_ATTEMPTS: u32 = 3;
pub const DEFAULT_CLICK_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_CLICK_ATTEMPTS,
            backoff: DEFAULT_CLICK_BACKOFF,
        }
    }
}

/// A set of mutually exclusive options (radio group) keyed by value.
#[derive(Debug, Clone)]
pub struct ChoiceGroup {
    name: String,
    options: Vec<(String, ElementDescriptor)>,
}

impl ChoiceGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, value: impl Into<String>, descriptor: ElementDescriptor) -> Self {
        self.options.push((value.into(), descriptor));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allowed(&self) -> Vec<String> {
        self.options.iter().map(|(v, _)| v.clone()).collect()
    }

    pub fn get(&self, value: &str) -> Option<&ElementDescriptor> {
        self.options
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, d)| d)
    }

    /// Check membership before touching the page.
    pub fn validate(&self, value: &str) -> Result<&ElementDescriptor, ActionError> {
        self.get(value).ok_or_else(|| ActionError::ValidationRejected {
            element: self.name.clone(),
            value: value.to_string(),
            allowed: self.allowed(),
        })
    }
}

/// Why a single click attempt failed.
enum ClickFailure {
    /// The element did not become visible within the action timeout.
    NeverVisible,
    Backend(BackendError),
}

#[derive(Debug, Clone, Copy)]
pub struct ResilientExecutor {
    probe: Probe,
    action_timeout: Duration,
    retry: RetryPolicy,
}

impl Default for ResilientExecutor {
    fn default() -> Self {
        Self::new(Probe::default(), DEFAULT_ACTION_TIMEOUT, RetryPolicy::default())
    }
}

impl ResilientExecutor {
    pub fn new(probe: Probe, action_timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            probe,
            action_timeout,
            retry,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn action_timeout(&self) -> Duration {
        self.action_timeout
    }

    /// Click with up to `max_attempts` tries and the fixed backoff in between.
    ///
    /// Non-transient failures (unsupported operation, lost connection) end the
    /// loop early; the outcome still reports the attempts made. When no attempt
    /// ever saw the element visible the outcome is `TimedOut`.
    pub async fn click_outcome<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        max_attempts: u32,
    ) -> ActionOutcome {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;
        let mut waited = Duration::ZERO;
        let mut reached = false;
        loop {
            attempt += 1;
            let error = match self.click_once(backend, handle).await {
                Ok(()) => {
                    debug!(element = %handle.name(), attempt, "clicked");
                    return ActionOutcome::Success { attempts: attempt };
                }
                Err(ClickFailure::NeverVisible) => {
                    waited += self.action_timeout;
                    BackendError::ElementNotVisible {
                        element: handle.name(),
                    }
                }
                Err(ClickFailure::Backend(e)) => {
                    reached = true;
                    e
                }
            };

            if attempt >= max_attempts || !error.is_transient() {
                warn!(
                    element = %handle.name(),
                    attempt,
                    error = %error,
                    "click failed, giving up"
                );
                if !reached {
                    return ActionOutcome::TimedOut { after: waited };
                }
                return ActionOutcome::Exhausted {
                    attempts: attempt,
                    last_error: error,
                };
            }

            warn!(
                element = %handle.name(),
                attempt,
                max_attempts,
                error = %error,
                "click failed, retrying"
            );
            sleep(self.retry.backoff).await;
        }
    }

    /// Like `click_outcome`, as a `Result`. A click that timed out on an
    /// element no strategy matches is reported as `NotFound` with the
    /// strategies tried.
    pub async fn click<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        max_attempts: u32,
    ) -> Result<(), ActionError> {
        let outcome = self.click_outcome(backend, handle, max_attempts).await;
        if let ActionOutcome::TimedOut { .. } = outcome
            && handle.resolve(backend).await.is_none()
        {
            return Err(ActionError::NotFound {
                element: handle.name(),
                attempted: handle.attempted(),
            });
        }
        outcome.into_result("click", &handle.name()).map(|_| ())
    }

    /// Click using the configured attempt count.
    pub async fn click_default<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
    ) -> Result<(), ActionError> {
        self.click(backend, handle, self.retry.max_attempts).await
    }

    async fn click_once<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
    ) -> Result<(), ClickFailure> {
        let element = self
            .probe
            .wait_until_visible(backend, handle, self.action_timeout)
            .await
            .map_err(|_| ClickFailure::NeverVisible)?;

        match timeout(self.action_timeout, backend.click(&element)).await {
            Ok(result) => result.map_err(ClickFailure::Backend),
            Err(_) => Err(ClickFailure::Backend(BackendError::TimeoutWithContext {
                operation: format!("click {}", handle.name()),
            })),
        }
    }

    /// Clear the field, then set `value`. One bounded attempt.
    pub async fn fill<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        value: &str,
    ) -> Result<(), ActionError> {
        let element = self
            .probe
            .wait_until_visible(backend, handle, self.action_timeout)
            .await?;

        let op = async {
            backend.clear(&element).await?;
            backend.fill(&element, value).await
        };
        match timeout(self.action_timeout, op).await {
            Ok(Ok(())) => {
                debug!(element = %handle.name(), chars = value.chars().count(), "filled");
                Ok(())
            }
            Ok(Err(e)) => Err(ActionError::backend("fill", handle.name(), e)),
            Err(_) => Err(self.timed_out("fill", handle)),
        }
    }

    /// Check a checkbox or radio. The input may be visually hidden behind a styled
    /// label, so only attachment is awaited.
    pub async fn check<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
    ) -> Result<(), ActionError> {
        let element = self
            .probe
            .wait_until_attached(backend, handle, self.action_timeout)
            .await?;
        match timeout(self.action_timeout, backend.check(&element)).await {
            Ok(result) => result.map_err(|e| ActionError::backend("check", handle.name(), e)),
            Err(_) => Err(self.timed_out("check", handle)),
        }
    }

    pub async fn press<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        handle: LocatorHandle<'_>,
        key: &str,
    ) -> Result<(), ActionError> {
        let element = self
            .probe
            .wait_until_visible(backend, handle, self.action_timeout)
            .await?;
        match timeout(self.action_timeout, backend.press_key(&element, key)).await {
            Ok(result) => result.map_err(|e| ActionError::backend("press", handle.name(), e)),
            Err(_) => Err(self.timed_out("press", handle)),
        }
    }

    /// Select exactly one option of `group`.
    ///
    /// A value outside the group's set is rejected before any page interaction.
    pub async fn select_single<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        group: &ChoiceGroup,
        value: &str,
    ) -> Result<(), ActionError> {
        let descriptor = group.validate(value)?;
        self.check(backend, LocatorHandle::new(descriptor)).await
    }

    fn timed_out(&self, operation: &str, handle: LocatorHandle<'_>) -> ActionError {
        ActionError::TimedOut {
            operation: operation.to_string(),
            element: handle.name(),
            after: self.action_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings() -> ChoiceGroup {
        (1..=5).fold(ChoiceGroup::new("rating"), |g, n| {
            g.option(n.to_string(), ElementDescriptor::css(format!("star {}", n), format!("#star{}", n)))
        })
    }

    #[test]
    fn choice_group_rejects_values_outside_the_set() {
        let group = ratings();
        for bad in ["0", "6", "-1", "3.5", ""] {
            let err = group.validate(bad).unwrap_err();
            assert_eq!(err.kind(), "validation_rejected", "value {:?}", bad);
        }
    }

    #[test]
    fn choice_group_accepts_declared_values() {
        let group = ratings();
        for good in ["1", "2", "3", "4", "5"] {
            let d = group.validate(good).unwrap();
            assert_eq!(d.name(), format!("star {}", good));
        }
        assert_eq!(group.allowed(), vec!["1", "2", "3", "4", "5"]);
    }
}
