//! Parallel scenario runner.
//!
//! Every scenario gets its own browser and `PageSession`, so nothing is shared
//! between concurrently running scenarios. Concurrency is bounded by a
//! semaphore; a failing scenario never stops its siblings.

use crate::error::ScenarioError;
use crate::report::{ScenarioReport, SuiteReport};
use crate::scenarios::{Scenario, ScenarioCtx};
use fresh_engine::backend::Backend;
use fresh_engine::config::FreshConfig;
use fresh_engine::fixtures::Fixtures;
use fresh_engine::session::PageSession;
use fresh_h::HeadlessBackend;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Runner {
    config: FreshConfig,
    fixtures: Fixtures,
    workers: usize,
}

impl Runner {
    pub fn new(config: FreshConfig, fixtures: Fixtures, workers: usize) -> Self {
        Self {
            config,
            fixtures,
            workers: workers.max(1),
        }
    }

    /// Run `scenarios` and collect results in catalogue order.
    pub async fn run(&self, scenarios: Vec<Scenario>) -> SuiteReport {
        let start = Instant::now();
        info!(
            scenarios = scenarios.len(),
            workers = self.workers,
            base_url = %self.config.base_url,
            "running scenarios"
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();
        let mut unfinished: Vec<Option<Scenario>> = Vec::with_capacity(scenarios.len());

        for (order, scenario) in scenarios.into_iter().enumerate() {
            unfinished.push(Some(scenario));
            let semaphore = semaphore.clone();
            let config = self.config.clone();
            let fixtures = self.fixtures.clone();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (order, run_one(scenario, config, fixtures).await)
            });
        }

        let mut results = Vec::with_capacity(unfinished.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((order, report)) => {
                    unfinished[order] = None;
                    results.push((order, report));
                }
                Err(e) => error!(error = %e, "scenario task aborted"),
            }
        }

        // Tasks that panicked never reported back.
        for (order, scenario) in unfinished.into_iter().enumerate() {
            if let Some(scenario) = scenario {
                let failure = ScenarioError::Setup("scenario task aborted".to_string());
                results.push((order, ScenarioReport::new(&scenario, Duration::ZERO, Err(failure))));
            }
        }

        results.sort_by_key(|(order, _)| *order);
        SuiteReport::new(
            results.into_iter().map(|(_, r)| r).collect(),
            start.elapsed(),
        )
    }
}

async fn run_one(scenario: Scenario, config: FreshConfig, fixtures: Fixtures) -> ScenarioReport {
    let start = Instant::now();
    debug!(scenario = scenario.name, suite = %scenario.suite, "starting");
    let outcome = execute(&scenario, config, fixtures).await;
    let elapsed = start.elapsed();

    match &outcome {
        Ok(()) => info!(
            "✓ [{}] {} ({} ms)",
            scenario.suite,
            scenario.name,
            elapsed.as_millis()
        ),
        Err(e) => error!("✗ [{}] {} - {}", scenario.suite, scenario.name, e),
    }
    ScenarioReport::new(&scenario, elapsed, outcome)
}

/// Launch a browser, run the scenario under the per-test timeout, screenshot
/// on failure and always tear the session down.
async fn execute(
    scenario: &Scenario,
    config: FreshConfig,
    fixtures: Fixtures,
) -> Result<(), ScenarioError> {
    let budget = config.timeouts.test();
    let backend = HeadlessBackend::new_with_visibility(!config.headless).with_viewport(config.viewport);
    let mut session = PageSession::new(backend, config)
        .map_err(|e| ScenarioError::Setup(format!("invalid base url: {}", e)))?;

    if let Err(e) = session.backend_mut().launch().await {
        let _ = session.backend_mut().close().await;
        return Err(ScenarioError::Setup(format!("browser launch failed: {}", e)));
    }

    let mut ctx = ScenarioCtx { session, fixtures };
    let outcome = match timeout(budget, (scenario.run)(&mut ctx)).await {
        Ok(result) => result,
        Err(_) => Err(ScenarioError::TimedOut { after: budget }),
    };

    if outcome.is_err() {
        match ctx.session.screenshot(&scenario.slug()).await {
            Ok(path) => info!(path = %path.display(), "failure screenshot saved"),
            Err(e) => warn!(error = %e, "failure screenshot not taken"),
        }
    }

    if let Err(e) = ctx.session.teardown().await {
        warn!(scenario = scenario.name, error = %e, "teardown failed");
    }
    outcome
}

/// Check the application answers before launching any browser.
///
/// Only warns: a scenario run against an unreachable app fails on its own.
pub async fn preflight(base_url: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(PREFLIGHT_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "could not build preflight client");
            return false;
        }
    };

    match client.get(base_url).send().await {
        Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
            info!(%base_url, status = resp.status().as_u16(), "application reachable");
            true
        }
        Ok(resp) => {
            warn!(%base_url, status = resp.status().as_u16(), "application answered with an error status");
            false
        }
        Err(e) => {
            warn!(%base_url, error = %e, "application unreachable");
            false
        }
    }
}
