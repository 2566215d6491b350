use crate::error::ScenarioError;
use crate::scenarios::{Scenario, Suite, Tag};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Passed,
    Failed,
    SetupError,
}

/// Result of a single scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub suite: Suite,
    pub tags: Vec<Tag>,
    pub status: Status,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl ScenarioReport {
    pub fn new(scenario: &Scenario, elapsed: Duration, outcome: Result<(), ScenarioError>) -> Self {
        let (status, error) = match outcome {
            Ok(()) => (Status::Passed, None),
            Err(e) if e.is_setup() => (Status::SetupError, Some(e.to_string())),
            Err(e) => (Status::Failed, Some(e.to_string())),
        };
        Self {
            name: scenario.name.to_string(),
            suite: scenario.suite,
            tags: scenario.tags.to_vec(),
            status,
            duration_ms: elapsed.as_millis() as u64,
            error,
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub setup_errors: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn new(results: Vec<ScenarioReport>, elapsed: Duration) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(Status::Passed),
            failed: count(Status::Failed),
            setup_errors: count(Status::SetupError),
            duration_ms: elapsed.as_millis() as u64,
            results,
        }
    }

    /// 0 when everything passed, 2 when any scenario could not be set up, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.setup_errors > 0 {
            2
        } else if self.failed > 0 {
            1
        } else {
            0
        }
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        for r in self.results.iter().filter(|r| r.status != Status::Passed) {
            out.push_str(&format!(
                "  FAILED [{}] {}: {}\n",
                r.suite,
                r.name,
                r.error.as_deref().unwrap_or("unknown error")
            ));
        }
        out.push_str(&format!(
            "{} passed, {} failed, {} setup errors ({} total, {} ms)",
            self.passed, self.failed, self.setup_errors, self.total, self.duration_ms
        ));
        out
    }

    pub async fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
