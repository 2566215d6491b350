use fresh_engine::outcome::ActionError;
use std::time::Duration;
use thiserror::Error;

/// Why a scenario did not pass.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Action(#[from] ActionError),

    #[error("Assertion failed: {check}: {detail}")]
    Assertion { check: String, detail: String },

    #[error("Scenario timed out after {after:?}")]
    TimedOut { after: Duration },

    #[error("Setup failed: {0}")]
    Setup(String),
}

impl ScenarioError {
    pub fn assertion(check: impl Into<String>, detail: impl Into<String>) -> Self {
        ScenarioError::Assertion {
            check: check.into(),
            detail: detail.into(),
        }
    }

    pub fn is_setup(&self) -> bool {
        matches!(self, ScenarioError::Setup(_))
    }
}

pub type ScenarioResult = Result<(), ScenarioError>;

/// Fail the scenario unless `cond` holds.
macro_rules! ensure {
    ($cond:expr, $check:expr) => {
        if !$cond {
            return Err($crate::error::ScenarioError::assertion(
                $check,
                format!("expected `{}`", stringify!($cond)),
            ));
        }
    };
}

/// Fail the scenario unless both sides compare equal.
macro_rules! ensure_eq {
    ($left:expr, $right:expr, $check:expr) => {{
        let left = $left;
        let right = $right;
        if left != right {
            return Err($crate::error::ScenarioError::assertion(
                $check,
                format!("expected {:?}, got {:?}", right, left),
            ));
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_eq(a: usize, b: usize) -> ScenarioResult {
        ensure_eq!(a, b, "reviews count");
        Ok(())
    }

    fn check(flag: bool) -> ScenarioResult {
        ensure!(flag, "success message visible");
        Ok(())
    }

    #[test]
    fn ensure_eq_reports_both_sides() {
        assert!(check_eq(1, 1).is_ok());
        let msg = check_eq(0, 1).unwrap_err().to_string();
        assert_eq!(msg, "Assertion failed: reviews count: expected 1, got 0");
    }

    #[test]
    fn ensure_names_the_condition() {
        assert!(check(true).is_ok());
        let msg = check(false).unwrap_err().to_string();
        assert!(msg.contains("success message visible"));
        assert!(msg.contains("expected `flag`"));
    }

    #[test]
    fn action_errors_convert() {
        let err: ScenarioError = ActionError::ValidationRejected {
            element: "rating".into(),
            value: "6".into(),
            allowed: vec!["1".into(), "5".into()],
        }
        .into();
        assert!(!err.is_setup());
        assert!(err.to_string().contains("Rejected value '6'"));
    }
}
