use chromiumoxide::Page;
use fresh_common::error::BackendError;
use std::time::Duration;

/// Upper bound for one evaluation; a dialog left open blocks the JS thread.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries when the execution context is gone because the page is navigating.
const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context") || err.contains("Execution context was destroyed")
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

/// Evaluate `expression` in the page and return its JSON value.
///
/// Context errors during navigation are retried; anything else surfaces as
/// `BackendError::ScriptError`.
pub async fn evaluate(page: &Page, expression: &str) -> Result<serde_json::Value, BackendError> {
    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match evaluate_with_timeout(page, expression).await {
            Ok(value) => return Ok(value),
            Err(EvalError::Timeout) => {
                return Err(BackendError::TimeoutWithContext {
                    operation: "script evaluation (is a dialog open?)".into(),
                });
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error during evaluation (attempt {}/{}), retrying...",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => return Err(BackendError::ScriptError(err_str)),
        }
    }

    Err(BackendError::ScriptError(last_error.unwrap_or_else(|| {
        "Evaluation failed after retries".to_string()
    })))
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
) -> Result<serde_json::Value, EvalError> {
    let eval_result = tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression)).await;

    match eval_result {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(remote_object)) => Ok(remote_object
            .into_value::<serde_json::Value>()
            .unwrap_or(serde_json::Value::Null)),
    }
}

#[cfg(test)]
mod tests {
    use super::is_context_error;

    #[test]
    fn navigation_errors_are_context_errors() {
        assert!(is_context_error("Execution context was destroyed, most likely because of a navigation"));
        assert!(is_context_error("Cannot find context with specified id"));
        assert!(!is_context_error("SyntaxError: '!!' is not a valid selector"));
        assert!(!is_context_error("-32000: Object reference chain is too long"));
    }
}
