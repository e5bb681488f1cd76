//! Resilient completion calls with budget escalation.

use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use vasari_core::{BudgetPolicy, Record, Schema};
use vasari_error::{CallError, CallErrorKind};
use vasari_extract::extract_record;
use vasari_interface::CompletionBackend;

/// Calls a completion backend and extracts a validated record, retrying
/// on recoverable failures.
///
/// The retry decision depends on what failed:
/// - empty responses, transient upstream failures, and unbalanced
///   delimiters (likely truncation) retry at a grown size budget;
/// - schema violations and missing candidates retry at the same budget —
///   a fresh generation, not more text, is the fix;
/// - permanent upstream failures fail immediately.
///
/// After `max_attempts` consecutive failures the call is exhausted. Only
/// attempt count and budget growth are bounded here; wall-clock timeouts
/// are the backend's contract.
#[derive(Debug, Clone)]
pub struct CompletionController {
    backoff_base_ms: u64,
    max_backoff: Duration,
}

impl Default for CompletionController {
    fn default() -> Self {
        Self {
            backoff_base_ms: 500,
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl CompletionController {
    /// Create a controller with default backoff settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the initial inter-attempt delay in milliseconds.
    pub fn with_backoff_base(mut self, ms: u64) -> Self {
        self.backoff_base_ms = ms;
        self
    }

    /// Call the backend until a schema-valid record is extracted or the
    /// attempt budget runs out.
    ///
    /// # Errors
    ///
    /// - `Upstream` if the backend reports a permanent failure.
    /// - `Exhausted` with the last failure detail after `max_attempts`
    ///   consecutive failures.
    #[tracing::instrument(skip(self, backend, prompt, schema), fields(backend = backend.backend_name(), prompt_length = prompt.len()))]
    pub async fn call<B: CompletionBackend + ?Sized>(
        &self,
        backend: &B,
        prompt: &str,
        schema: &Schema,
        policy: &BudgetPolicy,
    ) -> Result<Record, CallError> {
        let max_attempts = *policy.max_attempts();
        let mut budget = *policy.initial();
        let mut last_error = String::new();

        let mut delays = ExponentialBackoff::from_millis(self.backoff_base_ms)
            .factor(2)
            .max_delay(self.max_backoff)
            .map(jitter);

        for attempt in 1..=max_attempts {
            tracing::debug!(attempt, budget, "Requesting completion");

            match backend.complete(prompt, budget).await {
                Ok(text) if text.trim().is_empty() => {
                    tracing::warn!(attempt, budget, "Empty response, growing budget");
                    last_error = "empty response from completion backend".to_string();
                    budget = policy.grow(budget);
                }
                Ok(text) => match extract_record(&text, schema) {
                    Ok(record) => {
                        tracing::debug!(attempt, budget, "Extracted valid record");
                        return Ok(record);
                    }
                    Err(e) => {
                        if e.kind.is_truncation() {
                            tracing::warn!(
                                attempt,
                                budget,
                                error = %e,
                                "Response looks truncated, growing budget"
                            );
                            budget = policy.grow(budget);
                        } else {
                            tracing::warn!(
                                attempt,
                                budget,
                                error = %e,
                                "Extraction failed, retrying at same budget"
                            );
                        }
                        last_error = e.to_string();
                    }
                },
                Err(e) => {
                    if !e.kind.is_retryable() {
                        tracing::error!(attempt, error = %e, "Permanent upstream failure");
                        return Err(CallError::new(CallErrorKind::Upstream(e.to_string())));
                    }
                    tracing::warn!(attempt, budget, error = %e, "Transient upstream failure");
                    last_error = e.to_string();
                    budget = policy.grow(budget);
                }
            }

            if attempt < max_attempts
                && let Some(delay) = delays.next()
            {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(
            attempts = max_attempts,
            last_error = %last_error,
            "Completion call exhausted"
        );
        Err(CallError::new(CallErrorKind::Exhausted {
            attempts: max_attempts,
            last_error,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use vasari_error::{CompletionError, CompletionErrorKind};

    /// Replays canned outcomes and records the budget of each attempt.
    struct Replay {
        responses: Mutex<Vec<Result<String, CompletionError>>>,
        budgets: Mutex<Vec<u32>>,
    }

    impl Replay {
        fn new(responses: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                budgets: Mutex::new(Vec::new()),
            }
        }

        fn budgets(&self) -> Vec<u32> {
            self.budgets.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for Replay {
        async fn complete(
            &self,
            _prompt: &str,
            max_tokens: u32,
        ) -> Result<String, CompletionError> {
            self.budgets.lock().unwrap().push(max_tokens);
            self.responses.lock().unwrap().remove(0)
        }

        fn backend_name(&self) -> &'static str {
            "replay"
        }
    }

    fn controller() -> CompletionController {
        CompletionController::new().with_backoff_base(1)
    }

    fn schema() -> Schema {
        Schema::new(["title", "items"])
    }

    fn policy() -> BudgetPolicy {
        BudgetPolicy::builder().initial(1000).build()
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let backend = Replay::new(vec![Ok(r#"{"title":"X","items":[1]}"#.to_string())]);

        let record = controller()
            .call(&backend, "prompt", &schema(), &policy())
            .await
            .unwrap();
        assert_eq!(record.get_path("title").unwrap(), "X");
        assert_eq!(backend.budgets(), vec![1000]);
    }

    #[tokio::test]
    async fn test_truncation_grows_budget() {
        let backend = Replay::new(vec![
            Ok(r#"{"title":"X","items":[1,2"#.to_string()),
            Ok(r#"{"title":"X","items":[1,2,3]}"#.to_string()),
        ]);

        let record = controller()
            .call(&backend, "prompt", &schema(), &policy())
            .await
            .unwrap();
        assert_eq!(record.get_path("items").unwrap().as_array().unwrap().len(), 3);
        assert_eq!(backend.budgets(), vec![1000, 1500]);
    }

    #[tokio::test]
    async fn test_schema_violation_keeps_budget() {
        let backend = Replay::new(vec![
            Ok(r#"{"title":"X"}"#.to_string()),
            Ok(r#"{"title":"X","items":[]}"#.to_string()),
        ]);

        controller()
            .call(&backend, "prompt", &schema(), &policy())
            .await
            .unwrap();
        assert_eq!(backend.budgets(), vec![1000, 1000]);
    }

    #[tokio::test]
    async fn test_transient_failure_retries() {
        let backend = Replay::new(vec![
            Err(CompletionError::new(CompletionErrorKind::Transient(
                "overloaded".to_string(),
            ))),
            Ok(r#"{"title":"X","items":[]}"#.to_string()),
        ]);

        let record = controller()
            .call(&backend, "prompt", &schema(), &policy())
            .await
            .unwrap();
        assert_eq!(record.get_path("title").unwrap(), "X");
    }

    #[tokio::test]
    async fn test_permanent_failure_fails_immediately() {
        let backend = Replay::new(vec![Err(CompletionError::new(
            CompletionErrorKind::Permanent("bad credentials".to_string()),
        ))]);

        let err = controller()
            .call(&backend, "prompt", &schema(), &policy())
            .await
            .unwrap_err();
        assert!(matches!(err.kind, CallErrorKind::Upstream(_)));
        assert_eq!(backend.budgets().len(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_error() {
        let backend = Replay::new(vec![
            Ok("no payload here".to_string()),
            Ok("still no payload".to_string()),
            Ok("nothing".to_string()),
        ]);

        let err = controller()
            .call(&backend, "prompt", &schema(), &policy())
            .await
            .unwrap_err();
        match err.kind {
            CallErrorKind::Exhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("No structured candidate"));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_response_grows_budget() {
        let backend = Replay::new(vec![
            Ok("   ".to_string()),
            Ok(r#"{"title":"X","items":[]}"#.to_string()),
        ]);

        controller()
            .call(&backend, "prompt", &schema(), &policy())
            .await
            .unwrap();
        assert_eq!(backend.budgets(), vec![1000, 1500]);
    }
}
