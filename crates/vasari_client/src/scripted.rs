//! Scripted completion backend for tests and offline demos.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use vasari_error::{CompletionError, CompletionErrorKind};
use vasari_interface::CompletionBackend;

/// Replays a fixed sequence of responses and counts every call.
///
/// The call counter makes resumability directly assertable: a re-run that
/// reads everything from the store performs zero completion calls.
///
/// # Example
///
/// ```
/// use vasari_client::ScriptedCompletion;
/// use vasari_interface::CompletionBackend;
///
/// # async fn example() {
/// let backend = ScriptedCompletion::new([r#"{"title":"X"}"#.to_string()]);
/// let text = backend.complete("prompt", 1024).await.unwrap();
/// assert_eq!(backend.call_count(), 1);
/// assert!(text.contains("title"));
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    /// Script a sequence of successful responses.
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script a sequence of outcomes, including failures.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, CompletionError>>,
    {
        Self {
            responses: Mutex::new(results.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many completion calls have been made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// How many scripted responses remain.
    pub fn remaining(&self) -> usize {
        self.lock_responses().len()
    }

    /// The prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        match self.prompts.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, CompletionError>>> {
        match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.prompts.lock() {
            Ok(mut guard) => guard.push(prompt.to_string()),
            Err(poisoned) => poisoned.into_inner().push(prompt.to_string()),
        }

        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CompletionError::new(CompletionErrorKind::Permanent(
                    "scripted responses exhausted".to_string(),
                )))
            })
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}
