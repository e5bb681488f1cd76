//! HTTP completion backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vasari_error::{CompletionError, CompletionErrorKind};
use vasari_interface::CompletionBackend;

/// Wire request for the completion endpoint.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
}

/// Wire response from the completion endpoint.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    text: String,
}

/// Completion backend speaking JSON POST to an HTTP endpoint.
///
/// The endpoint contract is `{prompt, max_tokens}` in, `{text}` out.
/// Transport failures and retryable status codes surface as transient
/// errors; everything else is permanent.
///
/// # Example
///
/// ```rust,ignore
/// let backend = HttpCompletion::new("http://localhost:8080/v1/complete")
///     .with_api_key(std::env::var("VASARI_API_KEY")?);
/// let text = backend.complete("Write a haiku.", 256).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpCompletion {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpCompletion {
    /// Create a backend for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Attach a bearer token to each request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build a backend from `VASARI_COMPLETIONS_URL` and (optionally)
    /// `VASARI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a permanent error if `VASARI_COMPLETIONS_URL` is not set.
    pub fn from_env() -> Result<Self, CompletionError> {
        let endpoint = std::env::var("VASARI_COMPLETIONS_URL").map_err(|_| {
            CompletionError::new(CompletionErrorKind::Permanent(
                "VASARI_COMPLETIONS_URL environment variable not set".to_string(),
            ))
        })?;

        let mut backend = Self::new(endpoint);
        if let Ok(api_key) = std::env::var("VASARI_API_KEY") {
            backend = backend.with_api_key(api_key);
        }
        Ok(backend)
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletion {
    #[tracing::instrument(skip(self, prompt), fields(endpoint = %self.endpoint, prompt_length = prompt.len(), max_tokens))]
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CompletionError> {
        let mut request = self.client.post(&self.endpoint).json(&CompletionRequest {
            prompt,
            max_tokens,
        });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            // Connection-level failures are worth retrying
            CompletionError::new(CompletionErrorKind::Transient(e.to_string()))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Completion endpoint returned error");
            return Err(CompletionError::new(CompletionErrorKind::HttpStatus {
                status_code: status.as_u16(),
                message,
            }));
        }

        let body: CompletionResponse = response.json().await.map_err(|e| {
            CompletionError::new(CompletionErrorKind::Permanent(format!(
                "Malformed completion response: {}",
                e
            )))
        })?;

        tracing::debug!(response_length = body.text.len(), "Received completion");
        Ok(body.text)
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
