//! Completion backend error types and retry classification.

/// Specific error conditions reported by completion backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CompletionErrorKind {
    /// Transient failure (timeout, overload, connection reset)
    #[display("Transient completion failure: {}", _0)]
    Transient(String),
    /// Permanent failure (bad credentials, malformed request, unknown model)
    #[display("Permanent completion failure: {}", _0)]
    Permanent(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
}

impl CompletionErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionErrorKind::Transient(_) => true,
            CompletionErrorKind::Permanent(_) => false,
            CompletionErrorKind::HttpStatus { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
        }
    }
}

/// Error type for completion backend failures.
///
/// # Examples
///
/// ```
/// use vasari_error::{CompletionError, CompletionErrorKind};
///
/// let err = CompletionError::new(CompletionErrorKind::Transient("timeout".into()));
/// assert!(err.kind.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Completion Error: {} at line {} in {}", kind, line, file)]
pub struct CompletionError {
    /// The specific error condition
    pub kind: CompletionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl CompletionError {
    /// Create a new CompletionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompletionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
