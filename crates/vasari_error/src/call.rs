//! Call controller error types.

/// Specific error conditions for resilient completion calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CallErrorKind {
    /// All attempts failed; carries the last failure detail
    #[display("Call exhausted after {} attempts: {}", attempts, last_error)]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Detail of the final failure
        last_error: String,
    },
    /// The completion service reported a permanent failure
    #[display("Upstream completion failure: {}", _0)]
    Upstream(String),
}

/// Error type for resilient completion calls.
///
/// # Examples
///
/// ```
/// use vasari_error::{CallError, CallErrorKind};
///
/// let err = CallError::new(CallErrorKind::Upstream("401 unauthorized".into()));
/// assert!(format!("{}", err).contains("Upstream"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Call Error: {} at line {} in {}", kind, line, file)]
pub struct CallError {
    /// The specific error condition
    pub kind: CallErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl CallError {
    /// Create a new CallError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CallErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
