//! Extraction error types.

/// Specific error conditions for structured response extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ExtractionErrorKind {
    /// No structural delimiter found anywhere in the response
    #[display("No structured candidate found in response ({} chars)", _0)]
    NoCandidate(usize),
    /// A candidate was found but its delimiters never balance
    #[display("Unbalanced delimiters in response candidate")]
    UnbalancedDelimiters,
    /// The parsed record is missing required paths
    #[display("Record violates schema, missing paths: {}", missing.join(", "))]
    SchemaViolation {
        /// Dotted paths of required keys that are absent or null
        missing: Vec<String>,
    },
}

impl ExtractionErrorKind {
    /// Whether a retry at a larger size budget is likely to help.
    ///
    /// Unbalanced delimiters usually mean the generation was cut off
    /// mid-stream; schema violations and missing candidates need a fresh
    /// generation, not more text.
    pub fn is_truncation(&self) -> bool {
        matches!(self, ExtractionErrorKind::UnbalancedDelimiters)
    }
}

/// Error type for structured response extraction.
///
/// # Examples
///
/// ```
/// use vasari_error::{ExtractionError, ExtractionErrorKind};
///
/// let err = ExtractionError::new(ExtractionErrorKind::UnbalancedDelimiters);
/// assert!(format!("{}", err).contains("Unbalanced"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Extraction Error: {} at line {} in {}", kind, line, file)]
pub struct ExtractionError {
    /// The specific error condition
    pub kind: ExtractionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ExtractionError {
    /// Create a new ExtractionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ExtractionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
