//! Artifact rendering error types.

/// Kinds of rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RenderErrorKind {
    /// Failed to serialize the record
    #[display("Failed to serialize record: {}", _0)]
    Serialization(String),
    /// Failed to write an artifact file
    #[display("Failed to write artifact: {}", _0)]
    Io(String),
}

/// Rendering error with location tracking.
///
/// # Examples
///
/// ```
/// use vasari_error::{RenderError, RenderErrorKind};
///
/// let err = RenderError::new(RenderErrorKind::Io("permission denied".to_string()));
/// assert!(format!("{}", err).contains("permission denied"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The kind of error that occurred
    pub kind: RenderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RenderError {
    /// Create a new render error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
