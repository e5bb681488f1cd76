//! Pipeline manifest error types.

/// Specific error conditions for pipeline manifest loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ManifestErrorKind {
    /// Failed to read manifest file
    #[display("Failed to read manifest file: {}", _0)]
    FileRead(String),
    /// Failed to parse TOML content
    #[display("Failed to parse TOML: {}", _0)]
    TomlParse(String),
    /// Stage order is empty
    #[display("Stage order (toc.order) cannot be empty")]
    EmptyToc,
    /// Stage referenced in order does not exist in the stages map
    #[display("Stage '{}' referenced in toc.order does not exist in stages map", _0)]
    MissingStage(String),
    /// Stage defined but never listed in the order
    #[display("Stage '{}' is defined but not listed in toc.order", _0)]
    UnlistedStage(String),
    /// Stage prompt is empty or contains only whitespace
    #[display("Stage '{}' has an empty prompt", _0)]
    EmptyPrompt(String),
}

/// Error type for pipeline manifest loading.
///
/// # Examples
///
/// ```
/// use vasari_error::{ManifestError, ManifestErrorKind};
///
/// let err = ManifestError::new(ManifestErrorKind::EmptyToc);
/// assert!(format!("{}", err).contains("empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Manifest Error: {} at line {} in {}", kind, line, file)]
pub struct ManifestError {
    /// The specific error condition
    pub kind: ManifestErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ManifestError {
    /// Create a new ManifestError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ManifestErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
