//! Top-level error wrapper types.

use crate::{
    CallError, CompletionError, ExtractionError, JsonError, ManifestError, PipelineError,
    RenderError, StoreError,
};

/// This is the foundation error enum, collecting the error domains of the
/// Vasari workspace crates.
///
/// # Examples
///
/// ```
/// use vasari_error::{VasariError, JsonError};
///
/// let json_err = JsonError::new("unexpected end of input");
/// let err: VasariError = json_err.into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VasariErrorKind {
    /// Structured response extraction error
    #[from(ExtractionError)]
    Extraction(ExtractionError),
    /// Resilient call error
    #[from(CallError)]
    Call(CallError),
    /// Completion backend error
    #[from(CompletionError)]
    Completion(CompletionError),
    /// Keyed store error
    #[from(StoreError)]
    Store(StoreError),
    /// Pipeline construction or execution error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Pipeline manifest error
    #[from(ManifestError)]
    Manifest(ManifestError),
    /// Artifact rendering error
    #[from(RenderError)]
    Render(RenderError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Vasari error with kind discrimination.
///
/// # Examples
///
/// ```
/// use vasari_error::{VasariResult, StoreError, StoreErrorKind};
///
/// fn might_fail() -> VasariResult<()> {
///     Err(StoreError::new(StoreErrorKind::Read("missing".into())))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vasari Error: {}", _0)]
pub struct VasariError(Box<VasariErrorKind>);

impl VasariError {
    /// Create a new error from a kind.
    pub fn new(kind: VasariErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VasariErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to VasariErrorKind
impl<T> From<T> for VasariError
where
    T: Into<VasariErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vasari operations.
///
/// # Examples
///
/// ```
/// use vasari_error::{VasariResult, JsonError};
///
/// fn decode() -> VasariResult<String> {
///     Err(JsonError::new("trailing characters"))?
/// }
/// ```
pub type VasariResult<T> = std::result::Result<T, VasariError>;
