//! Keyed store error types.
//!
//! Store failures are fatal to a run: stage completion cannot be trusted
//! without confirmed durable persistence.

/// Kinds of keyed store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// Failed to read an entry
    #[display("Failed to read store entry: {}", _0)]
    Read(String),
    /// Failed to write an entry
    #[display("Failed to write store entry: {}", _0)]
    Write(String),
    /// Failed to create the store directory
    #[display("Failed to create store directory: {}", _0)]
    DirectoryCreation(String),
    /// Stored bytes could not be decoded
    #[display("Failed to decode store entry: {}", _0)]
    Codec(String),
}

/// Keyed store error with location tracking.
///
/// # Examples
///
/// ```
/// use vasari_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::Write("disk full".to_string()));
/// assert!(format!("{}", err).contains("disk full"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
