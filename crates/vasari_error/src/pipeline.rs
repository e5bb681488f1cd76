//! Pipeline construction and execution error types.

/// Specific error conditions for pipeline operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Pipeline declared with no stages
    #[display("Pipeline must declare at least one stage")]
    EmptyPipeline,
    /// Two stages share an id
    #[display("Duplicate stage id '{}'", _0)]
    DuplicateStage(String),
    /// A dependency references a stage that does not exist
    #[display("Stage '{}' depends on unknown stage '{}'", stage, dependency)]
    UnknownDependency {
        /// Stage declaring the dependency
        stage: String,
        /// The missing dependency id
        dependency: String,
    },
    /// A dependency references a stage declared later in the order
    #[display("Stage '{}' depends on '{}', which is not declared earlier", stage, dependency)]
    ForwardDependency {
        /// Stage declaring the dependency
        stage: String,
        /// The forward-referenced dependency id
        dependency: String,
    },
    /// A dependency value was absent from the store at gather time
    #[display("Stage '{}' is missing stored value for dependency '{}'", stage, dependency)]
    MissingDependencyValue {
        /// Stage gathering its inputs
        stage: String,
        /// The dependency whose value was absent
        dependency: String,
    },
    /// Prompt construction failed
    #[display("Failed to assemble prompt for stage '{}': {}", stage, message)]
    PromptAssembly {
        /// Stage name
        stage: String,
        /// Error message
        message: String,
    },
    /// Template placeholder resolution failed
    #[display("Template error: {}", _0)]
    Template(String),
    /// A stage's budget policy is unusable
    #[display("Stage '{}' has an invalid budget policy: {}", stage, message)]
    InvalidBudget {
        /// Stage name
        stage: String,
        /// Validation message
        message: String,
    },
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use vasari_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::EmptyPipeline);
/// assert!(format!("{}", err).contains("at least one stage"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
