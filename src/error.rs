// Engine error taxonomy.
//
// Configuration and dependency problems abort the whole batch before any
// output column is produced. Degenerate inputs (constant signal arrays,
// empty batches) are NOT errors — they are handled locally with a defined
// fallback and a logged warning.

use thiserror::Error;

/// Errors the signal analysis engine can surface to its caller.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Invalid configuration — bad fusion weights or an unsupported
    /// sentiment backend. Checked before any processing starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An opt-in backend was requested but is unavailable. Never silently
    /// downgraded — the caller must explicitly switch backends.
    #[error("dependency error: {0}")]
    Dependency(String),

    /// Parallel signal arrays disagree on length. Indicates a bug in the
    /// calling pipeline, not in the input data.
    #[error("shape mismatch: expected {expected} rows, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
