//! Error types for the command-line driver.

use sqlfront_core::Stage;

/// Errors that end a `sqlfront` run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The pipeline ran but reported diagnostics.
    #[error("{count} error(s) reported, first by the {stage}")]
    Diagnostics {
        /// The first stage that reported errors.
        stage: Stage,
        /// Total number of diagnostics.
        count: usize,
    },

    /// The report could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit status for this error: 1 for diagnostics, 2 otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Diagnostics { .. } => 1,
            Self::Serialization(_) => 2,
        }
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, CliError>;
