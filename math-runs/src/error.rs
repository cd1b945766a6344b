//! Error types for the runs estimator.
//!
//! Solver faults are carried unchanged in [`RunsError::Solver`]; input and
//! configuration problems are reported before any numeric work starts.

use math_runs_solvers::LuError;
use thiserror::Error;

/// Errors that can occur while estimating runs.
#[derive(Debug, Error)]
pub enum RunsError {
    /// Class names and deficits do not describe the same square system.
    #[error("input shape mismatch: {0}")]
    InputShape(String),

    /// An experience rate is zero, negative or not finite.
    #[error("invalid {name}: {value} (must be finite and > 0)")]
    InvalidRate {
        /// Which rate was rejected
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A deficit is NaN or infinite.
    #[error("invalid deficit for class '{class}': {value}")]
    InvalidDeficit {
        /// Class carrying the deficit
        class: String,
        /// The rejected value
        value: f64,
    },

    /// A solved run count is too large to be represented.
    #[error("runs for class '{class}' out of range: {value:e}")]
    RunsOutOfRange {
        /// Class whose count overflowed
        class: String,
        /// The continuous solution
        value: f64,
    },

    /// The linear system could not be solved.
    #[error("solver failed: {0}")]
    Solver(#[from] LuError),

    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration or profile file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration or profile document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for estimator operations.
pub type Result<T> = std::result::Result<T, RunsError>;

impl RunsError {
    /// Returns `true` if the system matrix was singular for the solver used.
    pub fn is_singular(&self) -> bool {
        matches!(self, RunsError::Solver(err) if err.is_singular())
    }

    /// Returns `true` if the caller's inputs were rejected before solving.
    ///
    /// This includes `InputShape`, `InvalidRate`, `InvalidDeficit` and
    /// `RunsOutOfRange`.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RunsError::InputShape(_)
                | RunsError::InvalidRate { .. }
                | RunsError::InvalidDeficit { .. }
                | RunsError::RunsOutOfRange { .. }
        )
    }

    /// Returns `true` if loading or validating a configuration failed.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RunsError::InvalidConfig(_) | RunsError::Io(_) | RunsError::Json(_)
        )
    }
}
