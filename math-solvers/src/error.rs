//! Error types for the dense solvers.

use thiserror::Error;

/// Errors that can occur during LU factorization and substitution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    /// A pivot is zero (or too small for the pivoting path), so the system
    /// cannot be solved with this factorization.
    #[error("matrix is singular: zero pivot at row {index}")]
    SingularMatrix {
        /// Row of the offending pivot
        index: usize,
    },

    /// The coefficient matrix is not square.
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// A vector does not match the matrix dimension.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Matrix dimension
        expected: usize,
        /// Vector length provided
        got: usize,
    },

    /// The solution overflowed or is otherwise not a finite number.
    #[error("solution component {index} is not finite")]
    NonFinite {
        /// Index of the first non-finite component
        index: usize,
    },
}

/// A specialized `Result` type for solver operations.
pub type Result<T> = std::result::Result<T, LuError>;

impl LuError {
    /// Returns `true` if the matrix could not be factorized or inverted.
    ///
    /// This includes `SingularMatrix` and `NonFinite`.
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            LuError::SingularMatrix { .. } | LuError::NonFinite { .. }
        )
    }

    /// Returns `true` if the inputs were rejected before any arithmetic.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            LuError::NotSquare { .. } | LuError::DimensionMismatch { .. }
        )
    }
}
