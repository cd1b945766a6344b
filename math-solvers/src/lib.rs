//! Dense direct solvers for small linear systems
//!
//! This crate provides LU-based solvers for dense square systems `A x = b`
//! stored as [`ndarray`] arrays, generic over real floating point scalars.
//!
//! # Features
//!
//! - **Doolittle LU** without pivoting, exposed step by step
//!   (decompose, forward substitution, backward substitution)
//! - **Partial-pivoting LU** for general non-singular matrices
//! - Zero pivots and overflow are reported as [`LuError`], never as NaN/Inf
//!
//! # Example
//!
//! ```
//! use math_runs_solvers::doolittle_solve;
//! use ndarray::array;
//!
//! let a = array![[4.0_f64, 1.0], [1.0, 3.0]];
//! let b = array![1.0_f64, 2.0];
//!
//! let x = doolittle_solve(&a, &b).unwrap();
//! assert!((4.0 * x[0] + x[1] - 1.0).abs() < 1e-12);
//! ```

pub mod direct;
pub mod error;

pub use direct::{
    LuFactorization, backward_substitute, doolittle_decompose, doolittle_solve,
    forward_substitute, lu_factorize, lu_solve, max_residual,
};
pub use error::{LuError, Result};
