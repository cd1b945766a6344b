//! Direct solvers for linear systems
//!
//! This module provides direct (non-iterative) solvers:
//! - [`doolittle_solve`]: LU decomposition without pivoting
//! - [`lu_solve`]: LU decomposition with partial pivoting

mod lu;

pub use lu::{
    LuFactorization, backward_substitute, doolittle_decompose, doolittle_solve,
    forward_substitute, lu_factorize, lu_solve, max_residual,
};
