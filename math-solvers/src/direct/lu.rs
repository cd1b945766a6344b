//! LU decomposition solvers
//!
//! Two dense LU paths are provided:
//! - [`doolittle_solve`]: Doolittle factorization without pivoting, split into
//!   [`doolittle_decompose`], [`forward_substitute`] and [`backward_substitute`].
//!   This is the fast path for systems whose leading principal minors are all
//!   non-zero (e.g. diagonally dominant matrices).
//! - [`lu_solve`]: factorization with partial pivoting for general matrices.

use crate::error::{LuError, Result};
use ndarray::{Array1, Array2};
use num_traits::Float;

/// Pivot magnitude below which the pivoting factorization reports a singular matrix
const PIVOT_THRESHOLD: f64 = 1e-30;

fn check_square<T>(a: &Array2<T>) -> Result<usize> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(LuError::NotSquare { rows, cols });
    }
    Ok(rows)
}

fn check_len<T>(v: &Array1<T>, expected: usize) -> Result<()> {
    if v.len() != expected {
        return Err(LuError::DimensionMismatch {
            expected,
            got: v.len(),
        });
    }
    Ok(())
}

/// A pivot is usable when it is finite and not exactly zero
fn usable_pivot<T: Float>(u_ii: T) -> bool {
    u_ii != T::zero() && u_ii.is_finite()
}

/// Doolittle LU decomposition without pivoting
///
/// Returns `(L, U)` where `L` is unit lower triangular, `U` is upper
/// triangular and `L * U = A`.
///
/// No rows are exchanged, so every leading principal minor of `A` must be
/// non-zero. A zero pivot that would be divided by is reported as
/// [`LuError::SingularMatrix`].
pub fn doolittle_decompose<T: Float>(a: &Array2<T>) -> Result<(Array2<T>, Array2<T>)> {
    let n = check_square(a)?;

    let mut l = Array2::<T>::zeros((n, n));
    let mut u = Array2::<T>::zeros((n, n));

    for i in 0..n {
        for j in i..n {
            let mut sum = a[[i, j]];
            for k in 0..i {
                sum = sum - l[[i, k]] * u[[k, j]];
            }
            u[[i, j]] = sum;
        }

        l[[i, i]] = T::one();

        let u_ii = u[[i, i]];
        for j in (i + 1)..n {
            if !usable_pivot(u_ii) {
                return Err(LuError::SingularMatrix { index: i });
            }
            let mut sum = a[[j, i]];
            for k in 0..i {
                sum = sum - l[[j, k]] * u[[k, i]];
            }
            l[[j, i]] = sum / u_ii;
        }
    }

    log::trace!("Doolittle decomposition of {}x{} matrix done", n, n);

    Ok((l, u))
}

/// Solve `L y = b` for unit lower triangular `L`
///
/// The diagonal of `L` is assumed to be one and is never read.
pub fn forward_substitute<T: Float>(l: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>> {
    let n = check_square(l)?;
    check_len(b, n)?;

    let mut y = Array1::<T>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum = sum - l[[i, j]] * y[j];
        }
        y[i] = sum;
    }
    Ok(y)
}

/// Solve `U x = y` for upper triangular `U`
pub fn backward_substitute<T: Float>(u: &Array2<T>, y: &Array1<T>) -> Result<Array1<T>> {
    let n = check_square(u)?;
    check_len(y, n)?;

    let mut x = Array1::<T>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum = sum - u[[i, j]] * x[j];
        }
        let u_ii = u[[i, i]];
        if !usable_pivot(u_ii) {
            return Err(LuError::SingularMatrix { index: i });
        }
        x[i] = sum / u_ii;
    }
    Ok(x)
}

/// Solve `A x = b` with the Doolittle factorization (no pivoting)
///
/// Any non-finite component in the result is reported as an error rather
/// than returned.
pub fn doolittle_solve<T: Float>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>> {
    let n = check_square(a)?;
    check_len(b, n)?;

    let (l, u) = doolittle_decompose(a)?;
    let y = forward_substitute(&l, b)?;
    let x = backward_substitute(&u, &y)?;

    ensure_finite(&x)?;
    Ok(x)
}

fn ensure_finite<T: Float>(x: &Array1<T>) -> Result<()> {
    match x.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(LuError::NonFinite { index }),
        None => Ok(()),
    }
}

/// Row-pivoted LU factors of a square matrix
///
/// `factors` packs both triangles: the strict lower part holds the
/// multipliers of the unit lower factor, the rest holds the upper factor.
#[derive(Debug, Clone)]
pub struct LuFactorization<T> {
    /// Packed lower and upper factors
    pub factors: Array2<T>,
    /// `row_order[i]` is the input row that ended up at position `i`
    pub row_order: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl<T: Float> LuFactorization<T> {
    /// Solve `A x = b` with the stored factors
    ///
    /// The factors can be reused for any number of right-hand sides.
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>> {
        check_len(b, self.n)?;
        let f = &self.factors;

        let mut x = Array1::from_shape_fn(self.n, |i| b[self.row_order[i]]);

        for i in 1..self.n {
            let dot = (0..i).fold(T::zero(), |acc, j| acc + f[[i, j]] * x[j]);
            x[i] = x[i] - dot;
        }

        for i in (0..self.n).rev() {
            let dot = ((i + 1)..self.n).fold(T::zero(), |acc, j| acc + f[[i, j]] * x[j]);
            let u_ii = f[[i, i]];
            if !usable_pivot(u_ii) {
                return Err(LuError::SingularMatrix { index: i });
            }
            x[i] = (x[i] - dot) / u_ii;
        }

        ensure_finite(&x)?;
        Ok(x)
    }
}

/// Row at or below `col` with the largest magnitude in column `col`
fn largest_in_column<T: Float>(m: &Array2<T>, col: usize) -> (usize, T) {
    (col..m.nrows())
        .map(|r| (r, m[[r, col]].abs()))
        .fold((col, T::zero()), |best, cand| {
            if cand.1 > best.1 || cand.1.is_nan() { cand } else { best }
        })
}

/// LU factorization with partial (row) pivoting
///
/// Fails with [`LuError::SingularMatrix`] when no usable pivot of magnitude
/// at least 1e-30 is left in a column.
pub fn lu_factorize<T: Float>(a: &Array2<T>) -> Result<LuFactorization<T>> {
    let n = check_square(a)?;
    let threshold = T::from(PIVOT_THRESHOLD).unwrap_or_else(T::epsilon);

    let mut factors = a.clone();
    let mut row_order: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let (pivot_row, magnitude) = largest_in_column(&factors, k);
        if magnitude.is_nan() || magnitude < threshold {
            return Err(LuError::SingularMatrix { index: k });
        }

        if pivot_row != k {
            for j in 0..n {
                factors.swap([k, j], [pivot_row, j]);
            }
            row_order.swap(k, pivot_row);
            log::trace!("row {} pivoted up to {}", pivot_row, k);
        }

        let pivot = factors[[k, k]];
        for i in (k + 1)..n {
            let l_ik = factors[[i, k]] / pivot;
            factors[[i, k]] = l_ik;
            for j in (k + 1)..n {
                factors[[i, j]] = factors[[i, j]] - l_ik * factors[[k, j]];
            }
        }
    }

    Ok(LuFactorization {
        factors,
        row_order,
        n,
    })
}

/// Factorize with partial pivoting and solve `A x = b` in one call
pub fn lu_solve<T: Float>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>> {
    let factorization = lu_factorize(a)?;
    factorization.solve(b)
}

/// Infinity norm of the residual `A x - b`
pub fn max_residual<T: Float>(a: &Array2<T>, x: &Array1<T>, b: &Array1<T>) -> Result<T> {
    let n = check_square(a)?;
    check_len(x, n)?;
    check_len(b, n)?;

    let mut worst = T::zero();
    for i in 0..n {
        let mut ax_i = T::zero();
        for j in 0..n {
            ax_i = ax_i + a[[i, j]] * x[j];
        }
        worst = worst.max((ax_i - b[i]).abs());
    }
    Ok(worst)
}
