//! Ordinary least squares without intercept.
//!
//! The regression overlay solves
//!
//! ```text
//! minimize Σ_t (y_t - x_t^T β)^2
//! ```
//!
//! where each column of `X` is a (peer or self-lagged) infection series. Peer
//! series are often strongly collinear, so we solve via SVD with a tolerance
//! ladder instead of the normal equations.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly or
/// the shapes disagree.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() == 0 || x.ncols() == 0 {
        return None;
    }

    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Build a design matrix from feature columns of equal length.
pub fn design_matrix(columns: &[Vec<f64>]) -> Option<DMatrix<f64>> {
    let nrows = columns.first()?.len();
    if columns.iter().any(|c| c.len() != nrows) {
        return None;
    }
    Some(DMatrix::from_fn(nrows, columns.len(), |r, c| columns[c][r]))
}
