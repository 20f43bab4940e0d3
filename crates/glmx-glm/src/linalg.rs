//! Normal equations of the IRLS step, solved through nalgebra's Cholesky.

use crate::{GlmError, Result};
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

/// Weighted cross products XᵀWX and XᵀWz.
pub(crate) fn weighted_normal_equations(
    rows: &[Vec<f64>],
    w: &[f64],
    z: &[f64],
    p: usize,
) -> (DMatrix<f64>, DVector<f64>) {
    let x = DMatrix::from_fn(rows.len(), p, |i, j| rows[i][j]);
    let xtw = DMatrix::from_fn(p, rows.len(), |j, i| rows[i][j] * w[i]);
    let xtwx = &xtw * &x;
    let xtwz = &xtw * DVector::from_column_slice(z);
    (xtwx, xtwz)
}

/// Cholesky factor of a symmetric positive-definite matrix.
///
/// nalgebra accepts a zero pivot, so near-singular systems are caught with a
/// relative check on each pivot against the original diagonal.
pub(crate) fn factor(a: DMatrix<f64>) -> Result<Cholesky<f64, Dyn>> {
    let diag = a.diagonal();
    let chol = a.cholesky().ok_or(GlmError::Singular)?;
    let l = chol.l_dirty();
    for (j, ajj) in diag.iter().enumerate() {
        let ljj = l[(j, j)];
        if !(ljj.is_finite() && ljj * ljj > ajj.abs() * 1e-12) {
            return Err(GlmError::Singular);
        }
    }
    Ok(chol)
}

/// Solve `a x = b` for symmetric positive-definite `a`.
pub(crate) fn solve_spd(a: DMatrix<f64>, b: &DVector<f64>) -> Result<Vec<f64>> {
    Ok(factor(a)?.solve(b).iter().copied().collect())
}

/// Inverse of a symmetric positive-definite matrix.
pub(crate) fn inverse_spd(a: DMatrix<f64>) -> Result<DMatrix<f64>> {
    Ok(factor(a)?.inverse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_spd_system() {
        let a = DMatrix::from_row_slice(3, 3, &[4.0, 2.0, 0.6, 2.0, 5.0, 1.0, 0.6, 1.0, 3.0]);
        let expected = DVector::from_column_slice(&[1.0, -2.0, 0.5]);
        let b = &a * &expected;

        let x = solve_spd(a, &b).unwrap();
        for (got, want) in x.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inverse_of_two_by_two() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let inv = inverse_spd(a).unwrap();
        assert_relative_eq!(inv[(0, 0)], 0.6, epsilon = 1e-12);
        assert_relative_eq!(inv[(0, 1)], -0.2, epsilon = 1e-12);
        assert_relative_eq!(inv[(1, 0)], -0.2, epsilon = 1e-12);
        assert_relative_eq!(inv[(1, 1)], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix_rejected() {
        // Zero pivot: accepted by the factorisation itself
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(matches!(factor(a), Err(GlmError::Singular)));

        // Negative pivot
        let b = DMatrix::from_row_slice(2, 2, &[1.0, 3.0, 3.0, 4.0]);
        assert!(matches!(factor(b), Err(GlmError::Singular)));
    }

    #[test]
    fn test_normal_equations() {
        let rows = vec![vec![1.0, 2.0], vec![1.0, -1.0], vec![1.0, 0.5]];
        let (xtwx, xtwz) = weighted_normal_equations(&rows, &[1.0, 2.0, 0.5], &[1.0, 1.0, 1.0], 2);
        assert_eq!(xtwx[(0, 1)], xtwx[(1, 0)]);
        assert_relative_eq!(xtwx[(0, 0)], 3.5);
        assert_relative_eq!(xtwz[1], 2.0 - 2.0 + 0.25);
    }
}
