//! Small dense-matrix helpers for the UCB selector.
//!
//! The covariance accumulator is a fixed 12x12 matrix, so a hand-rolled
//! Gauss-Jordan inversion is adequate. Near-singular pivots are skipped
//! rather than reported: a degraded inverse keeps the selector available
//! when accumulated history is poorly conditioned.

const PIVOT_EPSILON: f64 = 1e-10;

/// Invert a square matrix via Gauss-Jordan elimination with partial
/// pivoting. Columns whose best remaining pivot falls below epsilon are
/// skipped, leaving those rows of the result as whatever the elimination
/// has produced so far.
#[must_use]
pub fn invert(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = matrix.len();
    // Augmented [M | I].
    let mut aug: Vec<Vec<f64>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut out = row.clone();
            out.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            out
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|a, b| {
                aug[*a][col]
                    .abs()
                    .partial_cmp(&aug[*b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if aug[pivot_row][col].abs() < PIVOT_EPSILON {
            continue;
        }

        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        for v in &mut aug[col] {
            *v /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..2 * n {
                aug[row][k] -= factor * aug[col][k];
            }
        }
    }

    aug.into_iter().map(|row| row[n..].to_vec()).collect()
}

/// Compute `x' M x` for a square matrix and a vector of matching length.
#[must_use]
pub fn quadratic_form(x: &[f64], matrix: &[Vec<f64>]) -> f64 {
    matrix
        .iter()
        .zip(x)
        .map(|(row, xi)| xi * row.iter().zip(x).map(|(m, xj)| m * xj).sum::<f64>())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect()
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identity_inverts_to_identity() {
        let inv = invert(&identity(12));
        for (i, row) in inv.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                assert!(approx_eq(*v, if i == j { 1.0 } else { 0.0 }));
            }
        }
    }

    #[test]
    fn inverts_small_well_conditioned_matrix() {
        let m = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
        let inv = invert(&m);
        assert!(approx_eq(inv[0][0], 0.6));
        assert!(approx_eq(inv[0][1], -0.7));
        assert!(approx_eq(inv[1][0], -0.2));
        assert!(approx_eq(inv[1][1], 0.4));
    }

    #[test]
    fn singular_matrix_degrades_without_panicking() {
        let m = vec![
            vec![1.0, 2.0, 3.0],
            vec![2.0, 4.0, 6.0],
            vec![0.0, 0.0, 0.0],
        ];
        let inv = invert(&m);
        assert_eq!(inv.len(), 3);
        for row in &inv {
            assert!(row.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn quadratic_form_with_identity_is_dot_product() {
        let x = vec![1.0, 2.0, 3.0];
        let q = quadratic_form(&x, &identity(3));
        assert!(approx_eq(q, 14.0));
    }

    #[test]
    fn quadratic_form_general_matrix() {
        let x = vec![1.0, 2.0];
        let m = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        // x'Mx = 2 + 2 + 2 + 12 = 18
        assert!(approx_eq(quadratic_form(&x, &m), 18.0));
    }
}
