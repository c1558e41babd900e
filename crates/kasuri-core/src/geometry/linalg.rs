use ndarray::{Array1, Array2};

/// Solve a square linear system given as an n x (n+1) augmented matrix
/// `[A | b]` using Gaussian elimination with partial pivoting.
///
/// Returns `None` when the matrix shape is not n x (n+1) or when a pivot's
/// magnitude falls below `pivot_epsilon` (singular or ill-conditioned system).
pub fn solve_augmented(mut m: Array2<f64>, pivot_epsilon: f64) -> Option<Array1<f64>> {
    let n = m.nrows();
    if n == 0 || m.ncols() != n + 1 {
        return None;
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| m[[a, col]].abs().total_cmp(&m[[b, col]].abs()))
            .unwrap_or(col);

        if pivot_row != col {
            for k in 0..=n {
                m.swap([col, k], [pivot_row, k]);
            }
        }

        let pivot = m[[col, col]];
        if !pivot.is_finite() || pivot.abs() < pivot_epsilon {
            return None;
        }

        for row in col + 1..n {
            let factor = m[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                m[[row, k]] -= factor * m[[col, k]];
            }
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut sum = 0.0;
        for k in row + 1..n {
            sum += m[[row, k]] * x[k];
        }
        x[row] = (m[[row, n]] - sum) / m[[row, row]];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn solves_two_by_two() {
        // x + y = 3, 2x - y = 0
        let m = array![[1.0, 1.0, 3.0], [2.0, -1.0, 0.0]];
        let x = solve_augmented(m, 1e-10).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        // 0x + y = 1, x + 0y = 2
        let m = array![[0.0, 1.0, 1.0], [1.0, 0.0, 2.0]];
        let x = solve_augmented(m, 1e-10).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn singular_system_fails() {
        let m = array![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0]];
        assert!(solve_augmented(m, 1e-10).is_none());
    }

    #[test]
    fn wrong_shape_fails() {
        let m = Array2::<f64>::zeros((3, 3));
        assert!(solve_augmented(m, 1e-10).is_none());
    }
}
