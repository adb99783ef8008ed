//! Property-based tests for Gauss-Jordan elimination
//!
//! This module tests:
//! - `A * A^-1 = I` for non-singular matrices
//! - Rank bounds and special cases
//! - Solutions satisfy `A x = b`

use pivotlab_core::NullProtocol;
use pivotlab_math::matrix::approx_eq_matrix;
use pivotlab_math::{GaussJordan, identity, mat_vec, multiply};
use proptest::prelude::*;

/// Strategy for small integer-valued entries
fn entry_strategy() -> impl Strategy<Value = f64> {
    (-9i32..=9).prop_map(f64::from)
}

/// Strategy for a rectangular matrix
fn matrix_strategy(max_rows: usize, max_cols: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(entry_strategy(), cols), rows)
    })
}

/// Strategy for a strictly diagonally dominant (hence non-singular) square matrix
fn nonsingular_strategy(max_n: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1..=max_n).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(entry_strategy(), n), n).prop_map(|mut m| {
            let n = m.len();
            for i in 0..n {
                let off: f64 = (0..n).filter(|&j| j != i).map(|j| m[i][j].abs()).sum();
                m[i][i] = off + 1.0 + m[i][i].abs();
            }
            m
        })
    })
}

#[cfg(test)]
mod inverse_properties {
    use super::*;

    proptest! {
        /// Test that the inverse of a non-singular matrix is a two-sided inverse
        #[test]
        fn inverse_round_trip(a in nonsingular_strategy(5)) {
            let gj = GaussJordan::new();
            let inv = gj.inverse(&a, &mut NullProtocol).unwrap();
            let n = a.len();

            let left = multiply(&inv, &a).unwrap();
            let right = multiply(&a, &inv).unwrap();
            prop_assert!(approx_eq_matrix(&right, &identity(n), 1e-6));
            prop_assert!(approx_eq_matrix(&left, &identity(n), 1e-6));
        }

        /// Test that a successful solve satisfies the system
        #[test]
        fn solve_satisfies_system(
            a in nonsingular_strategy(5),
            seed in prop::collection::vec(entry_strategy(), 5)
        ) {
            let b: Vec<f64> = seed.into_iter().take(a.len()).collect();
            let x = GaussJordan::new().solve(&a, &b, &mut NullProtocol).unwrap();
            let ax = mat_vec(&a, &x).unwrap();
            for (lhs, rhs) in ax.iter().zip(&b) {
                prop_assert!((lhs - rhs).abs() < 1e-6);
            }
        }
    }
}

#[cfg(test)]
mod rank_properties {
    use super::*;

    proptest! {
        /// Test that rank is bounded by the smaller dimension
        #[test]
        fn rank_is_bounded(a in matrix_strategy(5, 5)) {
            let rank = GaussJordan::new().rank(&a, &mut NullProtocol).unwrap();
            prop_assert!(rank <= a.len().min(a[0].len()));
        }

        /// Test that transposition preserves rank
        #[test]
        fn rank_of_transpose(a in matrix_strategy(4, 4)) {
            let gj = GaussJordan::new();
            let r = gj.rank(&a, &mut NullProtocol).unwrap();
            let rt = gj.rank(&pivotlab_math::transpose(&a), &mut NullProtocol).unwrap();
            prop_assert_eq!(r, rt);
        }

        /// Test the identity and all-zero special cases
        #[test]
        fn rank_of_identity_and_zero(n in 1usize..8) {
            let gj = GaussJordan::new();
            let eye: Vec<Vec<f64>> = identity(n);
            prop_assert_eq!(gj.rank(&eye, &mut NullProtocol).unwrap(), n);

            let zero = vec![vec![0.0; n]; n];
            prop_assert_eq!(gj.rank(&zero, &mut NullProtocol).unwrap(), 0);
        }

        /// Test that a duplicated row never adds rank
        #[test]
        fn duplicated_row_keeps_rank(a in matrix_strategy(4, 4)) {
            let gj = GaussJordan::new();
            let r = gj.rank(&a, &mut NullProtocol).unwrap();
            let mut doubled = a.clone();
            doubled.push(a[0].clone());
            prop_assert_eq!(gj.rank(&doubled, &mut NullProtocol).unwrap(), r);
        }
    }
}
