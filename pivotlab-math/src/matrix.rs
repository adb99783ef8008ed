//! Dense row-major matrix helpers.
#![allow(clippy::needless_range_loop)] // Matrix algorithms use explicit indexing

use num_traits::{Float, ToPrimitive, Zero};
use pivotlab_core::{PivotError, Result};
use std::ops::{Add, Mul};

/// Row-major dense matrix.
pub type Matrix<T> = Vec<Vec<T>>;

/// Check that a matrix is non-empty and rectangular, returning `(rows, cols)`.
pub fn dimensions<T>(matrix: &[Vec<T>]) -> Result<(usize, usize)> {
    let rows = matrix.len();
    if rows == 0 {
        return Err(PivotError::invalid("matrix has no rows"));
    }
    let cols = matrix[0].len();
    if cols == 0 {
        return Err(PivotError::invalid("matrix has no columns"));
    }
    if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != cols) {
        return Err(PivotError::invalid(format!(
            "row {} has {} entries, expected {}",
            i + 1,
            row.len(),
            cols
        )));
    }
    Ok((rows, cols))
}

/// Check that a matrix is square, returning its order.
pub fn require_square<T>(matrix: &[Vec<T>]) -> Result<usize> {
    let (rows, cols) = dimensions(matrix)?;
    if rows != cols {
        return Err(PivotError::invalid(format!(
            "matrix must be square, got {}x{}",
            rows, cols
        )));
    }
    Ok(rows)
}

/// Reject NaN and infinite entries.
pub fn require_finite<T: Float>(matrix: &[Vec<T>]) -> Result<()> {
    for (i, row) in matrix.iter().enumerate() {
        if let Some(j) = row.iter().position(|v| !v.is_finite()) {
            return Err(PivotError::invalid(format!(
                "entry ({}, {}) is not a finite number",
                i + 1,
                j + 1
            )));
        }
    }
    Ok(())
}

/// Identity matrix of order `n`.
pub fn identity<T: Float>(n: usize) -> Matrix<T> {
    let mut result = vec![vec![T::zero(); n]; n];
    for i in 0..n {
        result[i][i] = T::one();
    }
    result
}

/// Matrix-vector product.
pub fn mat_vec<T>(matrix: &[Vec<T>], vec: &[T]) -> Result<Vec<T>>
where
    T: Copy + Add<Output = T> + Mul<Output = T> + Zero,
{
    let (_, cols) = dimensions(matrix)?;
    if cols != vec.len() {
        return Err(PivotError::invalid(format!(
            "matrix has {} columns but the vector has {} entries",
            cols,
            vec.len()
        )));
    }

    Ok(matrix
        .iter()
        .map(|row| {
            row.iter()
                .zip(vec)
                .fold(T::zero(), |sum, (&a, &x)| sum + a * x)
        })
        .collect())
}

/// Matrix-matrix product.
pub fn multiply<T>(a: &[Vec<T>], b: &[Vec<T>]) -> Result<Matrix<T>>
where
    T: Copy + Add<Output = T> + Mul<Output = T> + Zero,
{
    let (rows_a, cols_a) = dimensions(a)?;
    let (rows_b, cols_b) = dimensions(b)?;
    if cols_a != rows_b {
        return Err(PivotError::invalid(format!(
            "cannot multiply {}x{} by {}x{}",
            rows_a, cols_a, rows_b, cols_b
        )));
    }

    // Transpose B for row-wise access
    let b_t = transpose(b);
    let mut result = vec![vec![T::zero(); cols_b]; rows_a];
    for i in 0..rows_a {
        for j in 0..cols_b {
            result[i][j] = a[i]
                .iter()
                .zip(&b_t[j])
                .fold(T::zero(), |sum, (&x, &y)| sum + x * y);
        }
    }
    Ok(result)
}

/// Transpose a matrix.
pub fn transpose<T: Copy>(matrix: &[Vec<T>]) -> Matrix<T> {
    let Some(first) = matrix.first() else {
        return Vec::new();
    };
    (0..first.len())
        .map(|j| matrix.iter().map(|row| row[j]).collect())
        .collect()
}

/// Append the columns of `right` to `left`.
pub fn augment<T: Copy>(left: &[Vec<T>], right: &[Vec<T>]) -> Result<Matrix<T>> {
    if left.len() != right.len() {
        return Err(PivotError::invalid(format!(
            "cannot augment {} rows with {} rows",
            left.len(),
            right.len()
        )));
    }
    Ok(left
        .iter()
        .zip(right)
        .map(|(l, r)| l.iter().chain(r).copied().collect())
        .collect())
}

/// Whether two matrices agree entry-wise within `tolerance`.
pub fn approx_eq_matrix<T: Float>(a: &[Vec<T>], b: &[Vec<T>], tolerance: T) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(ra, rb)| {
            ra.len() == rb.len() && ra.iter().zip(rb).all(|(&x, &y)| (x - y).abs() <= tolerance)
        })
}

/// Lossy conversion to `f64` for protocol snapshots.
pub fn to_f64_matrix<T: ToPrimitive>(matrix: &[Vec<T>]) -> Matrix<f64> {
    matrix
        .iter()
        .map(|row| row.iter().map(|v| v.to_f64().unwrap_or(f64::NAN)).collect())
        .collect()
}
