//! Gauss-Jordan elimination with partial pivoting.
//!
//! Every operation records its derivation into a [`ProtocolSink`]: the input,
//! one entry per processed column (pivot choice, row swap, matrix snapshot),
//! and the final result or the reason for failure.
#![allow(clippy::needless_range_loop)] // Matrix algorithms use explicit indexing

use crate::matrix::{self, Matrix};
use num_traits::{Float, ToPrimitive};
use pivotlab_core::{
    EPSILON, PivotError, ProtocolSink, Result, SolverConfig, TableSnapshot, format_number,
};
use tracing::{debug, info};

/// What to do when a column has no usable pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingPivot {
    /// Stop with [`PivotError::SingularMatrix`].
    Fail,
    /// Record the column as skipped and continue.
    Skip,
}

/// Outcome of reducing the leading columns of a matrix.
#[derive(Debug, Clone, Default)]
struct Reduction {
    /// `(row, column)` of every pivot taken, in order.
    pivots: Vec<(usize, usize)>,
    /// Columns without a usable pivot.
    skipped: Vec<usize>,
}

/// Gauss-Jordan engine for inverse, rank and linear solve.
#[derive(Debug, Clone, Copy)]
pub struct GaussJordan {
    epsilon: f64,
    precision: usize,
}

impl Default for GaussJordan {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            precision: 2,
        }
    }
}

impl GaussJordan {
    /// Create an engine with the default tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take tolerance and protocol precision from a solver configuration.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            epsilon: config.epsilon,
            precision: config.precision,
        }
    }

    /// Set the zero tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    fn eps<T: Float>(&self) -> T {
        num_traits::cast(self.epsilon).unwrap_or_else(T::epsilon)
    }

    fn format_value<T: ToPrimitive>(&self, value: T) -> String {
        format_number(value.to_f64().unwrap_or(f64::NAN), self.precision)
    }

    /// Row in `start_row..` with the largest magnitude in `column`.
    ///
    /// Returns `None` when that magnitude is below the tolerance. Ties keep the
    /// topmost row.
    pub fn find_pivot_row<T: Float>(
        &self,
        matrix: &[Vec<T>],
        start_row: usize,
        column: usize,
    ) -> Option<usize> {
        let mut best: Option<(usize, T)> = None;
        for i in start_row..matrix.len() {
            let magnitude = matrix[i].get(column)?.abs();
            if best.is_none_or(|(_, max)| magnitude > max) {
                best = Some((i, magnitude));
            }
        }
        best.filter(|&(_, max)| max >= self.eps())
            .map(|(row, _)| row)
    }

    /// Normalise `pivot_row` and clear `column` in every other row.
    ///
    /// Returns the pivot value. Entries that end up within the tolerance of
    /// zero are stored as exact zeros.
    pub fn eliminate<T: Float>(
        &self,
        matrix: &mut [Vec<T>],
        pivot_row: usize,
        column: usize,
    ) -> Result<T> {
        let pivot = matrix
            .get(pivot_row)
            .and_then(|row| row.get(column))
            .copied()
            .ok_or_else(|| {
                PivotError::invalid(format!(
                    "pivot position ({}, {}) is outside the matrix",
                    pivot_row + 1,
                    column + 1
                ))
            })?;
        if pivot.abs() < self.eps() {
            return Err(PivotError::PivotZero {
                row: pivot_row,
                column,
                value: pivot.to_f64().unwrap_or(f64::NAN),
            });
        }

        for value in matrix[pivot_row].iter_mut() {
            *value = *value / pivot;
        }
        matrix[pivot_row][column] = T::one();

        let normalized = matrix[pivot_row].clone();
        let eps = self.eps();
        for (i, row) in matrix.iter_mut().enumerate() {
            if i == pivot_row {
                continue;
            }
            let factor = row[column];
            if factor.abs() < eps {
                continue;
            }
            for (value, &p) in row.iter_mut().zip(&normalized) {
                *value = *value - factor * p;
                if value.abs() < eps {
                    *value = T::zero();
                }
            }
            row[column] = T::zero();
        }
        Ok(pivot)
    }

    /// Bring the first `columns` columns to reduced row-echelon form.
    fn reduce<T: Float>(
        &self,
        augmented: &mut Matrix<T>,
        columns: usize,
        col_labels: &[String],
        on_missing: MissingPivot,
        sink: &mut dyn ProtocolSink,
    ) -> Result<Reduction> {
        let mut reduction = Reduction::default();
        let mut row = 0;

        for column in 0..columns {
            let step = column + 1;
            if row >= augmented.len() {
                reduction.skipped.push(column);
                sink.paragraph(&format!(
                    "Step #{}: no rows left below the pivots, column {} is skipped.",
                    step, step
                ));
                continue;
            }

            let Some(pivot_row) = self.find_pivot_row(augmented, row, column) else {
                match on_missing {
                    MissingPivot::Fail => {
                        sink.paragraph(&format!(
                            "Step #{}: no non-zero pivot in column {}. The matrix is singular.",
                            step, step
                        ));
                        info!(column, "singular matrix");
                        return Err(PivotError::SingularMatrix { column });
                    }
                    MissingPivot::Skip => {
                        debug!(column, "column skipped");
                        sink.paragraph(&format!(
                            "Step #{}: no non-zero pivot in column {}, the column is skipped.",
                            step, step
                        ));
                        reduction.skipped.push(column);
                        continue;
                    }
                }
            };

            if pivot_row != row {
                augmented.swap(row, pivot_row);
                sink.paragraph(&format!(
                    "Step #{}: rows {} and {} are swapped to bring the largest pivot up.",
                    step,
                    row + 1,
                    pivot_row + 1
                ));
            }

            let pivot = self.eliminate(augmented, row, column).inspect_err(|err| {
                sink.paragraph(&format!("Step #{}: the pivot cannot be taken: {}.", step, err));
            })?;
            debug!(row, column, pivot = pivot.to_f64().unwrap_or(f64::NAN), "Gauss-Jordan step");
            sink.paragraph(&format!(
                "Step #{}: pivot A[{}, {}] = {}.",
                step,
                row + 1,
                step,
                self.format_value(pivot)
            ));
            sink.table(self.snapshot(augmented, col_labels, Some((row, column))));

            reduction.pivots.push((row, column));
            row += 1;
        }
        Ok(reduction)
    }

    fn snapshot<T: ToPrimitive>(
        &self,
        matrix: &[Vec<T>],
        col_labels: &[String],
        pivot: Option<(usize, usize)>,
    ) -> TableSnapshot {
        let cells = matrix::to_f64_matrix(matrix);
        let mut table = TableSnapshot::new(
            (1..=cells.len()).map(|i| i.to_string()).collect(),
            col_labels.to_vec(),
            cells,
        );
        table.pivot = pivot;
        table
    }

    fn record_input<T: Float>(&self, title: &str, a: &[Vec<T>], sink: &mut dyn ProtocolSink) {
        sink.heading(2, title);
        sink.table(TableSnapshot::from_matrix(&matrix::to_f64_matrix(a)).with_caption("Input matrix A:"));
    }

    /// Inverse of a square matrix, eliminating `[A | I]` to `[I | A^-1]`.
    pub fn inverse<T: Float>(&self, a: &[Vec<T>], sink: &mut dyn ProtocolSink) -> Result<Matrix<T>> {
        let n = matrix::require_square(a)
            .and_then(|n| matrix::require_finite(a).map(|()| n))
            .inspect_err(|err| record_rejection(err, sink))?;
        self.record_input("Matrix inverse", a, sink);

        let mut augmented = matrix::augment(a, &matrix::identity(n))?;
        let labels: Vec<String> = (1..=n)
            .map(|j| format!("a{}", j))
            .chain((1..=n).map(|j| format!("e{}", j)))
            .collect();
        self.reduce(&mut augmented, n, &labels, MissingPivot::Fail, sink)?;

        let inverse: Matrix<T> = augmented.into_iter().map(|row| row[n..].to_vec()).collect();
        sink.table(TableSnapshot::from_matrix(&matrix::to_f64_matrix(&inverse)).with_caption("Inverse matrix A^-1:"));
        info!(order = n, "inverse computed");
        Ok(inverse)
    }

    /// Rank of any rectangular matrix; columns without a pivot are skipped.
    pub fn rank<T: Float>(&self, a: &[Vec<T>], sink: &mut dyn ProtocolSink) -> Result<usize> {
        let (_, cols) = matrix::dimensions(a)
            .and_then(|dims| matrix::require_finite(a).map(|()| dims))
            .inspect_err(|err| record_rejection(err, sink))?;
        self.record_input("Matrix rank", a, sink);

        let mut work = a.to_vec();
        let labels: Vec<String> = (1..=cols).map(|j| j.to_string()).collect();
        let reduction = self.reduce(&mut work, cols, &labels, MissingPivot::Skip, sink)?;

        let rank = reduction.pivots.len();
        sink.paragraph(&format!("Rank of the matrix: {}.", rank));
        info!(rank, "rank computed");
        Ok(rank)
    }

    /// Solve `A x = b` by eliminating `[A | b]` to `[I | x]`.
    ///
    /// A rank-deficient system is [`PivotError::InconsistentSystem`] when a
    /// reduced row reads `0 = c` with `c != 0`, and
    /// [`PivotError::SingularMatrix`] when it has infinitely many solutions.
    pub fn solve<T: Float>(&self, a: &[Vec<T>], b: &[T], sink: &mut dyn ProtocolSink) -> Result<Vec<T>> {
        let n = self
            .validate_system(a, b)
            .inspect_err(|err| record_rejection(err, sink))?;
        self.record_input("Linear system", a, sink);
        sink.paragraph(&format!("Right-hand side B: ({}).", self.join(b)));

        let rhs: Matrix<T> = b.iter().map(|&v| vec![v]).collect();
        let mut augmented = matrix::augment(a, &rhs)?;
        let labels: Vec<String> = (1..=n)
            .map(|j| format!("x{}", j))
            .chain(std::iter::once("b".to_string()))
            .collect();
        let reduction = self.reduce(&mut augmented, n, &labels, MissingPivot::Skip, sink)?;

        let rank = reduction.pivots.len();
        if rank < n {
            let eps = self.eps();
            if let Some(row) = (rank..n).find(|&i| augmented[i][n].abs() >= eps) {
                sink.paragraph(&format!(
                    "Row {} reads 0 = {}. The system is inconsistent.",
                    row + 1,
                    self.format_value(augmented[row][n])
                ));
                info!(row, "inconsistent system");
                return Err(PivotError::InconsistentSystem { row });
            }
            let column = reduction.skipped.first().copied().unwrap_or(rank);
            sink.paragraph(&format!(
                "Column {} has no pivot. The system has no unique solution.",
                column + 1
            ));
            info!(column, "singular system");
            return Err(PivotError::SingularMatrix { column });
        }

        let x: Vec<T> = augmented.iter().map(|row| row[n]).collect();
        sink.paragraph(&format!("X = ({}).", self.join(&x)));
        info!(n, "linear system solved");
        Ok(x)
    }

    /// Solve `A x = b` as `x = A^-1 b`, recording both steps.
    pub fn solve_via_inverse<T: Float>(
        &self,
        a: &[Vec<T>],
        b: &[T],
        sink: &mut dyn ProtocolSink,
    ) -> Result<Vec<T>> {
        self.validate_system(a, b)
            .inspect_err(|err| record_rejection(err, sink))?;
        let inverse = self.inverse(a, sink)?;
        let x = matrix::mat_vec(&inverse, b)?;
        sink.heading(2, "Solution X = A^-1 * B");
        sink.paragraph(&format!("B = ({}).", self.join(b)));
        sink.paragraph(&format!("X = ({}).", self.join(&x)));
        Ok(x)
    }

    fn validate_system<T: Float>(&self, a: &[Vec<T>], b: &[T]) -> Result<usize> {
        let n = matrix::require_square(a)?;
        matrix::require_finite(a)?;
        if b.len() != n {
            return Err(PivotError::invalid(format!(
                "right-hand side has {} entries, expected {}",
                b.len(),
                n
            )));
        }
        if b.iter().any(|v| !v.is_finite()) {
            return Err(PivotError::invalid("right-hand side contains a non-finite number"));
        }
        Ok(n)
    }

    fn join<T: ToPrimitive + Copy>(&self, values: &[T]) -> String {
        values
            .iter()
            .map(|&v| self.format_value(v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn record_rejection(err: &PivotError, sink: &mut dyn ProtocolSink) {
    sink.paragraph(&format!("The input is rejected: {}.", err));
    info!(%err, "input rejected");
}
