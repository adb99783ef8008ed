//! Compact Jordan-exclusion tableau and the modified Jordan elimination step.
//!
//! Rows hold the basic variables followed by the objective row `Z'`; columns
//! hold the non-basic variables (shown as `-v`) followed by the constant
//! column `1`. Each constraint row reads
//!
//! ```text
//! basic = Σ a_j · (-v_j) + b
//! ```
//!
//! so a pivot exchanges one basic and one non-basic variable without ever
//! materialising the identity block of a full simplex tableau.
#![allow(clippy::needless_range_loop)] // Tableau algorithms use explicit indexing

use crate::variable::Variable;
use pivotlab_core::{PivotError, Result, TableSnapshot};
use rustc_hash::{FxHashMap, FxHashSet};

/// Labelled simplex tableau.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    cells: Vec<Vec<f64>>,
    row_labels: Vec<Variable>,
    col_labels: Vec<Variable>,
}

impl Tableau {
    /// Build a tableau, checking its shape and labelling.
    ///
    /// The last row must be labelled [`Variable::Objective`], the last column
    /// [`Variable::Constant`], and no variable may label both a row and a column.
    pub fn new(
        cells: Vec<Vec<f64>>,
        row_labels: Vec<Variable>,
        col_labels: Vec<Variable>,
    ) -> Result<Self> {
        if cells.len() < 2 || cells.len() != row_labels.len() {
            return Err(PivotError::invalid(format!(
                "tableau needs at least one constraint row and one label per row, got {} rows and {} labels",
                cells.len(),
                row_labels.len()
            )));
        }
        let width = col_labels.len();
        if width < 2 || cells.iter().any(|row| row.len() != width) {
            return Err(PivotError::invalid(
                "every tableau row needs one cell per column label",
            ));
        }
        if row_labels.last() != Some(&Variable::Objective)
            || col_labels.last() != Some(&Variable::Constant)
        {
            return Err(PivotError::invalid(
                "the objective row and the constant column must come last",
            ));
        }

        let structural_rows = &row_labels[..row_labels.len() - 1];
        let structural_cols = &col_labels[..width - 1];
        let mut seen = FxHashSet::default();
        for label in structural_rows.iter().chain(structural_cols) {
            if !label.is_structural() || !seen.insert(*label) {
                return Err(PivotError::invalid(format!(
                    "variable {} labels more than one row or column",
                    label
                )));
            }
        }

        Ok(Self {
            cells,
            row_labels,
            col_labels,
        })
    }

    /// Number of constraint rows (the objective row excluded).
    pub fn num_rows(&self) -> usize {
        self.cells.len() - 1
    }

    /// Number of variable columns (the constant column excluded).
    pub fn num_cols(&self) -> usize {
        self.col_labels.len() - 1
    }

    /// Index of the objective row.
    pub fn objective_row(&self) -> usize {
        self.num_rows()
    }

    /// Index of the constant column.
    pub fn constant_col(&self) -> usize {
        self.num_cols()
    }

    /// Cell value.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.cells[row][col]
    }

    /// Constant (free term) of a row.
    pub fn constant(&self, row: usize) -> f64 {
        self.cells[row][self.constant_col()]
    }

    /// Objective-row coefficient of a variable column.
    pub fn objective_coeff(&self, col: usize) -> f64 {
        self.cells[self.objective_row()][col]
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }

    /// Row labels, objective row last.
    pub fn row_labels(&self) -> &[Variable] {
        &self.row_labels
    }

    /// Column labels, constant column last.
    pub fn col_labels(&self) -> &[Variable] {
        &self.col_labels
    }

    /// Basic variable of a row.
    pub fn row_label(&self, row: usize) -> Variable {
        self.row_labels[row]
    }

    /// Non-basic variable of a column.
    pub fn col_label(&self, col: usize) -> Variable {
        self.col_labels[col]
    }

    /// Whether a column may never enter the basis.
    pub fn is_blocked(&self, col: usize) -> bool {
        self.col_labels[col].is_artificial()
    }

    /// Optimal value `Z'` of the internal maximisation: the negated objective constant.
    pub fn internal_objective(&self) -> f64 {
        -self.constant(self.objective_row())
    }

    /// Map from non-basic variable to its column.
    pub fn column_index(&self) -> FxHashMap<Variable, usize> {
        self.col_labels[..self.num_cols()]
            .iter()
            .enumerate()
            .map(|(j, v)| (*v, j))
            .collect()
    }

    /// Row of a basic variable, if it is basic.
    pub fn row_of(&self, variable: Variable) -> Option<usize> {
        self.row_labels[..self.num_rows()]
            .iter()
            .position(|v| *v == variable)
    }

    /// Current value of a variable: its row constant if basic, else zero.
    pub fn variable_value(&self, variable: Variable) -> f64 {
        self.row_of(variable).map_or(0.0, |row| self.constant(row))
    }

    /// Number of constraint rows whose constant is below `-epsilon`.
    pub fn count_negative_constants(&self, epsilon: f64) -> usize {
        (0..self.num_rows())
            .filter(|&i| self.constant(i) < -epsilon)
            .count()
    }

    /// Modified Jordan elimination at `(r, s)`.
    ///
    /// Returns a new tableau in which the pivot cell becomes `1/p`, the pivot
    /// row `a_rj/p`, the pivot column `-a_is/p` and every other cell
    /// `a_ij - a_is·a_rj/p`; the row and column labels are exchanged. Pivoting
    /// the result at the same cell restores the original.
    pub fn pivot(&self, r: usize, s: usize, epsilon: f64) -> Result<Tableau> {
        if r >= self.num_rows() || s >= self.num_cols() {
            return Err(PivotError::invalid(format!(
                "pivot ({}, {}) lies outside the variable part of the tableau",
                r, s
            )));
        }
        let p = self.cells[r][s];
        if p.abs() < epsilon {
            return Err(PivotError::PivotZero {
                row: r,
                column: s,
                value: p,
            });
        }

        let rows = self.cells.len();
        let cols = self.col_labels.len();
        let mut cells = vec![vec![0.0; cols]; rows];
        for i in 0..rows {
            for j in 0..cols {
                cells[i][j] = if i == r && j == s {
                    1.0 / p
                } else if i == r {
                    self.cells[r][j] / p
                } else if j == s {
                    -self.cells[i][s] / p
                } else {
                    self.cells[i][j] - self.cells[i][s] * self.cells[r][j] / p
                };
            }
        }

        let mut row_labels = self.row_labels.clone();
        let mut col_labels = self.col_labels.clone();
        std::mem::swap(&mut row_labels[r], &mut col_labels[s]);

        Ok(Tableau {
            cells,
            row_labels,
            col_labels,
        })
    }

    /// Insert a constraint row just above the objective row.
    pub fn insert_row(&mut self, coeffs: Vec<f64>, constant: f64, label: Variable) -> Result<()> {
        if coeffs.len() != self.num_cols() {
            return Err(PivotError::invalid(format!(
                "new row has {} coefficients, expected {}",
                coeffs.len(),
                self.num_cols()
            )));
        }
        if !label.is_structural()
            || self.row_labels.contains(&label)
            || self.col_labels.contains(&label)
        {
            return Err(PivotError::invalid(format!(
                "variable {} already labels the tableau",
                label
            )));
        }
        let mut row = coeffs;
        row.push(constant);
        let at = self.objective_row();
        self.cells.insert(at, row);
        self.row_labels.insert(at, label);
        Ok(())
    }

    /// Copy of the tableau with the objective row replaced.
    ///
    /// `row` holds one coefficient per variable column followed by the constant.
    pub fn with_objective_row(&self, row: Vec<f64>) -> Result<Tableau> {
        if row.len() != self.col_labels.len() {
            return Err(PivotError::invalid(format!(
                "objective row has {} cells, expected {}",
                row.len(),
                self.col_labels.len()
            )));
        }
        let mut next = self.clone();
        let at = next.objective_row();
        next.cells[at] = row;
        Ok(next)
    }

    /// Point-in-time copy for the protocol.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::new(
            self.row_labels.iter().map(Variable::name).collect(),
            self.col_labels.iter().map(Variable::column_header).collect(),
            self.cells.clone(),
        )
    }
}
