//! Gomory fractional cuts for pure integer programs.
//!
//! A cut is derived from a basic decision row `x_r = Σ a_rj (-v_j) + b_r` with
//! a fractional constant. Its slack `s = Σ -f(a_rj) (-v_j) - f(b_r)` must be
//! non-negative for every integer solution, while the current vertex gives
//! `s = -f(b_r) < 0`, so the fractional optimum is cut off.

use crate::tableau::Tableau;
use crate::variable::Variable;
use pivotlab_core::{Result, fractional_part, is_integral};

/// Gomory cutting-plane statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GomoryStats {
    /// Cuts appended to the tableau.
    pub cuts_generated: usize,
    /// Pivots spent re-optimising after cuts.
    pub reoptimization_pivots: usize,
}

/// A fractional cut ready to be appended as a tableau row.
#[derive(Debug, Clone, PartialEq)]
pub struct GomoryCut {
    /// Row the cut was derived from.
    pub source_row: usize,
    /// Coefficients under the variable columns.
    pub coeffs: Vec<f64>,
    /// Constant of the new row (`-f(b_r)`).
    pub constant: f64,
    /// Slack variable that becomes the row's basic variable.
    pub label: Variable,
}

/// Whether every component is within `epsilon` of an integer.
pub fn is_integer_solution(values: &[f64], epsilon: f64) -> bool {
    values.iter().all(|&v| is_integral(v, epsilon))
}

/// Basic decision row with the largest fractional constant, first on ties.
///
/// Returns `None` when every decision row is already integral.
pub fn select_cut_source_row(tableau: &Tableau, epsilon: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 0..tableau.num_rows() {
        if !tableau.row_label(i).is_decision() {
            continue;
        }
        let f = fractional_part(tableau.constant(i), epsilon);
        if f > epsilon && best.is_none_or(|(_, max)| f > max + epsilon) {
            best = Some((i, f));
        }
    }
    best.map(|(i, _)| i)
}

/// Build the cut derived from `source_row`; `cut_index` numbers its slack.
///
/// Coefficients under blocked (artificial) columns are zero since those
/// variables are fixed at zero.
pub fn build_cut_row(
    tableau: &Tableau,
    source_row: usize,
    cut_index: usize,
    epsilon: f64,
) -> GomoryCut {
    let coeffs = (0..tableau.num_cols())
        .map(|j| {
            if tableau.is_blocked(j) {
                0.0
            } else {
                -fractional_part(tableau.value(source_row, j), epsilon)
            }
        })
        .collect();

    GomoryCut {
        source_row,
        coeffs,
        constant: -fractional_part(tableau.constant(source_row), epsilon),
        label: Variable::Cut(cut_index),
    }
}

/// Copy of `tableau` with the cut inserted just above the objective row.
pub fn append_cut(tableau: &Tableau, cut: &GomoryCut) -> Result<Tableau> {
    let mut next = tableau.clone();
    next.insert_row(cut.coeffs.clone(), cut.constant, cut.label)?;
    Ok(next)
}
