//! Reading decision values, the objective value and dual values off a terminal tableau.

use crate::tableau::Tableau;
use crate::transform::{AuxRole, CanonicalForm};
use pivotlab_core::{PivotError, Result, format_number, snap_to_zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal artifact of a successful solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    /// Value of each decision variable.
    pub decision_values: Vec<f64>,
    /// Objective value in the original direction.
    pub objective_value: f64,
    /// Shadow price of each constraint, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dual_values: Option<Vec<f64>>,
}

impl SolutionRecord {
    /// Human-readable summary, e.g. `X = (2.00; 6.00)` and `Max(Z) = 36.00`.
    pub fn describe(&self, is_minimize: bool, precision: usize) -> String {
        let join = |values: &[f64]| {
            values
                .iter()
                .map(|&v| format_number(v, precision))
                .collect::<Vec<_>>()
                .join("; ")
        };
        let mut out = format!(
            "X = ({})\n{}(Z) = {}",
            join(&self.decision_values),
            if is_minimize { "Min" } else { "Max" },
            format_number(self.objective_value, precision)
        );
        if let Some(duals) = &self.dual_values {
            out.push_str(&format!("\nU = ({})", join(duals)));
        }
        out
    }
}

impl fmt::Display for SolutionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x = {:?}, z = {}", self.decision_values, self.objective_value)
    }
}

/// Decision values and objective value of a terminal tableau.
///
/// Non-basic decision variables are zero; values within `epsilon` of zero are
/// snapped to exact zero.
pub fn extract_solution(
    tableau: &Tableau,
    num_variables: usize,
    is_minimize: bool,
    epsilon: f64,
) -> SolutionRecord {
    let mut decision_values = vec![0.0; num_variables];
    for i in 0..tableau.num_rows() {
        if let Some(j) = tableau.row_label(i).decision_index()
            && j < num_variables
        {
            decision_values[j] = snap_to_zero(tableau.constant(i), epsilon);
        }
    }

    let internal = tableau.internal_objective();
    let objective_value = snap_to_zero(if is_minimize { -internal } else { internal }, epsilon);

    SolutionRecord {
        decision_values,
        objective_value,
        dual_values: None,
    }
}

/// Shadow price `dZ/db_i` of every original constraint.
///
/// Let `k` be the objective-row coefficient under the column of the
/// constraint's auxiliary variable (zero when that variable is basic). The
/// derivative of the internal maximum `Z'` is `-k` for slack and zero-row
/// columns, `+k` for surplus columns and `-(k + M)` for penalised artificial
/// columns; rows flipped during normalisation and minimisation each negate it.
pub fn extract_duals(tableau: &Tableau, form: &CanonicalForm, epsilon: f64) -> Vec<f64> {
    let columns = tableau.column_index();
    form.aux
        .iter()
        .map(|aux| {
            let Some(&col) = columns.get(&aux.variable) else {
                return 0.0;
            };
            let k = tableau.objective_coeff(col);
            let mut derivative = match aux.role {
                AuxRole::Slack | AuxRole::ZeroRow => -k,
                AuxRole::Surplus => k,
                AuxRole::Penalized => -(k + form.big_m),
            };
            if aux.flipped {
                derivative = -derivative;
            }
            if form.is_minimize {
                derivative = -derivative;
            }
            snap_to_zero(derivative, epsilon)
        })
        .collect()
}

/// Reject a Big-M optimum that still uses an artificial variable.
pub fn check_artificials(tableau: &Tableau, epsilon: f64) -> Result<()> {
    for i in 0..tableau.num_rows() {
        let label = tableau.row_label(i);
        if label.is_artificial() && tableau.constant(i) > epsilon {
            return Err(PivotError::Infeasible { row: label.name() });
        }
    }
    Ok(())
}
