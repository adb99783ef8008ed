//! Tags for the variables that label tableau rows and columns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tableau variable.
///
/// Indices are zero-based. Slack, surplus and artificial variables carry the
/// index of the constraint they belong to; cut variables are numbered in the
/// order the cuts were generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    /// Original decision variable `x_j`.
    Decision(usize),
    /// Slack of a `<=` constraint.
    Slack(usize),
    /// Surplus of a `>=` constraint.
    Surplus(usize),
    /// Artificial variable of an `=` constraint (or a Big-M `>=` row).
    Artificial(usize),
    /// Slack of a Gomory cut.
    Cut(usize),
    /// The objective row `Z'`.
    Objective,
    /// The constant column `1`.
    Constant,
}

impl Variable {
    /// Display name, e.g. `x1`, `y2`, `a1`, `s1`.
    pub fn name(&self) -> String {
        match self {
            Variable::Decision(j) => format!("x{}", j + 1),
            Variable::Slack(i) | Variable::Surplus(i) => format!("y{}", i + 1),
            Variable::Artificial(i) => format!("a{}", i + 1),
            Variable::Cut(k) => format!("s{}", k + 1),
            Variable::Objective => "Z'".to_string(),
            Variable::Constant => "1".to_string(),
        }
    }

    /// Header used when the variable labels a column: `-x1`, but `1` for the constant.
    pub fn column_header(&self) -> String {
        match self {
            Variable::Constant => self.name(),
            _ => format!("-{}", self.name()),
        }
    }

    /// Index of an original decision variable.
    pub fn decision_index(&self) -> Option<usize> {
        match self {
            Variable::Decision(j) => Some(*j),
            _ => None,
        }
    }

    /// Whether this is an original decision variable.
    pub fn is_decision(&self) -> bool {
        matches!(self, Variable::Decision(_))
    }

    /// Whether this is an artificial variable. Artificial columns never re-enter the basis.
    pub fn is_artificial(&self) -> bool {
        matches!(self, Variable::Artificial(_))
    }

    /// Whether the variable may label a row or column of the variable part.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Variable::Objective | Variable::Constant)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
