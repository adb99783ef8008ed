//! Dual problem construction.
//!
//! For a primal `max c·x, A x (rel) b, x >= 0` the dual is
//! `min b·u, Aᵀ u >= c`, and for a minimising primal it is
//! `max b·u, Aᵀ u <= c`. The sign of each dual variable follows the relation
//! of its primal constraint and the primal direction; equality constraints
//! give free variables.

use crate::problem::{Constraint, LinearProblem, Objective, Relation, format_linear};
use pivotlab_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign restriction of a dual variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignRestriction {
    /// `u >= 0`
    NonNegative,
    /// `u <= 0`
    NonPositive,
    /// unrestricted
    Free,
}

/// Dual of a [`LinearProblem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualProblem {
    objective: Objective,
    constraints: Vec<Constraint>,
    signs: Vec<SignRestriction>,
}

impl DualProblem {
    /// Derive the dual of `primal`.
    pub fn from_primal(primal: &LinearProblem) -> Self {
        let maximize_primal = !primal.is_minimize();

        let rhs: Vec<f64> = primal.constraints().iter().map(|c| c.rhs).collect();
        let objective = if maximize_primal {
            Objective::minimize(rhs)
        } else {
            Objective::maximize(rhs)
        };

        let relation = if maximize_primal {
            Relation::GreaterEqual
        } else {
            Relation::LessEqual
        };
        let constraints = (0..primal.num_variables())
            .map(|j| {
                Constraint::new(
                    primal.constraints().iter().map(|c| c.coeffs[j]).collect(),
                    relation,
                    primal.objective().coeffs[j],
                )
            })
            .collect();

        let signs = primal
            .constraints()
            .iter()
            .map(|c| match (c.relation, maximize_primal) {
                (Relation::Equal, _) => SignRestriction::Free,
                (Relation::LessEqual, true) | (Relation::GreaterEqual, false) => {
                    SignRestriction::NonNegative
                }
                (Relation::GreaterEqual, true) | (Relation::LessEqual, false) => {
                    SignRestriction::NonPositive
                }
            })
            .collect();

        Self {
            objective,
            constraints,
            signs,
        }
    }

    /// Dual objective (`b·u`).
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// One dual constraint per primal variable.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Sign restriction of each dual variable.
    pub fn signs(&self) -> &[SignRestriction] {
        &self.signs
    }

    /// Number of dual variables.
    pub fn num_variables(&self) -> usize {
        self.signs.len()
    }

    /// Columns of the equivalent non-negative program: `(dual index, sign)`.
    ///
    /// A non-positive `u` becomes `-u'`, a free `u` becomes `u⁺ - u⁻`.
    fn expansion(&self) -> Vec<(usize, f64)> {
        self.signs
            .iter()
            .enumerate()
            .flat_map(|(i, sign)| match sign {
                SignRestriction::NonNegative => vec![(i, 1.0)],
                SignRestriction::NonPositive => vec![(i, -1.0)],
                SignRestriction::Free => vec![(i, 1.0), (i, -1.0)],
            })
            .collect()
    }

    /// Rewrite the dual over non-negative variables so the simplex engine can solve it.
    ///
    /// Fails with `InvalidProblem` if the expansion exceeds the variable limit.
    pub fn to_linear_problem(&self) -> Result<LinearProblem> {
        let columns = self.expansion();
        let objective = Objective {
            coeffs: columns
                .iter()
                .map(|&(i, s)| s * self.objective.coeffs[i])
                .collect(),
            is_minimize: self.objective.is_minimize,
        };
        let constraints = self
            .constraints
            .iter()
            .map(|c| {
                Constraint::new(
                    columns.iter().map(|&(i, s)| s * c.coeffs[i]).collect(),
                    c.relation,
                    c.rhs,
                )
            })
            .collect();
        LinearProblem::new(objective, constraints)
    }

    /// Map a solution of [`DualProblem::to_linear_problem`] back to the dual variables.
    pub fn recover_values(&self, expanded: &[f64]) -> Vec<f64> {
        let mut values = vec![0.0; self.num_variables()];
        for (&(i, s), v) in self.expansion().iter().zip(expanded) {
            values[i] += s * v;
        }
        values
    }
}

impl fmt::Display for DualProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "W = {} -> {}",
            format_linear(&self.objective.coeffs, "u", 0.0),
            self.objective.direction()
        )?;
        for c in &self.constraints {
            writeln!(
                f,
                "{} {} {}",
                format_linear(&c.coeffs, "u", 0.0),
                c.relation,
                crate::problem::format_coefficient(c.rhs)
            )?;
        }
        let signs: Vec<String> = self
            .signs
            .iter()
            .enumerate()
            .map(|(i, s)| match s {
                SignRestriction::NonNegative => format!("u{} >= 0", i + 1),
                SignRestriction::NonPositive => format!("u{} <= 0", i + 1),
                SignRestriction::Free => format!("u{} free", i + 1),
            })
            .collect();
        write!(f, "{}", signs.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_of_max_problem() {
        let primal = LinearProblem::new(
            Objective::maximize(vec![3.0, 5.0]),
            vec![
                Constraint::le(vec![1.0, 0.0], 4.0),
                Constraint::le(vec![0.0, 2.0], 12.0),
                Constraint::le(vec![3.0, 2.0], 18.0),
            ],
        )
        .unwrap();
        let dual = DualProblem::from_primal(&primal);
        assert!(dual.objective().is_minimize);
        assert_eq!(dual.objective().coeffs, vec![4.0, 12.0, 18.0]);
        assert_eq!(dual.constraints()[0].coeffs, vec![1.0, 0.0, 3.0]);
        assert_eq!(dual.constraints()[1].relation, Relation::GreaterEqual);
        assert_eq!(dual.constraints()[1].rhs, 5.0);
        assert!(dual.signs().iter().all(|s| *s == SignRestriction::NonNegative));

        let text = dual.to_string();
        assert!(text.starts_with("W = 4*u1 + 12*u2 + 18*u3 -> min"));
        assert!(text.contains("2*u2 + 2*u3 >= 5"));
        assert!(text.ends_with("u1 >= 0, u2 >= 0, u3 >= 0"));
    }

    #[test]
    fn test_sign_restrictions_of_min_problem() {
        let primal = LinearProblem::new(
            Objective::minimize(vec![1.0, 2.0]),
            vec![
                Constraint::eq(vec![1.0, 1.0], 3.0),
                Constraint::le(vec![1.0, 0.0], 2.0),
                Constraint::ge(vec![0.0, 1.0], 0.0),
            ],
        )
        .unwrap();
        let dual = DualProblem::from_primal(&primal);
        assert!(!dual.objective().is_minimize);
        assert_eq!(
            dual.signs(),
            &[
                SignRestriction::Free,
                SignRestriction::NonPositive,
                SignRestriction::NonNegative
            ]
        );

        let lp = dual.to_linear_problem().unwrap();
        // free -> two columns, non-positive -> one negated column
        assert_eq!(lp.num_variables(), 4);
        assert_eq!(lp.objective().coeffs, vec![3.0, -3.0, -2.0, 0.0]);
        assert_eq!(lp.constraints()[0].coeffs, vec![1.0, -1.0, -1.0, 0.0]);
        assert_eq!(dual.recover_values(&[2.0, 0.0, 1.0, 0.0]), vec![2.0, -1.0, 0.0]);
    }
}
