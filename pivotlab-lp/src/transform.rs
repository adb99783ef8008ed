//! Problem transformer: [`LinearProblem`] to initial tableau.
//!
//! Two strategies build the starting basis (see [`InitialBasis`]):
//!
//! - Jordan exclusion: a `<=` row is kept as is with its slack basic, a `>=`
//!   row is negated with its surplus basic, and an `=` row keeps its
//!   artificial basic ("zero row") until [`crate::phases::eliminate_zero_rows`]
//!   pivots it out.
//! - Big-M: right-hand sides are made non-negative, `>=` rows get a surplus
//!   column, `>=`/`=` rows get an artificial basic variable penalised by `M`
//!   in the objective row.

use crate::problem::{LinearProblem, Relation, format_terms};
use crate::tableau::Tableau;
use crate::variable::Variable;
use pivotlab_core::{InitialBasis, Result, SolverConfig};

/// How a constraint's auxiliary variable enters the objective derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxRole {
    /// Slack of a `<=` row.
    Slack,
    /// Surplus of a `>=` row.
    Surplus,
    /// Artificial of an eliminated `=` row.
    ZeroRow,
    /// Big-M artificial of an `=` row.
    Penalized,
}

/// Auxiliary variable attached to one constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintAux {
    /// The variable whose reduced cost yields the dual value.
    pub variable: Variable,
    /// Role of that variable.
    pub role: AuxRole,
    /// Whether the constraint was multiplied by `-1` during normalisation.
    pub flipped: bool,
}

/// Initial tableau plus the bookkeeping needed to read results back.
#[derive(Debug, Clone)]
pub struct CanonicalForm {
    /// Starting tableau.
    pub tableau: Tableau,
    /// One entry per original constraint.
    pub aux: Vec<ConstraintAux>,
    /// Strategy that produced the tableau.
    pub strategy: InitialBasis,
    /// Penalty used for artificial variables (zero for Jordan exclusion).
    pub big_m: f64,
    /// Whether the original objective is minimised.
    pub is_minimize: bool,
    /// Number of decision variables.
    pub num_variables: usize,
}

impl CanonicalForm {
    /// Row equations `basic = Σ -a_j v_j + b` of the initial tableau.
    ///
    /// Slack and surplus rows end in `>= 0`, artificial rows in `= 0`.
    pub fn row_equations(&self) -> Vec<String> {
        row_equations(&self.tableau)
    }
}

/// Objective coefficients of the internal maximisation `Z'`.
fn internal_objective(problem: &LinearProblem) -> Vec<f64> {
    let sign = if problem.is_minimize() { -1.0 } else { 1.0 };
    problem.objective().coeffs.iter().map(|c| sign * c).collect()
}

/// Build the initial tableau with the configured strategy.
pub fn canonical_form(problem: &LinearProblem, config: &SolverConfig) -> Result<CanonicalForm> {
    match config.initial_basis {
        InitialBasis::JordanExclusion => jordan_exclusion(problem),
        InitialBasis::BigM => big_m(problem, config.big_m, config.epsilon),
    }
}

/// Jordan-exclusion initial tableau.
pub fn jordan_exclusion(problem: &LinearProblem) -> Result<CanonicalForm> {
    let n = problem.num_variables();
    let mut cells = Vec::with_capacity(problem.num_constraints() + 1);
    let mut rows = Vec::with_capacity(problem.num_constraints() + 1);
    let mut aux = Vec::with_capacity(problem.num_constraints());

    for (i, constraint) in problem.constraints().iter().enumerate() {
        let (sign, variable, role) = match constraint.relation {
            Relation::LessEqual => (1.0, Variable::Slack(i), AuxRole::Slack),
            Relation::GreaterEqual => (-1.0, Variable::Surplus(i), AuxRole::Surplus),
            Relation::Equal => (1.0, Variable::Artificial(i), AuxRole::ZeroRow),
        };
        let mut row: Vec<f64> = constraint.coeffs.iter().map(|a| sign * a).collect();
        row.push(sign * constraint.rhs);
        cells.push(row);
        rows.push(variable);
        aux.push(ConstraintAux {
            variable,
            role,
            flipped: false,
        });
    }

    let mut objective = internal_objective(problem);
    objective.push(0.0);
    cells.push(objective);
    rows.push(Variable::Objective);

    let cols: Vec<Variable> = (0..n)
        .map(Variable::Decision)
        .chain(std::iter::once(Variable::Constant))
        .collect();

    Ok(CanonicalForm {
        tableau: Tableau::new(cells, rows, cols)?,
        aux,
        strategy: InitialBasis::JordanExclusion,
        big_m: 0.0,
        is_minimize: problem.is_minimize(),
        num_variables: n,
    })
}

/// Big-M initial tableau with penalty `m`.
pub fn big_m(problem: &LinearProblem, m: f64, epsilon: f64) -> Result<CanonicalForm> {
    let n = problem.num_variables();

    // normalise to b >= 0
    let normalized: Vec<(Vec<f64>, Relation, f64, bool)> = problem
        .constraints()
        .iter()
        .map(|c| {
            if c.rhs < -epsilon {
                (
                    c.coeffs.iter().map(|a| -a).collect(),
                    c.relation.flipped(),
                    -c.rhs,
                    true,
                )
            } else {
                (c.coeffs.clone(), c.relation, c.rhs, false)
            }
        })
        .collect();

    let surplus_rows: Vec<usize> = normalized
        .iter()
        .enumerate()
        .filter(|(_, (_, relation, _, _))| *relation == Relation::GreaterEqual)
        .map(|(i, _)| i)
        .collect();
    let width = n + surplus_rows.len() + 1;

    let mut cells = Vec::with_capacity(normalized.len() + 1);
    let mut rows = Vec::with_capacity(normalized.len() + 1);
    let mut aux = Vec::with_capacity(normalized.len());

    for (i, (coeffs, relation, rhs, flipped)) in normalized.iter().enumerate() {
        let mut row = vec![0.0; width];
        row[..n].copy_from_slice(coeffs);
        row[width - 1] = *rhs;

        let (basic, entry) = match relation {
            Relation::LessEqual => (
                Variable::Slack(i),
                ConstraintAux {
                    variable: Variable::Slack(i),
                    role: AuxRole::Slack,
                    flipped: *flipped,
                },
            ),
            Relation::GreaterEqual => {
                let col = n + surplus_rows.iter().take_while(|&&r| r != i).count();
                row[col] = -1.0;
                (
                    Variable::Artificial(i),
                    ConstraintAux {
                        variable: Variable::Surplus(i),
                        role: AuxRole::Surplus,
                        flipped: *flipped,
                    },
                )
            }
            Relation::Equal => (
                Variable::Artificial(i),
                ConstraintAux {
                    variable: Variable::Artificial(i),
                    role: AuxRole::Penalized,
                    flipped: *flipped,
                },
            ),
        };
        cells.push(row);
        rows.push(basic);
        aux.push(entry);
    }

    let mut objective = internal_objective(problem);
    objective.resize(width, 0.0);
    for (row, basic) in cells.iter().zip(&rows) {
        if basic.is_artificial() {
            for (z, a) in objective.iter_mut().zip(row) {
                *z += m * a;
            }
        }
    }
    cells.push(objective);
    rows.push(Variable::Objective);

    let cols: Vec<Variable> = (0..n)
        .map(Variable::Decision)
        .chain(surplus_rows.iter().map(|&i| Variable::Surplus(i)))
        .chain(std::iter::once(Variable::Constant))
        .collect();

    Ok(CanonicalForm {
        tableau: Tableau::new(cells, rows, cols)?,
        aux,
        strategy: InitialBasis::BigM,
        big_m: m,
        is_minimize: problem.is_minimize(),
        num_variables: n,
    })
}

/// Row equations of a tableau, e.g. `y1 = -x1 - 2*x2 + 4 >= 0`.
pub fn row_equations(tableau: &Tableau) -> Vec<String> {
    let cols = tableau.num_cols();
    (0..tableau.num_rows())
        .map(|i| {
            let basic = tableau.row_label(i);
            let terms = (0..cols).map(|j| (-tableau.value(i, j), tableau.col_label(j).name()));
            let rhs = format_terms(terms, tableau.constant(i));
            let relation = if basic.is_artificial() { "=" } else { ">=" };
            format!("{} = {} {} 0", basic, rhs, relation)
        })
        .collect()
}

/// Objective equation of a tableau, e.g. `Z' = 3*x1 + 5*x2 -> max`.
pub fn objective_equation(tableau: &Tableau) -> String {
    let row = tableau.objective_row();
    let terms = (0..tableau.num_cols()).map(|j| (tableau.value(row, j), tableau.col_label(j).name()));
    format!("Z' = {} -> max", format_terms(terms, -tableau.constant(row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Constraint, Objective};

    fn mixed() -> LinearProblem {
        LinearProblem::new(
            Objective::minimize(vec![1.0, 2.0]),
            vec![
                Constraint::le(vec![1.0, 2.0], 4.0),
                Constraint::ge(vec![1.0, 1.0], 1.0),
                Constraint::eq(vec![1.0, -1.0], 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_jordan_exclusion_rows() {
        let form = jordan_exclusion(&mixed()).unwrap();
        let t = &form.tableau;
        assert_eq!(t.cells()[0], vec![1.0, 2.0, 4.0]);
        assert_eq!(t.cells()[1], vec![-1.0, -1.0, -1.0]);
        assert_eq!(t.cells()[2], vec![1.0, -1.0, 0.0]);
        // minimisation stores -c
        assert_eq!(t.cells()[3], vec![-1.0, -2.0, 0.0]);
        assert_eq!(
            t.row_labels(),
            &[
                Variable::Slack(0),
                Variable::Surplus(1),
                Variable::Artificial(2),
                Variable::Objective
            ]
        );
        assert_eq!(form.aux[2].role, AuxRole::ZeroRow);
    }

    #[test]
    fn test_row_equations() {
        let form = jordan_exclusion(&mixed()).unwrap();
        let eqs = form.row_equations();
        assert_eq!(eqs[0], "y1 = -x1 - 2*x2 + 4 >= 0");
        assert_eq!(eqs[1], "y2 = x1 + x2 - 1 >= 0");
        assert_eq!(eqs[2], "a3 = -x1 + x2 = 0");
        assert_eq!(objective_equation(&form.tableau), "Z' = -x1 - 2*x2 -> max");
    }

    #[test]
    fn test_big_m_layout() {
        let problem = LinearProblem::new(
            Objective::maximize(vec![1.0, 1.0]),
            vec![
                Constraint::le(vec![1.0, 1.0], -2.0),
                Constraint::ge(vec![1.0, 0.0], 1.0),
                Constraint::eq(vec![0.0, 1.0], 3.0),
            ],
        )
        .unwrap();
        let form = big_m(&problem, 100.0, 1e-9).unwrap();
        let t = &form.tableau;

        // row 0 was flipped into -x1 - x2 >= 2 and gets a surplus column
        assert!(form.aux[0].flipped);
        assert_eq!(form.aux[0].role, AuxRole::Surplus);
        assert_eq!(
            t.col_labels(),
            &[
                Variable::Decision(0),
                Variable::Decision(1),
                Variable::Surplus(0),
                Variable::Surplus(1),
                Variable::Constant
            ]
        );
        assert_eq!(t.cells()[0], vec![-1.0, -1.0, -1.0, 0.0, 2.0]);
        assert_eq!(t.cells()[1], vec![1.0, 0.0, 0.0, -1.0, 1.0]);
        assert_eq!(t.cells()[2], vec![0.0, 1.0, 0.0, 0.0, 3.0]);
        // objective absorbs M times every artificial row; the x columns cancel
        assert_eq!(t.cells()[3], vec![1.0, 1.0, -100.0, -100.0, 600.0]);
        assert!(t.row_labels()[..3].iter().all(Variable::is_artificial));
    }
}
