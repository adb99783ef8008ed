//! Property-based tests for the simplex engine
//!
//! This module tests:
//! - Pivoting twice at the same cell restores the tableau
//! - Phase I never increases the number of negative constants
//! - Phase II stops only on an optimality certificate
//! - Gomory cuts separate the fractional vertex but keep integer points
//! - Integer optima match brute-force enumeration
//! - Both initial bases agree and strong duality holds

use pivotlab_core::{FeasibilityRule, InitialBasis, NullProtocol, PivotError, SolverConfig};
use pivotlab_lp::gomory::{build_cut_row, select_cut_source_row};
use pivotlab_lp::phases::{is_optimal, most_negative_row, phase_one, phase_two, select_feasibility_pivot};
use pivotlab_lp::transform::jordan_exclusion;
use pivotlab_lp::{
    Constraint, DualProblem, LinearProblem, Objective, Relation, SimplexSolver, Tableau, Variable,
};
use proptest::prelude::*;

const TOL: f64 = 1e-6;
const GRID: i32 = 15;

/// Strategy for a random tableau with slack rows and decision columns
fn tableau_strategy() -> impl Strategy<Value = Tableau> {
    (1usize..=4, 1usize..=4).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(
            prop::collection::vec((-9i32..=9).prop_map(f64::from), cols + 1),
            rows + 1,
        )
        .prop_map(move |cells| {
            let row_labels = (0..rows)
                .map(Variable::Slack)
                .chain(std::iter::once(Variable::Objective))
                .collect();
            let col_labels = (0..cols)
                .map(Variable::Decision)
                .chain(std::iter::once(Variable::Constant))
                .collect();
            Tableau::new(cells, row_labels, col_labels).unwrap()
        })
    })
}

/// Strategy for a problem with `<=` and `>=` rows of either sign
fn inequality_problem_strategy() -> impl Strategy<Value = LinearProblem> {
    (1usize..=3, 1usize..=4).prop_flat_map(|(n, m)| {
        (
            prop::collection::vec(-5i32..=5, n),
            prop::collection::vec(
                (
                    prop::collection::vec(-5i32..=5, n),
                    prop::bool::ANY,
                    -10i32..=10,
                ),
                m,
            ),
        )
            .prop_map(|(c, rows)| {
                let constraints = rows
                    .into_iter()
                    .map(|(a, le, b)| {
                        let coeffs = a.into_iter().map(f64::from).collect();
                        if le {
                            Constraint::le(coeffs, f64::from(b))
                        } else {
                            Constraint::ge(coeffs, f64::from(b))
                        }
                    })
                    .collect();
                LinearProblem::new(
                    Objective::maximize(c.into_iter().map(f64::from).collect()),
                    constraints,
                )
                .unwrap()
            })
    })
}

/// Strategy for a problem mixing all three relations and both directions
fn mixed_problem_strategy() -> impl Strategy<Value = LinearProblem> {
    let relation = prop_oneof![
        Just(Relation::LessEqual),
        Just(Relation::GreaterEqual),
        Just(Relation::Equal)
    ];
    (1usize..=3, 1usize..=3).prop_flat_map(move |(n, m)| {
        (
            prop::collection::vec(-3i32..=3, n),
            prop::bool::ANY,
            prop::collection::vec(
                (
                    prop::collection::vec(-3i32..=3, n),
                    relation.clone(),
                    -6i32..=6,
                ),
                m,
            ),
        )
            .prop_map(|(c, minimize, rows)| {
                let coeffs = c.into_iter().map(f64::from).collect();
                let objective = if minimize {
                    Objective::minimize(coeffs)
                } else {
                    Objective::maximize(coeffs)
                };
                let constraints = rows
                    .into_iter()
                    .map(|(a, relation, b)| {
                        Constraint::new(a.into_iter().map(f64::from).collect(), relation, f64::from(b))
                    })
                    .collect();
                LinearProblem::new(objective, constraints).unwrap()
            })
    })
}

/// Strategy for a bounded pure integer problem: positive `<=` rows
fn integer_problem_strategy() -> impl Strategy<Value = LinearProblem> {
    (1usize..=2, 1usize..=3).prop_flat_map(|(n, m)| {
        (
            prop::collection::vec(1i32..=9, n),
            prop::collection::vec((prop::collection::vec(1i32..=5, n), 0i32..=GRID), m),
        )
            .prop_map(|(c, rows)| {
                let constraints = rows
                    .into_iter()
                    .map(|(a, b)| Constraint::le(a.into_iter().map(f64::from).collect(), f64::from(b)))
                    .collect();
                LinearProblem::new(
                    Objective::maximize(c.into_iter().map(f64::from).collect()),
                    constraints,
                )
                .unwrap()
            })
    })
}

/// Every integer point of `[0, GRID]^n` satisfying the constraints
fn integer_points(problem: &LinearProblem) -> Vec<Vec<f64>> {
    let n = problem.num_variables();
    let mut points = vec![Vec::new()];
    for _ in 0..n {
        points = points
            .into_iter()
            .flat_map(|p| {
                (0..=GRID).map(move |v| {
                    let mut q = p.clone();
                    q.push(f64::from(v));
                    q
                })
            })
            .collect();
    }
    points
        .into_iter()
        .filter(|x| problem.is_feasible(x, 1e-9))
        .collect()
}

/// Optimal tableau of an all-`<=` problem with non-negative right-hand sides
fn optimal_tableau(problem: &LinearProblem) -> Tableau {
    let config = SolverConfig::default();
    let form = jordan_exclusion(problem).unwrap();
    let feasible = phase_one(&form.tableau, &config, &mut NullProtocol).unwrap();
    phase_two(&feasible.tableau, &config, &mut NullProtocol)
        .unwrap()
        .tableau
}

#[cfg(test)]
mod pivot_properties {
    use super::*;

    proptest! {
        /// Test that the MJE pivot is an involution
        #[test]
        fn pivot_twice_restores_tableau(t in tableau_strategy(), r in 0usize..4, s in 0usize..4) {
            let r = r % t.num_rows();
            let s = s % t.num_cols();
            prop_assume!(t.value(r, s).abs() >= 1.0);

            let once = t.pivot(r, s, 1e-9).unwrap();
            prop_assert!((once.value(r, s) - 1.0 / t.value(r, s)).abs() < 1e-12);
            prop_assert_eq!(once.row_label(r), t.col_label(s));

            let twice = once.pivot(r, s, 1e-9).unwrap();
            prop_assert_eq!(twice.row_labels(), t.row_labels());
            prop_assert_eq!(twice.col_labels(), t.col_labels());
            for (a, b) in twice.cells().iter().flatten().zip(t.cells().iter().flatten()) {
                prop_assert!((a - b).abs() < TOL);
            }
        }
    }
}

#[cfg(test)]
mod phase_properties {
    use super::*;

    proptest! {
        /// Test that phase I never increases the negative-constant count
        #[test]
        fn feasibility_count_is_monotone(problem in inequality_problem_strategy()) {
            let eps = 1e-9;
            let mut t = jordan_exclusion(&problem).unwrap().tableau;
            let mut count = t.count_negative_constants(eps);

            for _ in 0..50 {
                let Some(source) = most_negative_row(&t, eps) else { break };
                let Ok(choice) = select_feasibility_pivot(&t, source, FeasibilityRule::RatioTest, eps, 2) else {
                    break;
                };
                t = t.pivot(choice.row, choice.column, eps).unwrap();
                let next = t.count_negative_constants(eps);
                prop_assert!(next <= count, "count grew from {} to {}", count, next);
                count = next;
            }
        }

        /// Test that phase II terminates on an optimality certificate with a feasible vertex
        #[test]
        fn optimum_is_certified(problem in integer_problem_strategy()) {
            let t = optimal_tableau(&problem);
            prop_assert!(is_optimal(&t, 1e-9));
            prop_assert_eq!(t.count_negative_constants(1e-9), 0);

            let solution = SimplexSolver::default().solve(&problem, &mut NullProtocol).unwrap();
            prop_assert!(problem.is_feasible(&solution.decision_values, TOL));
            for x in integer_points(&problem) {
                prop_assert!(problem.objective().value(&x) <= solution.objective_value + TOL);
            }
        }
    }
}

#[cfg(test)]
mod gomory_properties {
    use super::*;

    /// Value of a column variable at the integer point `x`
    fn column_value(problem: &LinearProblem, variable: Variable, x: &[f64]) -> f64 {
        match variable {
            Variable::Decision(j) => x[j],
            Variable::Slack(i) => {
                let c = &problem.constraints()[i];
                c.rhs - c.lhs(x)
            }
            _ => 0.0,
        }
    }

    proptest! {
        /// Test that a cut removes the fractional vertex but no integer point
        #[test]
        fn cut_separates_fractional_vertex(problem in integer_problem_strategy()) {
            let t = optimal_tableau(&problem);
            let Some(row) = select_cut_source_row(&t, 1e-9) else {
                return Ok(());
            };
            let cut = build_cut_row(&t, row, 0, 1e-9);
            prop_assert!(cut.constant < 0.0);

            for x in integer_points(&problem) {
                let slack: f64 = cut
                    .coeffs
                    .iter()
                    .enumerate()
                    .map(|(j, a)| -a * column_value(&problem, t.col_label(j), &x))
                    .sum::<f64>()
                    + cut.constant;
                prop_assert!(slack >= -TOL, "cut excludes {:?}", x);
            }
        }

        /// Test that the Gomory loop finds the brute-force integer optimum
        #[test]
        fn gomory_matches_brute_force(problem in integer_problem_strategy()) {
            let best = integer_points(&problem)
                .iter()
                .map(|x| problem.objective().value(x))
                .fold(f64::NEG_INFINITY, f64::max);

            match SimplexSolver::default().solve_integer(&problem, &mut NullProtocol) {
                Ok(solution) => {
                    prop_assert!((solution.objective_value - best).abs() < TOL);
                    prop_assert!(problem.is_feasible(&solution.decision_values, TOL));
                    for v in &solution.decision_values {
                        prop_assert!((v - v.round()).abs() < TOL);
                    }
                }
                // the cut budget may run out; anything else is a bug
                Err(PivotError::IterationLimitExceeded { .. }) => {}
                Err(err) => prop_assert!(false, "unexpected error {}", err),
            }
        }
    }
}

#[cfg(test)]
mod duality_properties {
    use super::*;

    fn solve(problem: &LinearProblem, basis: InitialBasis) -> Result<pivotlab_lp::SolutionRecord, PivotError> {
        SimplexSolver::new(SolverConfig::default().with_initial_basis(basis))
            .solve(problem, &mut NullProtocol)
    }

    proptest! {
        /// Test that Jordan exclusion and Big-M reach the same optimum or the same verdict
        #[test]
        fn initial_bases_agree(problem in mixed_problem_strategy()) {
            let je = solve(&problem, InitialBasis::JordanExclusion);
            let bm = solve(&problem, InitialBasis::BigM);
            match (&je, &bm) {
                (Ok(a), Ok(b)) => {
                    let scale = 1.0 + a.objective_value.abs();
                    prop_assert!((a.objective_value - b.objective_value).abs() < TOL * scale);
                    prop_assert!(problem.is_feasible(&a.decision_values, TOL));
                    prop_assert!(problem.is_feasible(&b.decision_values, TOL));
                }
                (Err(PivotError::IterationLimitExceeded { .. }), _)
                | (_, Err(PivotError::IterationLimitExceeded { .. })) => {}
                (Ok(_), Err(err)) | (Err(err), Ok(_)) => {
                    prop_assert!(false, "bases disagree: {:?} vs {:?} ({})", je, bm, err);
                }
                (Err(a), Err(b)) => {
                    prop_assert_eq!(a.kind(), b.kind(), "verdicts differ: {} vs {}", a, b);
                }
            }
        }

        /// Test that the shadow prices price out the optimum and solve the dual
        #[test]
        fn strong_duality(problem in mixed_problem_strategy()) {
            let Ok(solution) = solve(&problem, InitialBasis::JordanExclusion) else {
                return Ok(());
            };
            let duals = solution.dual_values.clone().unwrap();
            let priced: f64 = problem
                .constraints()
                .iter()
                .zip(&duals)
                .map(|(c, u)| c.rhs * u)
                .sum();
            let scale = 1.0 + solution.objective_value.abs();
            prop_assert!((priced - solution.objective_value).abs() < TOL * scale);

            let dual = DualProblem::from_primal(&problem);
            match SimplexSolver::default().solve(&dual.to_linear_problem().unwrap(), &mut NullProtocol) {
                Ok(dual_solution) => {
                    prop_assert!((dual_solution.objective_value - solution.objective_value).abs() < TOL * scale);
                }
                Err(PivotError::IterationLimitExceeded { .. }) => {}
                Err(err) => prop_assert!(false, "dual failed: {}", err),
            }
        }
    }
}
