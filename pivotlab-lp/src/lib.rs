//! pivotlab LP - Simplex tableaux, Gomory cuts and dual problems
//!
//! This crate implements the simplex method on the compact
//! modified-Jordan-elimination tableau:
//! - [`LinearProblem`] model with `<=`, `>=` and `=` constraints
//! - Jordan-exclusion and Big-M initial tableaux ([`transform`])
//! - Phase I feasibility and phase II optimality searches ([`phases`])
//! - Solution and shadow-price extraction ([`solution`])
//! - Gomory fractional cuts for pure integer problems ([`gomory`])
//! - Dual problem construction ([`DualProblem`])
//!
//! Every run records its decisions in a [`pivotlab_core::ProtocolSink`].
//!
//! # Examples
//!
//! ## Continuous problem
//!
//! ```
//! use pivotlab_core::Protocol;
//! use pivotlab_lp::{Constraint, LinearProblem, Objective, SimplexSolver};
//!
//! let problem = LinearProblem::new(
//!     Objective::maximize(vec![3.0, 5.0]),
//!     vec![
//!         Constraint::le(vec![1.0, 0.0], 4.0),
//!         Constraint::le(vec![0.0, 2.0], 12.0),
//!         Constraint::le(vec![3.0, 2.0], 18.0),
//!     ],
//! )
//! .unwrap();
//!
//! let mut protocol = Protocol::new();
//! let solution = SimplexSolver::default().solve(&problem, &mut protocol).unwrap();
//!
//! assert!((solution.decision_values[0] - 2.0).abs() < 1e-9);
//! assert!((solution.decision_values[1] - 6.0).abs() < 1e-9);
//! assert!((solution.objective_value - 36.0).abs() < 1e-9);
//! assert!(protocol.mentions("Max(Z) = 36.00"));
//! ```
//!
//! ## Integer problem
//!
//! ```
//! use pivotlab_core::NullProtocol;
//! use pivotlab_lp::{Constraint, LinearProblem, Objective, SimplexSolver};
//!
//! let problem = LinearProblem::new(
//!     Objective::maximize(vec![7.0, 9.0]),
//!     vec![
//!         Constraint::le(vec![-1.0, 3.0], 6.0),
//!         Constraint::le(vec![7.0, 1.0], 35.0),
//!     ],
//! )
//! .unwrap();
//!
//! let solution = SimplexSolver::default()
//!     .solve_integer(&problem, &mut NullProtocol)
//!     .unwrap();
//! assert_eq!(solution.objective_value.round(), 55.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod dual;
pub mod gomory;
pub mod phases;
pub mod problem;
pub mod solution;
pub mod solver;
pub mod tableau;
pub mod transform;
pub mod variable;

pub use dual::{DualProblem, SignRestriction};
pub use gomory::{GomoryCut, GomoryStats};
pub use phases::{PhaseOutcome, PivotChoice};
pub use problem::{Constraint, LinearProblem, MAX_VARIABLES, Objective, Relation};
pub use solution::SolutionRecord;
pub use solver::{SimplexSolver, SolveStats};
pub use tableau::Tableau;
pub use transform::{AuxRole, CanonicalForm, ConstraintAux};
pub use variable::Variable;
