//! Error taxonomy shared by every pivotlab engine.
//!
//! Expected domain failures (an infeasible program, a singular matrix) are
//! ordinary values of [`PivotError`]. They are returned, never raised, and the
//! protocol of the failed run always carries a human-readable explanation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stage of a computation that can run out of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Phase I: search for a feasible (non-negative) basic solution.
    Feasibility,
    /// Phase II: search for an optimal basic solution.
    Optimality,
    /// Gomory cutting-plane rounds.
    Gomory,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Feasibility => write!(f, "feasibility search"),
            Stage::Optimality => write!(f, "optimality search"),
            Stage::Gomory => write!(f, "Gomory cutting-plane loop"),
        }
    }
}

/// Failure of a pivotlab computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PivotError {
    /// Malformed input detected before any solving begins.
    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    /// The constraint system has no non-negative solution.
    #[error("the constraint system is infeasible (contradiction in row {row})")]
    Infeasible {
        /// Display name of the row that exposed the contradiction.
        row: String,
    },

    /// The objective can be improved without bound.
    #[error("the objective is unbounded along column {column}")]
    Unbounded {
        /// Display name of the improving column with no limiting ratio.
        column: String,
    },

    /// A stage exceeded its iteration cap.
    #[error("{stage} exceeded its limit of {limit} iterations")]
    IterationLimitExceeded {
        /// The stage that ran out of iterations.
        stage: Stage,
        /// The configured cap.
        limit: usize,
    },

    /// No usable pivot exists in a column: the matrix has no unique inverse/solution.
    #[error("the matrix is singular (no pivot in column {column})")]
    SingularMatrix {
        /// Zero-based column without a usable pivot.
        column: usize,
    },

    /// A reduced row reads `0 = c` with `c != 0`.
    #[error("the linear system is inconsistent (row {row} reads 0 = c, c != 0)")]
    InconsistentSystem {
        /// Zero-based row of the contradiction.
        row: usize,
    },

    /// A pivot step was attempted on a (near-)zero element.
    #[error("pivot element at ({row}, {column}) is too close to zero: {value:e}")]
    PivotZero {
        /// Zero-based pivot row.
        row: usize,
        /// Zero-based pivot column.
        column: usize,
        /// The rejected pivot value.
        value: f64,
    },
}

impl PivotError {
    /// Shorthand for [`PivotError::InvalidProblem`].
    pub fn invalid(message: impl Into<String>) -> Self {
        PivotError::InvalidProblem(message.into())
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PivotError::InvalidProblem(_) => "invalid-problem",
            PivotError::Infeasible { .. } => "infeasible",
            PivotError::Unbounded { .. } => "unbounded",
            PivotError::IterationLimitExceeded { .. } => "iteration-limit",
            PivotError::SingularMatrix { .. } => "singular-matrix",
            PivotError::InconsistentSystem { .. } => "inconsistent-system",
            PivotError::PivotZero { .. } => "pivot-zero",
        }
    }

    /// Whether the failure is a property of the input rather than of the run.
    ///
    /// Iteration caps and zero pivots point at cycling or a modelling issue;
    /// everything else is a verdict about the problem itself.
    pub fn is_verdict(&self) -> bool {
        !matches!(
            self,
            PivotError::IterationLimitExceeded { .. } | PivotError::PivotZero { .. }
        )
    }
}

/// Result type for pivotlab operations.
pub type Result<T> = std::result::Result<T, PivotError>;
