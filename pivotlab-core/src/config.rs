//! Tunable constants shared by the engines.

use crate::error::{PivotError, Result};
use crate::numeric::EPSILON;
use serde::{Deserialize, Serialize};

/// How the initial tableau obtains a basis for `=` (and, with Big-M, `>=`) rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialBasis {
    /// Sign-flip rows for `<=`/`>=`, zero-row elimination for `=`.
    #[default]
    JordanExclusion,
    /// Artificial variables penalised by `big_m` in the objective row.
    BigM,
}

/// Pivot-row rule used by the feasibility search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeasibilityRule {
    /// Minimum non-negative ratio over rows that stay feasible.
    ///
    /// The number of negative constants never grows under this rule.
    #[default]
    RatioTest,
    /// Pivot directly on the row holding the most negative constant.
    FirstNegative,
}

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Zero tolerance for pivots, signs and integrality.
    pub epsilon: f64,
    /// Iteration cap of each simplex phase.
    pub max_simplex_steps: usize,
    /// Cap on Gomory cutting-plane rounds.
    pub max_gomory_iterations: usize,
    /// Penalty of artificial variables under [`InitialBasis::BigM`].
    pub big_m: f64,
    /// Initial basis strategy.
    pub initial_basis: InitialBasis,
    /// Pivot-row rule of the feasibility search.
    pub feasibility_rule: FeasibilityRule,
    /// Decimal places used when numbers are written to the protocol.
    pub precision: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            max_simplex_steps: 50,
            max_gomory_iterations: 20,
            big_m: 1000.0,
            initial_basis: InitialBasis::JordanExclusion,
            feasibility_rule: FeasibilityRule::RatioTest,
            precision: 2,
        }
    }
}

impl SolverConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zero tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the iteration cap of each simplex phase.
    pub fn with_max_simplex_steps(mut self, steps: usize) -> Self {
        self.max_simplex_steps = steps;
        self
    }

    /// Set the cap on Gomory rounds.
    pub fn with_max_gomory_iterations(mut self, iterations: usize) -> Self {
        self.max_gomory_iterations = iterations;
        self
    }

    /// Set the artificial-variable penalty.
    pub fn with_big_m(mut self, big_m: f64) -> Self {
        self.big_m = big_m;
        self
    }

    /// Set the initial basis strategy.
    pub fn with_initial_basis(mut self, initial_basis: InitialBasis) -> Self {
        self.initial_basis = initial_basis;
        self
    }

    /// Set the feasibility pivot-row rule.
    pub fn with_feasibility_rule(mut self, rule: FeasibilityRule) -> Self {
        self.feasibility_rule = rule;
        self
    }

    /// Set the protocol precision.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Reject configurations no engine can run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(PivotError::invalid(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        if self.max_simplex_steps == 0 {
            return Err(PivotError::invalid("max_simplex_steps must be at least 1"));
        }
        if self.max_gomory_iterations == 0 {
            return Err(PivotError::invalid(
                "max_gomory_iterations must be at least 1",
            ));
        }
        if !(self.big_m.is_finite() && self.big_m > 0.0) {
            return Err(PivotError::invalid(format!(
                "big_m must be a positive number, got {}",
                self.big_m
            )));
        }
        Ok(())
    }
}
