//! Linear program model.

use pivotlab_core::{EPSILON, PivotError, Result, format_number};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest number of decision variables accepted.
pub const MAX_VARIABLES: usize = 15;

/// Relation of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// `a x <= b`
    #[serde(rename = "<=", alias = "le", alias = "LE")]
    LessEqual,
    /// `a x >= b`
    #[serde(rename = ">=", alias = "ge", alias = "GE")]
    GreaterEqual,
    /// `a x = b`
    #[serde(rename = "=", alias = "eq", alias = "EQ")]
    Equal,
}

impl Relation {
    /// Mathematical symbol of the relation.
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::LessEqual => "<=",
            Relation::GreaterEqual => ">=",
            Relation::Equal => "=",
        }
    }

    /// Relation obtained by multiplying both sides by `-1`.
    pub fn flipped(&self) -> Self {
        match self {
            Relation::LessEqual => Relation::GreaterEqual,
            Relation::GreaterEqual => Relation::LessEqual,
            Relation::Equal => Relation::Equal,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One constraint `coeffs · x  relation  rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Coefficients, one per decision variable.
    pub coeffs: Vec<f64>,
    /// Relation between the left- and right-hand side.
    pub relation: Relation,
    /// Right-hand side.
    pub rhs: f64,
}

impl Constraint {
    /// Create a constraint.
    pub fn new(coeffs: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        Self {
            coeffs,
            relation,
            rhs,
        }
    }

    /// `coeffs · x <= rhs`
    pub fn le(coeffs: Vec<f64>, rhs: f64) -> Self {
        Self::new(coeffs, Relation::LessEqual, rhs)
    }

    /// `coeffs · x >= rhs`
    pub fn ge(coeffs: Vec<f64>, rhs: f64) -> Self {
        Self::new(coeffs, Relation::GreaterEqual, rhs)
    }

    /// `coeffs · x = rhs`
    pub fn eq(coeffs: Vec<f64>, rhs: f64) -> Self {
        Self::new(coeffs, Relation::Equal, rhs)
    }

    /// Left-hand side evaluated at `x`.
    pub fn lhs(&self, x: &[f64]) -> f64 {
        self.coeffs.iter().zip(x).map(|(a, v)| a * v).sum()
    }

    /// Whether `x` satisfies the constraint within `tolerance`.
    pub fn is_satisfied_by(&self, x: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs(x);
        match self.relation {
            Relation::LessEqual => lhs <= self.rhs + tolerance,
            Relation::GreaterEqual => lhs >= self.rhs - tolerance,
            Relation::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Objective function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Coefficients, one per decision variable.
    pub coeffs: Vec<f64>,
    /// `true` to minimise, `false` to maximise.
    #[serde(default, alias = "minimize")]
    pub is_minimize: bool,
}

impl Objective {
    /// Objective to maximise.
    pub fn maximize(coeffs: Vec<f64>) -> Self {
        Self {
            coeffs,
            is_minimize: false,
        }
    }

    /// Objective to minimise.
    pub fn minimize(coeffs: Vec<f64>) -> Self {
        Self {
            coeffs,
            is_minimize: true,
        }
    }

    /// Objective value at `x`.
    pub fn value(&self, x: &[f64]) -> f64 {
        self.coeffs.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    /// `max` or `min`.
    pub fn direction(&self) -> &'static str {
        if self.is_minimize { "min" } else { "max" }
    }
}

/// Serialized shape of a [`LinearProblem`].
#[derive(Debug, Clone, Deserialize)]
struct ProblemInput {
    #[serde(default)]
    num_variables: Option<usize>,
    objective: Objective,
    constraints: Vec<Constraint>,
}

impl TryFrom<ProblemInput> for LinearProblem {
    type Error = PivotError;

    fn try_from(input: ProblemInput) -> Result<Self> {
        if let Some(n) = input.num_variables
            && n != input.objective.coeffs.len()
        {
            return Err(PivotError::invalid(format!(
                "num_variables is {} but the objective has {} coefficients",
                n,
                input.objective.coeffs.len()
            )));
        }
        LinearProblem::new(input.objective, input.constraints)
    }
}

/// A validated linear program over non-negative decision variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProblemInput")]
pub struct LinearProblem {
    num_variables: usize,
    objective: Objective,
    constraints: Vec<Constraint>,
}

impl LinearProblem {
    /// Build and validate a problem. The variable count is taken from the objective.
    pub fn new(objective: Objective, constraints: Vec<Constraint>) -> Result<Self> {
        let problem = Self {
            num_variables: objective.coeffs.len(),
            objective,
            constraints,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Check every structural rule of a well-formed problem.
    pub fn validate(&self) -> Result<()> {
        let n = self.num_variables;
        if n == 0 {
            return Err(PivotError::invalid("the objective has no variables"));
        }
        if n > MAX_VARIABLES {
            return Err(PivotError::invalid(format!(
                "at most {} decision variables are supported, got {}",
                MAX_VARIABLES, n
            )));
        }
        if self.constraints.is_empty() {
            return Err(PivotError::invalid("the problem has no constraints"));
        }
        if self.objective.coeffs.iter().any(|c| !c.is_finite()) {
            return Err(PivotError::invalid(
                "objective coefficients must be finite numbers",
            ));
        }
        for (i, constraint) in self.constraints.iter().enumerate() {
            if constraint.coeffs.len() != n {
                return Err(PivotError::invalid(format!(
                    "constraint {} has {} coefficients, expected {}",
                    i + 1,
                    constraint.coeffs.len(),
                    n
                )));
            }
            if constraint.coeffs.iter().any(|c| !c.is_finite()) || !constraint.rhs.is_finite() {
                return Err(PivotError::invalid(format!(
                    "constraint {} contains a non-finite number",
                    i + 1
                )));
            }
        }
        Ok(())
    }

    /// Number of decision variables.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The objective.
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// The constraints in input order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Whether the objective is minimised.
    pub fn is_minimize(&self) -> bool {
        self.objective.is_minimize
    }

    /// Whether `x` is non-negative and satisfies every constraint within `tolerance`.
    pub fn is_feasible(&self, x: &[f64], tolerance: f64) -> bool {
        x.len() == self.num_variables
            && x.iter().all(|&v| v >= -tolerance)
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied_by(x, tolerance))
    }
}

impl fmt::Display for LinearProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Z = {} -> {}",
            format_linear(&self.objective.coeffs, "x", 0.0),
            self.objective.direction()
        )?;
        for constraint in &self.constraints {
            writeln!(
                f,
                "{} {} {}",
                format_linear(&constraint.coeffs, "x", 0.0),
                constraint.relation,
                format_coefficient(constraint.rhs)
            )?;
        }
        let vars: Vec<String> = (1..=self.num_variables).map(|j| format!("x{}", j)).collect();
        write!(f, "{} >= 0", vars.join(", "))
    }
}

/// Shortest readable rendering of a coefficient: integers without decimals.
pub(crate) fn format_coefficient(value: f64) -> String {
    if (value - value.round()).abs() < EPSILON {
        format_number(value.round(), 0)
    } else {
        let text = format_number(value, 4);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Render `Σ coeffs_j · {prefix}{j+1} + constant`, skipping zero terms.
pub(crate) fn format_linear(coeffs: &[f64], prefix: &str, constant: f64) -> String {
    format_terms(
        coeffs
            .iter()
            .enumerate()
            .map(|(j, &c)| (c, format!("{}{}", prefix, j + 1))),
        constant,
    )
}

/// Render `Σ coeff · name + constant`, skipping zero terms.
pub(crate) fn format_terms(terms: impl IntoIterator<Item = (f64, String)>, constant: f64) -> String {
    let mut out = String::new();
    for (c, name) in terms {
        if c.abs() < EPSILON {
            continue;
        }
        if out.is_empty() {
            if c < 0.0 {
                out.push('-');
            }
        } else {
            out.push_str(if c < 0.0 { " - " } else { " + " });
        }
        let magnitude = c.abs();
        if (magnitude - 1.0).abs() >= EPSILON {
            out.push_str(&format_coefficient(magnitude));
            out.push('*');
        }
        out.push_str(&name);
    }

    if out.is_empty() {
        out.push_str(&format_coefficient(constant));
    } else if constant.abs() >= EPSILON {
        out.push_str(if constant < 0.0 { " - " } else { " + " });
        out.push_str(&format_coefficient(constant.abs()));
    }
    out
}
