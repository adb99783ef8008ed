//! Pivot selection and the two simplex phases.
//!
//! Phase I drives every basic variable to a non-negative value, phase II then
//! improves the objective while keeping feasibility. Both record every
//! decision and the tableau it was taken on before pivoting.

use crate::tableau::Tableau;
use pivotlab_core::{
    FeasibilityRule, PivotError, ProtocolSink, Result, SolverConfig, Stage, format_number,
};
use tracing::{debug, info, warn};

/// One pivot decision and the reason it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotChoice {
    /// Pivot row.
    pub row: usize,
    /// Pivot column.
    pub column: usize,
    /// Value of the pivot cell before the step.
    pub pivot_value: f64,
    /// Human-readable justification of the choice.
    pub reason: String,
}

/// Result of running a phase to completion.
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    /// Terminal tableau.
    pub tableau: Tableau,
    /// Number of pivots performed.
    pub pivots: usize,
}

/// Pivot every zero row (basic artificial variable) out of the basis.
///
/// Each zero row pivots on its largest-magnitude non-blocked coefficient, after
/// which its artificial variable sits in a blocked column at value zero. A row
/// with no usable coefficient is dropped from consideration as redundant when
/// its constant is zero, and reported as [`PivotError::Infeasible`] otherwise.
pub fn eliminate_zero_rows(
    tableau: &Tableau,
    config: &SolverConfig,
    sink: &mut dyn ProtocolSink,
) -> Result<PhaseOutcome> {
    let eps = config.epsilon;
    let precision = config.precision;
    let mut current = tableau.clone();
    let mut pivots = 0;

    for row in 0..current.num_rows() {
        let label = current.row_label(row);
        if !label.is_artificial() {
            continue;
        }

        let column = (0..current.num_cols())
            .filter(|&j| !current.is_blocked(j) && current.value(row, j).abs() >= eps)
            .fold(None, |best: Option<usize>, j| match best {
                Some(b) if current.value(row, b).abs() >= current.value(row, j).abs() => Some(b),
                _ => Some(j),
            });

        let Some(column) = column else {
            if current.constant(row).abs() < eps {
                sink.paragraph(&format!(
                    "Zero row {} has no non-zero coefficient and a zero constant; the equation is redundant.",
                    label
                ));
                continue;
            }
            sink.paragraph(&format!(
                "Zero row {} reads 0 = {}. The constraint system is contradictory.",
                label,
                format_number(current.constant(row), precision)
            ));
            info!(row = %label, "contradictory zero row");
            return Err(PivotError::Infeasible {
                row: label.name(),
            });
        };

        let pivot_value = current.value(row, column);
        sink.paragraph(&format!(
            "Zero row {}: pivot on its largest coefficient {} in column {}.",
            label,
            format_number(pivot_value, precision),
            current.col_label(column).column_header()
        ));
        sink.table(current.snapshot().with_pivot(row, column));
        debug!(row, column, pivot_value, "zero row eliminated");
        current = apply_pivot(&current, row, column, eps, sink)?;
        pivots += 1;
    }

    if pivots > 0 {
        sink.paragraph(&format!(
            "All zero rows are eliminated after {} pivot(s).",
            pivots
        ));
        sink.table(current.snapshot());
    }
    Ok(PhaseOutcome {
        tableau: current,
        pivots,
    })
}

/// Constraint row with the most negative constant, lowest index on ties.
pub fn most_negative_row(tableau: &Tableau, epsilon: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 0..tableau.num_rows() {
        let b = tableau.constant(i);
        if b < -epsilon && best.is_none_or(|(_, min)| b < min) {
            best = Some((i, b));
        }
    }
    best.map(|(i, _)| i)
}

/// Pivot for one feasibility step out of `source_row`.
///
/// The entering column is the first non-blocked column with a coefficient below
/// `-epsilon` in the source row; when there is none the row can never become
/// non-negative and the system is infeasible.
pub fn select_feasibility_pivot(
    tableau: &Tableau,
    source_row: usize,
    rule: FeasibilityRule,
    epsilon: f64,
    precision: usize,
) -> Result<PivotChoice> {
    let fmt = |v: f64| format_number(v, precision);
    let source = tableau.row_label(source_row);
    let source_constant = tableau.constant(source_row);

    let column = (0..tableau.num_cols())
        .find(|&j| !tableau.is_blocked(j) && tableau.value(source_row, j) < -epsilon)
        .ok_or_else(|| PivotError::Infeasible {
            row: source.name(),
        })?;
    let entering = tableau.col_label(column).column_header();

    let (row, why_row) = match rule {
        FeasibilityRule::FirstNegative => (
            source_row,
            format!("the pivot is taken in row {} itself", source),
        ),
        FeasibilityRule::RatioTest => {
            let mut best: Option<(usize, f64)> = None;
            for i in 0..tableau.num_rows() {
                let a = tableau.value(i, column);
                let b = tableau.constant(i);
                let ratio = if a > epsilon && b >= -epsilon {
                    b.max(0.0) / a
                } else if a < -epsilon && b < -epsilon {
                    b / a
                } else {
                    continue;
                };
                if best.is_none_or(|(_, min)| ratio < min - epsilon) {
                    best = Some((i, ratio));
                }
            }
            // the source row itself always qualifies
            let (row, ratio) = best.unwrap_or((source_row, source_constant / tableau.value(source_row, column)));
            (
                row,
                format!(
                    "the minimum ratio {} selects row {}",
                    fmt(ratio),
                    tableau.row_label(row)
                ),
            )
        }
    };

    Ok(PivotChoice {
        row,
        column,
        pivot_value: tableau.value(row, column),
        reason: format!(
            "Row {} has the negative constant {}; column {} is the first with a negative coefficient ({}), and {}.",
            source,
            fmt(source_constant),
            entering,
            fmt(tableau.value(source_row, column)),
            why_row
        ),
    })
}

/// Phase I: pivot until every constraint constant is at least `-epsilon`.
///
/// The source row is the one with the most negative constant and stays the
/// source until its own constant is no longer negative.
pub fn phase_one(
    tableau: &Tableau,
    config: &SolverConfig,
    sink: &mut dyn ProtocolSink,
) -> Result<PhaseOutcome> {
    let eps = config.epsilon;
    let mut current = tableau.clone();
    let mut pivots = 0;
    let mut source: Option<usize> = None;

    sink.heading(3, "Search for a feasible basic solution");
    loop {
        source = match source {
            Some(row) if current.constant(row) < -eps => Some(row),
            _ => most_negative_row(&current, eps),
        };
        let Some(source_row) = source else {
            sink.paragraph("All constants are non-negative: the basic solution is feasible.");
            info!(pivots, "feasible basic solution found");
            return Ok(PhaseOutcome {
                tableau: current,
                pivots,
            });
        };

        let choice = match select_feasibility_pivot(
            &current,
            source_row,
            config.feasibility_rule,
            eps,
            config.precision,
        ) {
            Ok(choice) => choice,
            Err(err) => {
                sink.paragraph(&format!(
                    "Row {} has a negative constant but no negative coefficient. The constraint system is infeasible.",
                    current.row_label(source_row)
                ));
                sink.table(current.snapshot());
                info!(row = %current.row_label(source_row), "infeasible");
                return Err(err);
            }
        };

        if pivots == config.max_simplex_steps {
            return Err(limit_exceeded(Stage::Feasibility, config, &current, sink));
        }

        pivots += 1;
        record_step(sink, pivots, &choice, &current);
        debug!(row = choice.row, column = choice.column, pivot = choice.pivot_value, "phase I pivot");
        current = apply_pivot(&current, choice.row, choice.column, eps, sink)?;
    }
}

/// Pivot for one optimality step, or `None` when the tableau is optimal.
///
/// The entering column has the largest positive objective coefficient (leftmost
/// on ties, blocked columns excluded); the leaving row wins the minimum-ratio
/// test over rows with a positive entry (lowest row on ties).
pub fn select_optimality_pivot(
    tableau: &Tableau,
    epsilon: f64,
    precision: usize,
) -> Result<Option<PivotChoice>> {
    let fmt = |v: f64| format_number(v, precision);
    let mut entering: Option<(usize, f64)> = None;
    for j in 0..tableau.num_cols() {
        let c = tableau.objective_coeff(j);
        if !tableau.is_blocked(j) && c > epsilon && entering.is_none_or(|(_, max)| c > max) {
            entering = Some((j, c));
        }
    }
    let Some((column, coeff)) = entering else {
        return Ok(None);
    };

    let mut leaving: Option<(usize, f64)> = None;
    for i in 0..tableau.num_rows() {
        let a = tableau.value(i, column);
        if a > epsilon {
            let ratio = tableau.constant(i) / a;
            if leaving.is_none_or(|(_, min)| ratio < min - epsilon) {
                leaving = Some((i, ratio));
            }
        }
    }
    let Some((row, ratio)) = leaving else {
        return Err(PivotError::Unbounded {
            column: tableau.col_label(column).column_header(),
        });
    };

    Ok(Some(PivotChoice {
        row,
        column,
        pivot_value: tableau.value(row, column),
        reason: format!(
            "Column {} has the largest positive objective coefficient {}; the minimum ratio {} selects row {}.",
            tableau.col_label(column).column_header(),
            fmt(coeff),
            fmt(ratio),
            tableau.row_label(row)
        ),
    }))
}

/// Whether no non-blocked column has an objective coefficient above `epsilon`.
pub fn is_optimal(tableau: &Tableau, epsilon: f64) -> bool {
    (0..tableau.num_cols()).all(|j| tableau.is_blocked(j) || tableau.objective_coeff(j) <= epsilon)
}

/// Phase II: pivot until no improving column remains.
pub fn phase_two(
    tableau: &Tableau,
    config: &SolverConfig,
    sink: &mut dyn ProtocolSink,
) -> Result<PhaseOutcome> {
    let eps = config.epsilon;
    let mut current = tableau.clone();
    let mut pivots = 0;

    sink.heading(3, "Search for an optimal solution");
    loop {
        let choice = match select_optimality_pivot(&current, eps, config.precision) {
            Ok(Some(choice)) => choice,
            Ok(None) => {
                sink.paragraph("No objective coefficient is positive: the solution is optimal.");
                info!(pivots, "optimal solution found");
                return Ok(PhaseOutcome {
                    tableau: current,
                    pivots,
                });
            }
            Err(err) => {
                sink.paragraph(&format!(
                    "Column {} improves the objective but has no positive entry to limit it. The objective is unbounded.",
                    match &err {
                        PivotError::Unbounded { column } => column.as_str(),
                        _ => "?",
                    }
                ));
                sink.table(current.snapshot());
                info!(%err, "unbounded");
                return Err(err);
            }
        };

        if pivots == config.max_simplex_steps {
            return Err(limit_exceeded(Stage::Optimality, config, &current, sink));
        }

        pivots += 1;
        record_step(sink, pivots, &choice, &current);
        debug!(row = choice.row, column = choice.column, pivot = choice.pivot_value, "phase II pivot");
        current = apply_pivot(&current, choice.row, choice.column, eps, sink)?;
    }
}

/// Maximise `W = -Σ a_i` over the artificial variables of a feasible tableau.
///
/// The objective row is replaced by the sum of the basic artificial rows, so
/// phase II drives the artificial variables towards zero. The constraints are
/// feasible exactly when none of them stays positive at the optimum.
pub fn minimize_artificials(
    tableau: &Tableau,
    config: &SolverConfig,
    sink: &mut dyn ProtocolSink,
) -> Result<PhaseOutcome> {
    let mut row = vec![0.0; tableau.num_cols() + 1];
    for i in 0..tableau.num_rows() {
        if tableau.row_label(i).is_artificial() {
            for (w, a) in row.iter_mut().zip(&tableau.cells()[i]) {
                *w += a;
            }
        }
    }
    // non-basic artificials stay at zero
    for (w, label) in row.iter_mut().zip(tableau.col_labels()) {
        if label.is_artificial() {
            *w = -1.0;
        }
    }

    let auxiliary = tableau.with_objective_row(row)?;
    sink.paragraph("The objective row is replaced by W' = -(sum of the artificial variables).");
    sink.table(auxiliary.snapshot().with_caption("Tableau with the artificial objective"));
    phase_two(&auxiliary, config, sink)
}

/// Pivot at `(row, column)`, explaining a rejected pivot in the protocol.
fn apply_pivot(
    current: &Tableau,
    row: usize,
    column: usize,
    eps: f64,
    sink: &mut dyn ProtocolSink,
) -> Result<Tableau> {
    current.pivot(row, column, eps).inspect_err(|err| {
        sink.paragraph(&format!("The pivot cannot be taken: {}.", err));
        sink.table(current.snapshot());
        warn!(%err, "pivot rejected");
    })
}

fn record_step(sink: &mut dyn ProtocolSink, step: usize, choice: &PivotChoice, before: &Tableau) {
    sink.heading(4, &format!("Step #{}", step));
    sink.paragraph(&choice.reason);
    sink.table(before.snapshot().with_pivot(choice.row, choice.column));
}

fn limit_exceeded(
    stage: Stage,
    config: &SolverConfig,
    current: &Tableau,
    sink: &mut dyn ProtocolSink,
) -> PivotError {
    let limit = config.max_simplex_steps;
    warn!(%stage, limit, "iteration limit exceeded");
    sink.paragraph(&format!(
        "The {} stopped after {} pivots without terminating.",
        stage, limit
    ));
    sink.table(current.snapshot());
    PivotError::IterationLimitExceeded { stage, limit }
}
