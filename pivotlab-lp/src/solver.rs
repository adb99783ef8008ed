//! Simplex solver orchestration.
//!
//! A run transforms the problem into its initial tableau, eliminates zero
//! rows, runs phase I and phase II and reads the solution off the terminal
//! tableau. The integer variant then keeps appending Gomory cuts and
//! re-optimising until every decision variable is integral.

use crate::gomory::{
    GomoryStats, append_cut, build_cut_row, is_integer_solution, select_cut_source_row,
};
use crate::phases::{eliminate_zero_rows, minimize_artificials, phase_one, phase_two};
use crate::problem::{LinearProblem, format_terms};
use crate::solution::{SolutionRecord, check_artificials, extract_duals, extract_solution};
use crate::tableau::Tableau;
use crate::transform::{CanonicalForm, canonical_form, objective_equation};
use pivotlab_core::{
    InitialBasis, PivotError, ProtocolSink, Result, SolverConfig, Stage, format_number,
    is_integral,
};
use tracing::{info, warn};

/// Pivot counts of the last run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Pivots spent eliminating zero rows.
    pub zero_row_pivots: usize,
    /// Pivots spent in phase I (initial run only).
    pub feasibility_pivots: usize,
    /// Pivots spent in phase II (initial run only).
    pub optimality_pivots: usize,
    /// Cutting-plane statistics of an integer run.
    pub gomory: GomoryStats,
}

impl SolveStats {
    /// Total number of pivots.
    pub fn total_pivots(&self) -> usize {
        self.zero_row_pivots
            + self.feasibility_pivots
            + self.optimality_pivots
            + self.gomory.reoptimization_pivots
    }
}

/// Simplex method on the compact Jordan-exclusion tableau.
#[derive(Debug, Clone, Default)]
pub struct SimplexSolver {
    config: SolverConfig,
    stats: SolveStats,
}

impl SimplexSolver {
    /// Create a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            stats: SolveStats::default(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Statistics of the last run.
    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Solve the continuous problem; the record carries the dual values.
    pub fn solve(
        &mut self,
        problem: &LinearProblem,
        sink: &mut dyn ProtocolSink,
    ) -> Result<SolutionRecord> {
        self.stats = SolveStats::default();
        sink.heading(1, "Simplex method");
        self.validate(problem, sink)?;
        info!(
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            strategy = ?self.config.initial_basis,
            "solving linear problem"
        );

        let form = self.prepare(problem, sink)?;
        let tableau = self.optimize(&form, sink)?;

        let mut solution = extract_solution(
            &tableau,
            form.num_variables,
            form.is_minimize,
            self.config.epsilon,
        );
        solution.dual_values = Some(extract_duals(&tableau, &form, self.config.epsilon));
        self.record_solution(&solution, form.is_minimize, sink);
        info!(objective = solution.objective_value, "linear problem solved");
        Ok(solution)
    }

    /// Solve with every decision variable restricted to integers.
    ///
    /// Fails with [`PivotError::IterationLimitExceeded`] in the
    /// [`Stage::Gomory`] stage when `max_gomory_iterations` cuts do not
    /// reach an integral vertex.
    pub fn solve_integer(
        &mut self,
        problem: &LinearProblem,
        sink: &mut dyn ProtocolSink,
    ) -> Result<SolutionRecord> {
        self.stats = SolveStats::default();
        sink.heading(1, "Simplex method with Gomory cuts");
        self.validate(problem, sink)?;
        info!(
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            "solving integer problem"
        );

        let form = self.prepare(problem, sink)?;
        let mut tableau = self.optimize(&form, sink)?;
        let eps = self.config.epsilon;
        let limit = self.config.max_gomory_iterations;

        let mut round = 0;
        loop {
            let solution = extract_solution(&tableau, form.num_variables, form.is_minimize, eps);
            let source = if is_integer_solution(&solution.decision_values, eps) {
                None
            } else {
                select_cut_source_row(&tableau, eps)
            };
            let Some(source_row) = source else {
                sink.paragraph(&format!(
                    "Every decision variable is integral after {} cut(s).",
                    round
                ));
                self.record_solution(&solution, form.is_minimize, sink);
                info!(cuts = round, objective = solution.objective_value, "integer optimum found");
                return Ok(solution);
            };

            if round == limit {
                warn!(stage = %Stage::Gomory, limit, "iteration limit exceeded");
                sink.paragraph(&format!(
                    "The {} stopped after {} cuts without reaching an integral solution.",
                    Stage::Gomory,
                    limit
                ));
                return Err(PivotError::IterationLimitExceeded {
                    stage: Stage::Gomory,
                    limit,
                });
            }

            tableau = self.cut(&tableau, form.strategy, source_row, round, sink)?;
            round += 1;
        }
    }

    /// Reject an invalid configuration or problem with a protocol note.
    fn validate(&self, problem: &LinearProblem, sink: &mut dyn ProtocolSink) -> Result<()> {
        self.config
            .validate()
            .and_then(|()| problem.validate())
            .inspect_err(|err| {
                sink.paragraph(&format!("The input is rejected: {}.", err));
                warn!(%err, "input rejected");
            })
    }

    /// Record the statement and build the initial tableau.
    fn prepare(
        &self,
        problem: &LinearProblem,
        sink: &mut dyn ProtocolSink,
    ) -> Result<CanonicalForm> {
        sink.heading(2, "Problem");
        sink.preformatted(&problem.to_string());

        let form = canonical_form(problem, &self.config).inspect_err(|err| {
            sink.paragraph(&format!("The initial tableau cannot be built: {}.", err));
        })?;
        let strategy = match form.strategy {
            InitialBasis::JordanExclusion => "Jordan exclusion",
            InitialBasis::BigM => "Big-M",
        };
        sink.heading(2, "Initial tableau");
        sink.paragraph(&format!(
            "Basic variables expressed through the non-basic ones ({} basis):",
            strategy
        ));
        let mut equations = form.row_equations();
        equations.push(objective_equation(&form.tableau));
        sink.preformatted(&equations.join("\n"));
        sink.table(form.tableau.snapshot().with_caption("Initial tableau"));
        Ok(form)
    }

    /// Zero rows, then phase I and phase II.
    fn optimize(&mut self, form: &CanonicalForm, sink: &mut dyn ProtocolSink) -> Result<Tableau> {
        let mut tableau = form.tableau.clone();

        if form.strategy == InitialBasis::JordanExclusion {
            let outcome = eliminate_zero_rows(&tableau, &self.config, sink)?;
            self.stats.zero_row_pivots = outcome.pivots;
            tableau = outcome.tableau;
        }

        let (tableau, feasibility, optimality) = self.run_phases(&tableau, form.strategy, sink)?;
        self.stats.feasibility_pivots = feasibility;
        self.stats.optimality_pivots = optimality;
        Ok(tableau)
    }

    /// Phase I and phase II, returning the terminal tableau and both pivot counts.
    ///
    /// A Big-M run must end with every artificial variable at zero. When its
    /// penalised objective turns out unbounded, the artificial variables are
    /// minimised first: the problem is infeasible if one of them stays
    /// positive and unbounded otherwise.
    fn run_phases(
        &self,
        tableau: &Tableau,
        strategy: InitialBasis,
        sink: &mut dyn ProtocolSink,
    ) -> Result<(Tableau, usize, usize)> {
        let feasible = phase_one(tableau, &self.config, sink)?;
        let optimal = match phase_two(&feasible.tableau, &self.config, sink) {
            Err(err @ PivotError::Unbounded { .. }) if strategy == InitialBasis::BigM => {
                self.confirm_feasible(&feasible.tableau, sink)?;
                return Err(err);
            }
            other => other?,
        };

        if strategy == InitialBasis::BigM {
            self.reject_artificials(&optimal.tableau, sink)?;
        }
        Ok((optimal.tableau, feasible.pivots, optimal.pivots))
    }

    /// Fail with [`PivotError::Infeasible`] unless the Big-M tableau admits a
    /// solution of the original constraints.
    fn confirm_feasible(&self, tableau: &Tableau, sink: &mut dyn ProtocolSink) -> Result<()> {
        if check_artificials(tableau, self.config.epsilon).is_ok() {
            return Ok(());
        }
        sink.paragraph(
            "The penalised objective is unbounded while an artificial variable is still positive. \
             The artificial variables are minimised to decide whether the constraints admit a solution.",
        );
        let outcome = minimize_artificials(tableau, &self.config, sink)?;
        self.reject_artificials(&outcome.tableau, sink)?;
        sink.paragraph("Every artificial variable reaches zero: the constraints are feasible.");
        Ok(())
    }

    fn reject_artificials(&self, tableau: &Tableau, sink: &mut dyn ProtocolSink) -> Result<()> {
        check_artificials(tableau, self.config.epsilon).inspect_err(|err| {
            sink.paragraph(&format!(
                "An artificial variable remains positive at the optimum ({}). The constraint system is infeasible.",
                err
            ));
            info!(%err, "artificial variable left in basis");
        })
    }

    /// Append one cut derived from `source_row` and re-optimise.
    fn cut(
        &mut self,
        tableau: &Tableau,
        strategy: InitialBasis,
        source_row: usize,
        round: usize,
        sink: &mut dyn ProtocolSink,
    ) -> Result<Tableau> {
        let eps = self.config.epsilon;
        let precision = self.config.precision;

        sink.heading(2, &format!("Gomory cut #{}", round + 1));
        let fractional: Vec<String> = (0..tableau.num_rows())
            .filter(|&i| tableau.row_label(i).is_decision())
            .filter(|&i| !is_integral(tableau.constant(i), eps))
            .map(|i| {
                format!(
                    "{} = {}",
                    tableau.row_label(i),
                    format_number(tableau.constant(i), precision)
                )
            })
            .collect();
        sink.paragraph(&format!(
            "The solution is not integral: {}.",
            fractional.join(", ")
        ));

        let cut = build_cut_row(tableau, source_row, round, eps);
        sink.paragraph(&format!(
            "Row {} has the largest fractional part {}; it generates the cut:",
            tableau.row_label(source_row),
            format_number(-cut.constant, precision)
        ));
        let terms = cut
            .coeffs
            .iter()
            .enumerate()
            .map(|(j, &a)| (-a, tableau.col_label(j).name()));
        sink.preformatted(&format!(
            "{} = {} >= 0",
            cut.label,
            format_terms(terms, cut.constant)
        ));

        let next = append_cut(tableau, &cut).inspect_err(|err| {
            sink.paragraph(&format!("The cut cannot be appended: {}.", err));
        })?;
        sink.table(next.snapshot().with_caption("Tableau with the cut appended"));
        self.stats.gomory.cuts_generated += 1;

        let (reoptimized, feasibility, optimality) = self.run_phases(&next, strategy, sink)?;
        self.stats.gomory.reoptimization_pivots += feasibility + optimality;
        Ok(reoptimized)
    }

    fn record_solution(
        &self,
        solution: &SolutionRecord,
        is_minimize: bool,
        sink: &mut dyn ProtocolSink,
    ) {
        sink.heading(2, "Solution");
        sink.preformatted(&solution.describe(is_minimize, self.config.precision));
    }
}
