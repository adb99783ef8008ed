//! Subcommand execution and result printing.

use crate::input::{MatrixInput, read_document};
use crate::{Command, OutputFormat, Verbosity};
use anyhow::{Context, Result};
use pivotlab_core::{PivotError, Protocol, ProtocolEntry, SolverConfig, TableSnapshot, format_number};
use pivotlab_lp::{DualProblem, LinearProblem, SimplexSolver};
use pivotlab_math::GaussJordan;
use serde::Serialize;
use tracing::debug;

/// How a command ended, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The computation produced a result.
    Success,
    /// The computation ended in a domain failure (infeasible, singular, ...).
    Failure,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
        }
    }
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: SolverConfig,
    pub format: OutputFormat,
    pub verbosity: Verbosity,
}

/// JSON report of one run.
#[derive(Debug, Serialize)]
struct Report<'a, T: Serialize> {
    command: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    protocol: &'a [ProtocolEntry],
}

/// Run one subcommand. I/O and parse failures are returned as errors.
pub fn run(command: &Command, ctx: &RunContext) -> Result<Outcome> {
    match command {
        Command::Simplex {
            file,
            integer,
            big_m,
            duals,
        } => {
            let problem: LinearProblem = read_document(file)?;
            let mut config = ctx.config.clone();
            if *big_m {
                config.initial_basis = pivotlab_core::InitialBasis::BigM;
            }
            debug!(?config, integer, "running simplex");

            let mut solver = SimplexSolver::new(config);
            let mut protocol = Protocol::new();
            let result = if *integer {
                solver.solve_integer(&problem, &mut protocol)
            } else {
                solver.solve(&problem, &mut protocol)
            };
            let result = result.map(|mut solution| {
                if !duals {
                    solution.dual_values = None;
                }
                solution
            });

            if ctx.verbosity >= Verbosity::Verbose {
                let stats = solver.stats();
                eprintln!(
                    "pivots: {} (zero rows {}, phase I {}, phase II {}), cuts: {}",
                    stats.total_pivots(),
                    stats.zero_row_pivots,
                    stats.feasibility_pivots,
                    stats.optimality_pivots,
                    stats.gomory.cuts_generated
                );
            }
            let is_minimize = problem.is_minimize();
            emit(ctx, "simplex", &protocol, result, |solution| {
                solution.describe(is_minimize, ctx.config.precision)
            })
        }
        Command::Dual { file } => {
            let problem: LinearProblem = read_document(file)?;
            let dual = DualProblem::from_primal(&problem);
            match ctx.format {
                OutputFormat::Text => {
                    if ctx.verbosity > Verbosity::Quiet {
                        println!("Primal problem:\n{}\n", problem);
                        println!("Dual problem:");
                    }
                    println!("{}", dual);
                }
                OutputFormat::Json => {
                    let report = Report {
                        command: "dual",
                        status: "ok",
                        result: Some(&dual),
                        error: None,
                        protocol: &[],
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
            Ok(Outcome::Success)
        }
        Command::Inverse { file } => {
            let input: MatrixInput = read_document(file)?;
            let mut protocol = Protocol::new();
            let result = GaussJordan::from_config(&ctx.config).inverse(&input.matrix, &mut protocol);
            emit(ctx, "inverse", &protocol, result, |inverse| {
                TableSnapshot::from_matrix(inverse).render(ctx.config.precision)
            })
        }
        Command::Rank { file } => {
            let input: MatrixInput = read_document(file)?;
            let mut protocol = Protocol::new();
            let result = GaussJordan::from_config(&ctx.config).rank(&input.matrix, &mut protocol);
            emit(ctx, "rank", &protocol, result, |rank| format!("rank = {}", rank))
        }
        Command::Solve { file, via_inverse } => {
            let input: MatrixInput = read_document(file)?;
            let rhs = input
                .rhs
                .with_context(|| format!("{} has no `rhs` vector", file.display()))?;
            let gauss_jordan = GaussJordan::from_config(&ctx.config);
            let mut protocol = Protocol::new();
            let result = if *via_inverse {
                gauss_jordan.solve_via_inverse(&input.matrix, &rhs, &mut protocol)
            } else {
                gauss_jordan.solve(&input.matrix, &rhs, &mut protocol)
            };
            emit(ctx, "solve", &protocol, result, |x| {
                let values: Vec<String> = x
                    .iter()
                    .map(|&v| format_number(v, ctx.config.precision))
                    .collect();
                format!("X = ({})", values.join("; "))
            })
        }
    }
}

/// Print the protocol and the result (or the failure) in the requested format.
fn emit<T: Serialize>(
    ctx: &RunContext,
    command: &str,
    protocol: &Protocol,
    result: pivotlab_core::Result<T>,
    summary: impl Fn(&T) -> String,
) -> Result<Outcome> {
    let outcome = if result.is_ok() {
        Outcome::Success
    } else {
        Outcome::Failure
    };

    match ctx.format {
        OutputFormat::Text => {
            if ctx.verbosity > Verbosity::Quiet {
                println!("{}", protocol.render_text(ctx.config.precision));
                println!();
            }
            match &result {
                Ok(value) => println!("{}", summary(value)),
                Err(err) => print_failure(err),
            }
        }
        OutputFormat::Json => {
            let (status, value, error) = match result {
                Ok(value) => ("ok", Some(value), None),
                Err(err) => (err.kind(), None, Some(err.to_string())),
            };
            let report = Report {
                command,
                status,
                result: value,
                error,
                protocol: protocol.entries(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(outcome)
}

fn print_failure(err: &PivotError) {
    eprintln!("error: {}", err);
}
