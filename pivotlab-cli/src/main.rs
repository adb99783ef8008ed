//! pivotlab CLI - Simplex and Gauss-Jordan protocols from the command line

mod commands;
mod input;

use clap::{Parser, Subcommand, ValueEnum};
use pivotlab_core::SolverConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{RunContext, run};

/// Exit code for unreadable or malformed input.
const EXIT_INPUT_ERROR: u8 = 2;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CliConfig {
    /// Default verbosity level
    #[serde(default)]
    verbosity: Option<String>,
    /// Default output format
    #[serde(default)]
    format: Option<String>,
    /// Solver constants
    #[serde(default)]
    solver: Option<SolverConfig>,
}

impl CliConfig {
    /// Default location: `<config_dir>/pivotlab/config.yaml`
    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("pivotlab");
            p.push("config.yaml");
            p
        })
    }

    /// Load an explicitly requested configuration file.
    fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", path.display(), e))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("failed to parse config {}: {}", path.display(), e))
    }

    /// Load the default configuration file, ignoring a missing or broken one
    fn load() -> Self {
        if let Some(path) = Self::default_path()
            && path.exists()
            && let Ok(contents) = fs::read_to_string(&path)
            && let Ok(config) = serde_yaml::from_str(&contents)
        {
            return config;
        }

        Self::default()
    }

    /// Merge configuration with command-line arguments
    fn merge_with_args(&self, args: &mut Args) -> SolverConfig {
        // Only apply config if arg is not explicitly set
        if args.verbosity == Verbosity::Normal
            && let Some(ref v) = self.verbosity
        {
            match v.as_str() {
                "quiet" => args.verbosity = Verbosity::Quiet,
                "verbose" => args.verbosity = Verbosity::Verbose,
                "debug" => args.verbosity = Verbosity::Debug,
                "trace" => args.verbosity = Verbosity::Trace,
                _ => {}
            }
        }

        if args.format == OutputFormat::Text
            && let Some(ref f) = self.format
            && f == "json"
        {
            args.format = OutputFormat::Json;
        }

        let mut config = self.solver.clone().unwrap_or_default();
        if let Some(epsilon) = args.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(steps) = args.max_steps {
            config.max_simplex_steps = steps;
        }
        if let Some(rounds) = args.max_gomory {
            config.max_gomory_iterations = rounds;
        }
        if let Some(precision) = args.precision {
            config.precision = precision;
        }
        config
    }
}

/// Output format for results
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain-text protocol followed by the result (default)
    Text,
    /// JSON report with the result and the structured protocol
    Json,
}

/// Verbosity level
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Result only
    Quiet,
    /// Protocol and result
    Normal,
    /// Also pivot statistics and info logs
    Verbose,
    /// Debug logs
    Debug,
    /// Trace logs
    Trace,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Solve a linear program with the simplex method
    Simplex {
        /// Problem file (JSON or YAML)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Restrict every variable to integers (Gomory cuts)
        #[arg(long)]
        integer: bool,
        /// Build the initial basis with the Big-M method
        #[arg(long)]
        big_m: bool,
        /// Report the dual values (shadow prices)
        #[arg(long)]
        duals: bool,
    },
    /// Print the dual of a linear program
    Dual {
        /// Problem file (JSON or YAML)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Invert a square matrix with Gauss-Jordan elimination
    Inverse {
        /// Matrix file (JSON or YAML)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Compute the rank of a matrix
    Rank {
        /// Matrix file (JSON or YAML)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Solve the linear system `A x = b`
    Solve {
        /// Matrix file with `matrix` and `rhs` (JSON or YAML)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Compute `x = A^-1 b` instead of eliminating `[A | b]`
        #[arg(long)]
        via_inverse: bool,
    },
}

/// pivotlab - step-by-step simplex and Gauss-Jordan protocols
#[derive(Parser, Debug, Clone)]
#[command(name = "pivotlab")]
#[command(version)]
#[command(about = "Simplex tableaux, Gomory cuts and Gauss-Jordan elimination with full protocols")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Verbosity level
    #[arg(short, long, value_enum, default_value = "normal", global = true)]
    verbosity: Verbosity,

    /// Enable quiet mode (equivalent to --verbosity quiet)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (default: <config dir>/pivotlab/config.yaml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Zero tolerance
    #[arg(long, global = true)]
    epsilon: Option<f64>,

    /// Iteration cap of each simplex phase
    #[arg(long, global = true)]
    max_steps: Option<usize>,

    /// Cap on Gomory cutting-plane rounds
    #[arg(long, global = true)]
    max_gomory: Option<usize>,

    /// Decimal places in the protocol
    #[arg(long, global = true)]
    precision: Option<usize>,
}

fn main() -> ExitCode {
    let mut args = Args::parse();

    // Load configuration file and merge with args
    let file_config = match &args.config {
        Some(path) => match CliConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(EXIT_INPUT_ERROR);
            }
        },
        None => CliConfig::load(),
    };
    let config = file_config.merge_with_args(&mut args);
    if let Err(e) = config.validate() {
        eprintln!("error: {}", e);
        return ExitCode::from(EXIT_INPUT_ERROR);
    }

    // Determine verbosity level
    let verbosity = if args.quiet {
        Verbosity::Quiet
    } else {
        args.verbosity
    };

    // Set up logging
    if verbosity >= Verbosity::Verbose {
        let level = match verbosity {
            Verbosity::Trace => Level::TRACE,
            Verbosity::Debug => Level::DEBUG,
            _ => Level::INFO,
        };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to set tracing subscriber: {}", e);
            return ExitCode::from(EXIT_INPUT_ERROR);
        }
    }

    let ctx = RunContext {
        config,
        format: args.format,
        verbosity,
    };
    match run(&args.command, &ctx) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}
