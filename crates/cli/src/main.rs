// pgrid - peer-review reconciliation, headless
// Reads an already-fetched LMS snapshot and writes assessment + overview CSVs.

mod exit_codes;
mod logging;
mod review;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "pgrid")]
#[command(about = "Reconcile peer-review rosters, pairings and rubric assessments into tables")]
#[command(version, long_version = long_version())]
struct Cli {
    /// Debug-level logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Explicit log filter (e.g. "info", "peergrid_review=debug")
    #[arg(long, global = true, env = "PGRID_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the assessment and overview tables from a review config
    #[command(after_help = "\
Examples:
  pgrid build review.toml
  pgrid build review.toml --out-dir ./out --no-timestamp
  pgrid build review.toml --include-comments --json")]
    Build {
        /// Path to the review .toml config file
        config: PathBuf,

        /// Output directory (overrides output.dir, relative to cwd)
        #[arg(long, short = 'o')]
        out_dir: Option<PathBuf>,

        /// Print the full result as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Attach reviewer comments to each assessment row
        #[arg(long)]
        include_comments: bool,

        /// Write directly into the output directory, no timestamped subdirectory
        #[arg(long)]
        no_timestamp: bool,
    },

    /// Validate a review config and its input snapshot without writing output
    #[command(after_help = "\
Examples:
  pgrid check review.toml")]
    Check {
        /// Path to the review .toml config file
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  peergrid-review ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref()) {
        eprintln!("error: cannot initialise logging: {e}");
        return ExitCode::from(EXIT_ERROR);
    }

    let result = match cli.command {
        Commands::Build { config, out_dir, json, include_comments, no_timestamp } => {
            let overrides = review::BuildOverrides { out_dir, include_comments, no_timestamp };
            review::cmd_build(config, json, overrides)
        }
        Commands::Check { config } => review::cmd_check(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
