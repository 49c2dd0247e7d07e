//! `pgrid build` and `pgrid check`: config-driven peer-review reconciliation.

use std::fs::File;
use std::path::{Path, PathBuf};

use peergrid_review::ingest::{ingest_snapshot, Snapshot};
use peergrid_review::{ReviewConfig, ReviewError, ReviewInput, Table};

use crate::exit_codes::{review_exit_code, EXIT_CONFIG_INVALID, EXIT_ERROR, EXIT_INPUT, EXIT_OUTPUT};
use crate::CliError;

pub const ASSESSMENTS_FILE: &str = "peer_review_assessments.csv";
pub const OVERVIEW_FILE: &str = "peer_review_overview.csv";

fn review_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn engine_err(err: ReviewError) -> CliError {
    let hint = match &err {
        ReviewError::MissingRubric { .. } => {
            Some("set inputs.rubric to the rubric file that holds these assessments".to_string())
        }
        ReviewError::EmptyRoster => Some("check inputs.roster points at the course user list".to_string()),
        _ => None,
    };
    CliError { code: review_exit_code(&err), message: err.to_string(), hint }
}

/// Overrides given on the command line.
#[derive(Debug, Default)]
pub struct BuildOverrides {
    pub out_dir: Option<PathBuf>,
    pub include_comments: bool,
    pub no_timestamp: bool,
}

fn load_config(config_path: &Path) -> Result<ReviewConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| review_err(EXIT_CONFIG_INVALID, format!("cannot read config: {e}")))?;
    ReviewConfig::from_toml(&config_str).map_err(engine_err)
}

fn read_input_file(base_dir: &Path, file: &str) -> Result<String, CliError> {
    let path = base_dir.join(file);
    std::fs::read_to_string(&path)
        .map_err(|e| review_err(EXIT_INPUT, format!("cannot read {}: {e}", path.display())))
}

/// Read every snapshot file named in the config, relative to `base_dir`.
fn load_input(config: &ReviewConfig, base_dir: &Path) -> Result<ReviewInput, CliError> {
    let inputs = &config.inputs;
    let roster = read_input_file(base_dir, &inputs.roster)?;
    let pairings = read_input_file(base_dir, &inputs.pairings)?;
    let rubric = inputs
        .rubric
        .as_deref()
        .map(|f| read_input_file(base_dir, f))
        .transpose()?;
    let comments = inputs
        .comments
        .as_deref()
        .map(|f| read_input_file(base_dir, f))
        .transpose()?;

    ingest_snapshot(Snapshot {
        roster: &roster,
        pairings: &pairings,
        rubric: rubric.as_deref(),
        comments: comments.as_deref(),
    })
    .map_err(engine_err)
}

/// `{name}({mm-dd-YYYY, HH.MM.SS})`, with path separators removed from the name.
pub fn run_dir_name(name: &str, at: chrono::DateTime<chrono::Local>) -> String {
    let safe: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect();
    format!("{}({})", safe.trim(), at.format("%m-%d-%Y, %H.%M.%S"))
}

fn write_table(table: &Table, path: &Path) -> Result<(), CliError> {
    let file = File::create(path)
        .map_err(|e| review_err(EXIT_OUTPUT, format!("cannot create {}: {e}", path.display())))?;
    table
        .write_csv(file)
        .map_err(|e| review_err(EXIT_OUTPUT, format!("cannot write {}: {e}", path.display())))
}

pub fn cmd_build(config_path: PathBuf, json_output: bool, overrides: BuildOverrides) -> Result<(), CliError> {
    let mut config = load_config(&config_path)?;
    if overrides.include_comments {
        config.options.include_comments = true;
    }
    if overrides.no_timestamp {
        config.output.timestamped = false;
    }

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input = load_input(&config, base_dir)?;

    let result = peergrid_review::run(&config, &input).map_err(engine_err)?;

    let mut out_dir = overrides.out_dir.unwrap_or_else(|| base_dir.join(&config.output.dir));
    if config.output.timestamped {
        out_dir = out_dir.join(run_dir_name(&config.name, chrono::Local::now()));
    }
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| review_err(EXIT_OUTPUT, format!("cannot create {}: {e}", out_dir.display())))?;

    let assessments_path = out_dir.join(ASSESSMENTS_FILE);
    let overview_path = out_dir.join(OVERVIEW_FILE);
    write_table(&result.assessments.to_table(), &assessments_path)?;
    eprintln!("wrote {}", assessments_path.display());
    write_table(&result.overview.to_table(), &overview_path)?;
    eprintln!("wrote {}", overview_path.display());

    if json_output {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| review_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "'{}': {} pairings ({} completed, {} assessed), {} participants, up to {} review(s) each",
        result.meta.name,
        s.pairings,
        s.completed,
        s.assessed,
        s.participants,
        s.max_reviews_received,
    );
    if s.invalid_rows > 0 {
        eprintln!("warning: {} row(s) contained invalid rubric data", s.invalid_rows);
    }
    if s.unresolved_names > 0 {
        eprintln!(
            "warning: {} id(s) not on the roster were labelled '{}'",
            s.unresolved_names, config.options.not_found_label
        );
    }

    Ok(())
}

pub fn cmd_check(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input = load_input(&config, base_dir)?;

    // Runs the engine so structural preconditions surface here too.
    let result = peergrid_review::run(&config, &input).map_err(engine_err)?;

    println!(
        "valid: '{}' with {} participant(s), {} pairing(s), {} assessment(s), {} table",
        config.name,
        input.roster.len(),
        input.pairings.len(),
        input.assessments.len(),
        result.meta.shape,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn run_dir_name_format() {
        let at = chrono::Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(run_dir_name("CPSC 110", at), "CPSC 110(03-09-2026, 14.05.07)");
    }

    #[test]
    fn run_dir_name_strips_separators() {
        let at = chrono::Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(run_dir_name("a/b\\c:d", at), "a-b-c-d(01-01-2026, 00.00.00)");
    }
}
