//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `pgrid` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad args)                               |
//! | 3    | Input snapshot could not be read or parsed               |
//! | 4    | Structural precondition failed (empty roster, no rubric) |
//! | 5    | Output directory or CSV could not be written             |
//! | 6    | Config file invalid                                      |

use peergrid_review::ReviewError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. Emitted by clap itself.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

/// An input file was missing or did not match the expected JSON shape.
pub const EXIT_INPUT: u8 = 3;

/// Inputs were readable but no well-formed table can be produced.
pub const EXIT_PRECONDITION: u8 = 4;

/// Output directory creation or CSV writing failed.
pub const EXIT_OUTPUT: u8 = 5;

/// Config parse or validation failed.
pub const EXIT_CONFIG_INVALID: u8 = 6;

/// Map an engine error onto the registry.
pub fn review_exit_code(err: &ReviewError) -> u8 {
    match err {
        ReviewError::ConfigParse(_) | ReviewError::ConfigValidation(_) => EXIT_CONFIG_INVALID,
        ReviewError::Ingest { .. } => EXIT_INPUT,
        ReviewError::EmptyRoster | ReviewError::MissingRubric { .. } => EXIT_PRECONDITION,
        ReviewError::Io(_) | ReviewError::Csv(_) => EXIT_OUTPUT,
    }
}
