//! Stable exit codes for calgate CLI commands.

use crate::core::types::Outcome;

/// Calibration may proceed, or the command succeeded.
pub const OK: i32 = 0;
/// Invalid input, config, or a header/reference lookup failure.
pub const INVALID: i32 = 1;
/// `calgate check` found missing or dummy required reference files.
pub const FILE_MISSING: i32 = 2;
/// `calgate check` found no step authorized to run.
pub const NOTHING_TO_DO: i32 = 3;

pub fn for_outcome(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Proceed => OK,
        Outcome::FileMissing => FILE_MISSING,
        Outcome::NothingToDo => NOTHING_TO_DO,
    }
}
