//! Calibration flag resolution for CCD and MAMA exposures.
//!
//! Given the calibration switches requested for an exposure and its header,
//! this crate checks that every reference file a requested step needs exists
//! and is usable, downgrades switches that cannot run, and decides whether
//! calibration should proceed, fail for missing files, or be skipped. The
//! architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (switch store, checkers, orchestrator).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting collaborators (header snapshots, filesystem
//!   reference lookup, config, reports).
//!
//! [`check`] coordinates core logic with I/O to implement CLI commands.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
