//! Deterministic, pure logic for calibration flag resolution.
//!
//! Core modules must be free of I/O side effects. Header access and reference
//! resolution reach them only through the traits in [`lookup`], so every
//! checker can be driven from in-memory doubles.

pub mod checks;
pub mod exposure;
pub mod lookup;
pub mod orchestrator;
pub mod steps;
pub mod tally;
pub mod types;
