//! Accumulator for one validation pass.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::core::types::{RefRole, Step};

/// Why a reference file was counted as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    NotFound,
    DummyPedigree,
}

/// One missing-file contribution to the tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingReference {
    pub role: RefRole,
    pub name: String,
    pub reason: MissingReason,
}

/// Missing-file and performable-step counters.
///
/// Both counters only grow. Each missing entry records which role produced it
/// so the final count stays attributable to a single checker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationTally {
    missing: Vec<MissingReference>,
    performable: Vec<Step>,
}

impl ValidationTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn performable_count(&self) -> usize {
        self.performable.len()
    }

    pub fn missing(&self) -> &[MissingReference] {
        &self.missing
    }

    /// Steps counted as performable, in the order they were tallied.
    pub fn performable(&self) -> &[Step] {
        &self.performable
    }

    /// Count a reference file that was not found and report it.
    pub fn record_missing(&mut self, role: RefRole, name: &str) {
        error!(keyword = %role, file = name, "{} `{}' not found or can't open.", role, name);
        self.missing.push(MissingReference {
            role,
            name: name.to_string(),
            reason: MissingReason::NotFound,
        });
    }

    /// Count an existing reference table whose pedigree makes it unusable.
    pub fn record_dummy(&mut self, role: RefRole, name: &str) {
        error!(keyword = %role, file = name, "{} `{}' is a dummy table.", role, name);
        self.missing.push(MissingReference {
            role,
            name: name.to_string(),
            reason: MissingReason::DummyPedigree,
        });
    }

    pub fn record_performable(&mut self, step: Step) {
        self.performable.push(step);
    }
}
