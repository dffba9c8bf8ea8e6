//! Declarative description of each switch-gated step.

use crate::core::types::{RefRole, Step};

/// Static facts the generic checker needs about a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub step: Step,
    /// Reference file that must exist for the step to run, if any.
    pub reference: Option<RefRole>,
    /// Downgrade the request to `Omit` when the header records the step as complete.
    pub honor_complete: bool,
}

pub const DQICORR: StepDescriptor = StepDescriptor {
    step: Step::Dqi,
    reference: Some(RefRole::BpixTab),
    honor_complete: false,
};

pub const ATODCORR: StepDescriptor = StepDescriptor {
    step: Step::AtoD,
    reference: Some(RefRole::AtodTab),
    honor_complete: true,
};

pub const BLEVCORR: StepDescriptor = StepDescriptor {
    step: Step::Blev,
    reference: None,
    honor_complete: true,
};

pub const BIASCORR: StepDescriptor = StepDescriptor {
    step: Step::Bias,
    reference: Some(RefRole::BiasFile),
    honor_complete: true,
};

pub const SINKCORR: StepDescriptor = StepDescriptor {
    step: Step::Sink,
    reference: Some(RefRole::SnkcFile),
    honor_complete: true,
};

/// Terminal state of one step within a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// The switch was not `Perform` on entry.
    NotRequested,
    /// The header already records the step as complete; the switch is now `Omit`.
    SkippedAlreadyComplete,
    ResolvedOk,
    ResolvedMissing,
    /// The reference file has dummy pedigree; the switch is now `Omit`.
    OmittedByDummyPedigree,
}

impl StepState {
    /// True when the step got past the request and completion gates.
    pub fn was_resolved(self) -> bool {
        matches!(
            self,
            StepState::ResolvedOk | StepState::ResolvedMissing | StepState::OmittedByDummyPedigree
        )
    }
}
