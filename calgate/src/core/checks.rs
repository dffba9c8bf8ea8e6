//! Per-step reference checks.
//!
//! Tone conversion, bias level, bias and sink pixels share [`check_step`],
//! driven by their [`StepDescriptor`]. The CCD parameter tables, the
//! data-quality step and the bias step's saturation image follow their own
//! rules and are spelled out separately.

use anyhow::Result;
use tracing::debug;

use crate::core::exposure::ExposureConfig;
use crate::core::lookup::{Header, ReferenceResolver, has_file_name, read_switch, resolve};
use crate::core::steps::{
    ATODCORR, BIASCORR, BLEVCORR, DQICORR, SINKCORR, StepDescriptor, StepState,
};
use crate::core::tally::ValidationTally;
use crate::core::types::{CalSwitch, DetectorKind, RefRole};

/// Validate one switch-gated step.
///
/// A step that is not requested is left alone. A step the header records as
/// complete is omitted without touching the tally (when the descriptor honors
/// completion). Otherwise its reference file, if any, is resolved: a file that
/// does not exist counts as missing, and a step whose switch survives
/// resolution counts as performable. The two counts are independent.
pub fn check_step<H: Header, R: ReferenceResolver>(
    desc: StepDescriptor,
    exposure: &mut ExposureConfig,
    header: &H,
    resolver: &R,
    tally: &mut ValidationTally,
) -> Result<StepState> {
    let step = desc.step;
    if !exposure.switches.get(step).is_perform() {
        return Ok(StepState::NotRequested);
    }

    if desc.honor_complete && read_switch(header, step.keyword())? == CalSwitch::Complete {
        debug!(step = %step, "header records step as complete; omitting");
        *exposure.switches.get_mut(step) = CalSwitch::Omit;
        return Ok(StepState::SkippedAlreadyComplete);
    }

    let mut state = StepState::ResolvedOk;
    if let Some(role) = desc.reference {
        let record = resolve(resolver, header, role, Some(exposure.switches.get_mut(step)))?;
        let record = exposure.refs.store(record);
        if !record.exists() {
            tally.record_missing(role, &record.name);
            state = StepState::ResolvedMissing;
        } else if !exposure.switches.get(step).is_perform() {
            debug!(step = %step, file = %record.name, "dummy pedigree; omitting");
            state = StepState::OmittedByDummyPedigree;
        }
    }

    if exposure.switches.get(step).is_perform() {
        tally.record_performable(step);
    }
    Ok(state)
}

/// Resolve the CCD parameter and overscan tables.
///
/// Runs for every charge-coupled exposure whatever the switches say: the
/// parameter table feeds error-array initialization, which has no switch of
/// its own. A dummy parameter table counts as missing. The overscan table is
/// optional unless a file name was given; its dummy pedigree omits BLEVCORR.
pub fn check_ccd<H: Header, R: ReferenceResolver>(
    exposure: &mut ExposureConfig,
    header: &H,
    resolver: &R,
    tally: &mut ValidationTally,
) -> Result<()> {
    if exposure.detector != DetectorKind::Ccd {
        return Ok(());
    }

    let record = resolve(resolver, header, RefRole::CcdTab, None)?;
    let ccdpar = exposure.refs.store(record);
    if !ccdpar.exists() {
        tally.record_missing(RefRole::CcdTab, &ccdpar.name);
    } else if ccdpar.is_dummy() {
        tally.record_dummy(RefRole::CcdTab, &ccdpar.name);
    }

    let record = resolve(
        resolver,
        header,
        RefRole::OscnTab,
        Some(&mut exposure.switches.blevcorr),
    )?;
    let oscn = exposure.refs.store(record);
    if !oscn.exists() && has_file_name(&oscn.name) {
        tally.record_missing(RefRole::OscnTab, &oscn.name);
    }
    Ok(())
}

/// Validate data-quality initialization.
///
/// A `COMPLETE` header value is not honored: running the step again to
/// accumulate flags from another table is allowed. On a charge-coupled
/// detector the bad-pixel table may be left unnamed, in which case the step
/// only flags saturation; on a photon-counting detector it is required.
pub fn check_dqi<H: Header, R: ReferenceResolver>(
    exposure: &mut ExposureConfig,
    header: &H,
    resolver: &R,
    tally: &mut ValidationTally,
) -> Result<StepState> {
    let step = DQICORR.step;
    if !exposure.switches.dqicorr.is_perform() {
        return Ok(StepState::NotRequested);
    }

    let mut state = StepState::ResolvedOk;
    let record = resolve(
        resolver,
        header,
        RefRole::BpixTab,
        Some(&mut exposure.switches.dqicorr),
    )?;
    let bpix = exposure.refs.store(record);
    if !bpix.exists() {
        if exposure.detector == DetectorKind::Mama || has_file_name(&bpix.name) {
            tally.record_missing(RefRole::BpixTab, &bpix.name);
            state = StepState::ResolvedMissing;
        } else {
            debug!("no BPIXTAB given; DQICORR will only flag saturation");
        }
    } else if !exposure.switches.dqicorr.is_perform() {
        state = StepState::OmittedByDummyPedigree;
    }

    if exposure.switches.dqicorr.is_perform() {
        tally.record_performable(step);
    }
    Ok(state)
}

pub fn check_atod<H: Header, R: ReferenceResolver>(
    exposure: &mut ExposureConfig,
    header: &H,
    resolver: &R,
    tally: &mut ValidationTally,
) -> Result<StepState> {
    check_step(ATODCORR, exposure, header, resolver, tally)
}

/// Bias level has no reference file of its own; the overscan table is
/// checked with the CCD tables.
pub fn check_blev<H: Header, R: ReferenceResolver>(
    exposure: &mut ExposureConfig,
    header: &H,
    resolver: &R,
    tally: &mut ValidationTally,
) -> Result<StepState> {
    check_step(BLEVCORR, exposure, header, resolver, tally)
}

/// Validate bias subtraction and its full-well saturation image.
///
/// The saturation image has no switch; it is resolved without one so the
/// settled BIASCORR value cannot change. A missing saturation image counts as
/// missing but does not change the performable count.
pub fn check_bias<H: Header, R: ReferenceResolver>(
    exposure: &mut ExposureConfig,
    header: &H,
    resolver: &R,
    tally: &mut ValidationTally,
) -> Result<StepState> {
    let state = check_step(BIASCORR, exposure, header, resolver, tally)?;
    if !state.was_resolved() {
        return Ok(state);
    }

    let record = resolve(resolver, header, RefRole::SatuFile, None)?;
    let satmap = exposure.refs.store(record);
    if !satmap.exists() {
        tally.record_missing(RefRole::SatuFile, &satmap.name);
    }
    Ok(state)
}

pub fn check_sink<H: Header, R: ReferenceResolver>(
    exposure: &mut ExposureConfig,
    header: &H,
    resolver: &R,
    tally: &mut ValidationTally,
) -> Result<StepState> {
    check_step(SINKCORR, exposure, header, resolver, tally)
}
