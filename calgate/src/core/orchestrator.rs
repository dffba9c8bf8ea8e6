//! Fixed-order validation pass over all checkers.

use anyhow::Result;
use tracing::{debug, warn};

use crate::core::checks::{check_atod, check_bias, check_blev, check_ccd, check_dqi, check_sink};
use crate::core::exposure::ExposureConfig;
use crate::core::lookup::{Header, ReferenceResolver};
use crate::core::tally::ValidationTally;
use crate::core::types::Outcome;

/// Result of a completed validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub tally: ValidationTally,
}

/// Run every checker against `exposure` and classify the result.
///
/// Order: CCD tables, DQICORR, ATODCORR, BLEVCORR, BIASCORR, SINKCORR. The
/// first collaborator failure aborts the pass and is returned unchanged; no
/// tally is reported in that case.
pub fn resolve_flags<H: Header, R: ReferenceResolver>(
    exposure: &mut ExposureConfig,
    header: &H,
    resolver: &R,
) -> Result<Resolution> {
    let mut tally = ValidationTally::new();

    check_ccd(exposure, header, resolver, &mut tally)?;
    check_dqi(exposure, header, resolver, &mut tally)?;
    check_atod(exposure, header, resolver, &mut tally)?;
    check_blev(exposure, header, resolver, &mut tally)?;
    check_bias(exposure, header, resolver, &mut tally)?;
    check_sink(exposure, header, resolver, &mut tally)?;

    let outcome = classify_outcome(&tally);
    debug!(
        ?outcome,
        missing = tally.missing_count(),
        performable = tally.performable_count(),
        "flag resolution finished"
    );
    if outcome == Outcome::NothingToDo {
        warn!(
            "No calibration switch was set to PERFORM, or all reference files had PEDIGREE = DUMMY."
        );
    }
    Ok(Resolution { outcome, tally })
}

/// Missing files dominate; otherwise an empty performable count means there is nothing to do.
pub fn classify_outcome(tally: &ValidationTally) -> Outcome {
    if tally.missing_count() > 0 {
        Outcome::FileMissing
    } else if tally.performable_count() == 0 {
        Outcome::NothingToDo
    } else {
        Outcome::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exposure::Switches;
    use crate::core::types::{CalSwitch, DetectorKind, RefRole, Step};
    use crate::test_support::{FailingHeader, ScriptedResolver, header};

    fn all_good_resolver() -> ScriptedResolver {
        ScriptedResolver::new()
            .good(RefRole::CcdTab, "jref$ccd.fits")
            .good(RefRole::OscnTab, "jref$oscn.fits")
            .good(RefRole::BpixTab, "jref$bpix.fits")
            .good(RefRole::AtodTab, "jref$atod.fits")
            .good(RefRole::BiasFile, "jref$bias.fits")
            .good(RefRole::SatuFile, "jref$satu.fits")
            .good(RefRole::SnkcFile, "jref$sink.fits")
    }

    #[test]
    fn classify_missing_dominates_performable() {
        let mut tally = ValidationTally::new();
        tally.record_performable(Step::Bias);
        tally.record_performable(Step::Dqi);
        tally.record_missing(RefRole::SnkcFile, "x");
        assert_eq!(classify_outcome(&tally), Outcome::FileMissing);
    }

    #[test]
    fn classify_empty_tally_is_nothing_to_do() {
        assert_eq!(classify_outcome(&ValidationTally::new()), Outcome::NothingToDo);
    }

    #[test]
    fn all_omitted_on_mama_is_nothing_to_do() {
        let mut exposure =
            ExposureConfig::new(DetectorKind::Mama, Switches::uniform(CalSwitch::Omit));
        let resolver = all_good_resolver();

        let resolution = resolve_flags(&mut exposure, &header(&[]), &resolver).expect("resolve");

        assert_eq!(resolution.outcome, Outcome::NothingToDo);
        assert!(resolver.calls().is_empty());
    }

    #[test]
    fn all_omitted_on_ccd_still_checks_ccd_tables() {
        let mut exposure =
            ExposureConfig::new(DetectorKind::Ccd, Switches::uniform(CalSwitch::Omit));
        let resolver = all_good_resolver();

        let resolution = resolve_flags(&mut exposure, &header(&[]), &resolver).expect("resolve");

        assert_eq!(resolution.outcome, Outcome::NothingToDo);
        assert_eq!(resolver.calls(), vec![RefRole::CcdTab, RefRole::OscnTab]);
    }

    #[test]
    fn checkers_run_in_fixed_order() {
        let mut exposure =
            ExposureConfig::new(DetectorKind::Ccd, Switches::uniform(CalSwitch::Perform));
        let resolver = all_good_resolver();

        let resolution = resolve_flags(&mut exposure, &header(&[]), &resolver).expect("resolve");

        assert_eq!(resolution.outcome, Outcome::Proceed);
        assert_eq!(
            resolver.calls(),
            vec![
                RefRole::CcdTab,
                RefRole::OscnTab,
                RefRole::BpixTab,
                RefRole::AtodTab,
                RefRole::BiasFile,
                RefRole::SatuFile,
                RefRole::SnkcFile,
            ]
        );
        assert_eq!(
            resolution.tally.performable(),
            &[Step::Dqi, Step::AtoD, Step::Blev, Step::Bias, Step::Sink]
        );
    }

    #[test]
    fn one_missing_file_fails_whole_pass() {
        let mut exposure =
            ExposureConfig::new(DetectorKind::Ccd, Switches::uniform(CalSwitch::Perform));
        let resolver = all_good_resolver().missing(RefRole::AtodTab, "jref$atod.fits");

        let resolution = resolve_flags(&mut exposure, &header(&[]), &resolver).expect("resolve");

        assert_eq!(resolution.outcome, Outcome::FileMissing);
        assert_eq!(resolution.tally.missing_count(), 1);
        assert_eq!(resolution.tally.performable_count(), 5);
    }

    #[test]
    fn all_dummy_references_is_nothing_to_do() {
        let switches = Switches::uniform(CalSwitch::Omit)
            .with(Step::AtoD, CalSwitch::Perform)
            .with(Step::Sink, CalSwitch::Perform);
        let mut exposure = ExposureConfig::new(DetectorKind::Mama, switches);
        let resolver = ScriptedResolver::new()
            .dummy(RefRole::AtodTab, "jref$atod.fits")
            .dummy(RefRole::SnkcFile, "jref$sink.fits");

        let resolution = resolve_flags(&mut exposure, &header(&[]), &resolver).expect("resolve");

        assert_eq!(resolution.outcome, Outcome::NothingToDo);
        assert_eq!(exposure.switches, Switches::uniform(CalSwitch::Omit));
    }

    #[test]
    fn failure_aborts_remaining_checkers() {
        let mut exposure =
            ExposureConfig::new(DetectorKind::Ccd, Switches::uniform(CalSwitch::Perform));
        let resolver = all_good_resolver().failing(RefRole::BpixTab, "cannot open BPIXTAB");

        let err = resolve_flags(&mut exposure, &header(&[]), &resolver).expect_err("fails");

        assert_eq!(err.to_string(), "cannot open BPIXTAB");
        assert_eq!(
            resolver.calls(),
            vec![RefRole::CcdTab, RefRole::OscnTab, RefRole::BpixTab]
        );
    }

    #[test]
    fn header_failure_aborts_pass() {
        let mut exposure =
            ExposureConfig::new(DetectorKind::Ccd, Switches::uniform(CalSwitch::Perform));
        let resolver = all_good_resolver();
        let hdr = FailingHeader {
            inner: header(&[]),
            failing_keyword: "BIASCORR".to_string(),
        };

        let err = resolve_flags(&mut exposure, &hdr, &resolver).expect_err("fails");

        assert_eq!(err.to_string(), "cannot read keyword BIASCORR");
        assert!(!resolver.calls().contains(&RefRole::BiasFile));
        assert!(!resolver.calls().contains(&RefRole::SnkcFile));
    }
}
