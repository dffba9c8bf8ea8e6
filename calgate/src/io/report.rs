//! Resolution reports for the calibration driver and for humans.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::exposure::ExposureConfig;
use crate::core::orchestrator::Resolution;
use crate::core::tally::{MissingReason, MissingReference};
use crate::core::types::{CalSwitch, DetectorKind, Outcome, RefFile, Step};

/// Settled switches, reference records and counters for one exposure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub outcome: Outcome,
    pub detector: DetectorKind,
    pub switches: BTreeMap<Step, CalSwitch>,
    pub references: Vec<RefFile>,
    pub missing_count: usize,
    pub performable_count: usize,
    pub missing: Vec<MissingReference>,
}

impl ResolutionReport {
    pub fn new(exposure: &ExposureConfig, resolution: &Resolution) -> Self {
        Self {
            outcome: resolution.outcome,
            detector: exposure.detector,
            switches: exposure.switches.iter().collect(),
            references: exposure.refs.iter().cloned().collect(),
            missing_count: resolution.tally.missing_count(),
            performable_count: resolution.tally.performable_count(),
            missing: resolution.tally.missing().to_vec(),
        }
    }

    /// Stable `check: ...` lines for terminal output.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("check: outcome={}", outcome_label(self.outcome)),
            format!("check: detector={}", detector_label(self.detector)),
            format!(
                "check: missing={} performable={}",
                self.missing_count, self.performable_count
            ),
        ];
        for (step, value) in &self.switches {
            lines.push(format!("check: switch {}={}", step, value.label()));
        }
        for missing in &self.missing {
            let name = if missing.name.is_empty() {
                "(blank)"
            } else {
                missing.name.as_str()
            };
            lines.push(format!(
                "check: missing {} {} ({})",
                missing.role,
                name,
                reason_label(missing.reason)
            ));
        }
        lines
    }
}

pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Proceed => "proceed",
        Outcome::FileMissing => "file_missing",
        Outcome::NothingToDo => "nothing_to_do",
    }
}

pub fn detector_label(detector: DetectorKind) -> &'static str {
    match detector {
        DetectorKind::Ccd => "ccd",
        DetectorKind::Mama => "mama",
    }
}

fn reason_label(reason: MissingReason) -> &'static str {
    match reason {
        MissingReason::NotFound => "not found",
        MissingReason::DummyPedigree => "dummy pedigree",
    }
}

/// Serialize `report` to pretty-printed JSON with trailing newline.
pub fn write_report(path: &Path, report: &ResolutionReport) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(report).context("serialize report")?;
    payload.push('\n');
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exposure::Switches;
    use crate::core::tally::ValidationTally;
    use crate::core::types::RefRole;

    fn sample() -> ResolutionReport {
        let exposure = ExposureConfig::new(
            DetectorKind::Ccd,
            Switches::uniform(CalSwitch::Omit).with(Step::Bias, CalSwitch::Perform),
        );
        let mut tally = ValidationTally::new();
        tally.record_performable(Step::Bias);
        tally.record_missing(RefRole::SatuFile, "");
        let resolution = Resolution {
            outcome: Outcome::FileMissing,
            tally,
        };
        ResolutionReport::new(&exposure, &resolution)
    }

    #[test]
    fn summary_lists_counts_switches_and_missing() {
        let lines = sample().summary_lines();
        assert_eq!(lines[0], "check: outcome=file_missing");
        assert_eq!(lines[1], "check: detector=ccd");
        assert_eq!(lines[2], "check: missing=1 performable=1");
        assert!(lines.contains(&"check: switch BIASCORR=PERFORM".to_string()));
        assert!(lines.contains(&"check: switch DQICORR=OMIT".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("check: missing SATUFILE (blank) (not found)")
        );
    }

    #[test]
    fn report_json_uses_keyword_names() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("out").join("report.json");
        write_report(&path, &sample()).expect("write");

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["outcome"], "file_missing");
        assert_eq!(value["switches"]["BIASCORR"], "perform");
        assert_eq!(value["missing"][0]["role"], "SATUFILE");
        assert_eq!(value["missing"][0]["reason"], "not_found");
        assert_eq!(value["references"].as_array().map(Vec::len), Some(7));
    }
}
