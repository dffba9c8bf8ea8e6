//! Per-exposure switch store.
//!
//! Holds the current value of every calibration switch, every resolved
//! reference record, and the detector kind. Checkers mutate it in place;
//! downstream calibration reads it once validation is finished.

use anyhow::{Result, anyhow};

use crate::core::lookup::{Header, read_switch};
use crate::core::types::{CalSwitch, DetectorKind, RefFile, RefRole, Step};

/// Keyword naming the exposure's detector.
pub const DETECTOR_KEYWORD: &str = "DETECTOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switches {
    pub dqicorr: CalSwitch,
    pub atodcorr: CalSwitch,
    pub blevcorr: CalSwitch,
    pub biascorr: CalSwitch,
    pub sinkcorr: CalSwitch,
}

impl Switches {
    /// Every switch set to the same value.
    pub fn uniform(value: CalSwitch) -> Self {
        Self {
            dqicorr: value,
            atodcorr: value,
            blevcorr: value,
            biascorr: value,
            sinkcorr: value,
        }
    }

    pub fn get(&self, step: Step) -> CalSwitch {
        match step {
            Step::Dqi => self.dqicorr,
            Step::AtoD => self.atodcorr,
            Step::Blev => self.blevcorr,
            Step::Bias => self.biascorr,
            Step::Sink => self.sinkcorr,
        }
    }

    pub fn get_mut(&mut self, step: Step) -> &mut CalSwitch {
        match step {
            Step::Dqi => &mut self.dqicorr,
            Step::AtoD => &mut self.atodcorr,
            Step::Blev => &mut self.blevcorr,
            Step::Bias => &mut self.biascorr,
            Step::Sink => &mut self.sinkcorr,
        }
    }

    pub fn with(mut self, step: Step, value: CalSwitch) -> Self {
        *self.get_mut(step) = value;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, CalSwitch)> + '_ {
        Step::ALL.into_iter().map(|step| (step, self.get(step)))
    }
}

/// One record per reference-file role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefFiles {
    pub ccdpar: RefFile,
    pub oscn: RefFile,
    pub bpix: RefFile,
    pub atod: RefFile,
    pub bias: RefFile,
    pub satmap: RefFile,
    pub sink: RefFile,
}

impl Default for RefFiles {
    fn default() -> Self {
        Self {
            ccdpar: RefFile::unresolved(RefRole::CcdTab),
            oscn: RefFile::unresolved(RefRole::OscnTab),
            bpix: RefFile::unresolved(RefRole::BpixTab),
            atod: RefFile::unresolved(RefRole::AtodTab),
            bias: RefFile::unresolved(RefRole::BiasFile),
            satmap: RefFile::unresolved(RefRole::SatuFile),
            sink: RefFile::unresolved(RefRole::SnkcFile),
        }
    }
}

impl RefFiles {
    pub fn get(&self, role: RefRole) -> &RefFile {
        match role {
            RefRole::CcdTab => &self.ccdpar,
            RefRole::OscnTab => &self.oscn,
            RefRole::BpixTab => &self.bpix,
            RefRole::AtodTab => &self.atod,
            RefRole::BiasFile => &self.bias,
            RefRole::SatuFile => &self.satmap,
            RefRole::SnkcFile => &self.sink,
        }
    }

    /// Store `record` in the slot for its role.
    pub fn store(&mut self, record: RefFile) -> &RefFile {
        let slot = match record.role {
            RefRole::CcdTab => &mut self.ccdpar,
            RefRole::OscnTab => &mut self.oscn,
            RefRole::BpixTab => &mut self.bpix,
            RefRole::AtodTab => &mut self.atod,
            RefRole::BiasFile => &mut self.bias,
            RefRole::SatuFile => &mut self.satmap,
            RefRole::SnkcFile => &mut self.sink,
        };
        *slot = record;
        slot
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefFile> + '_ {
        RefRole::ALL.into_iter().map(|role| self.get(role))
    }
}

/// Switch store for a single exposure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureConfig {
    pub detector: DetectorKind,
    pub switches: Switches,
    pub refs: RefFiles,
}

impl ExposureConfig {
    pub fn new(detector: DetectorKind, switches: Switches) -> Self {
        Self {
            detector,
            switches,
            refs: RefFiles::default(),
        }
    }

    /// Read the detector and the requested switches from the header.
    ///
    /// A step the header records as `COMPLETE` is requested as `Perform`; its
    /// checker then decides whether the completed step is skipped or re-run.
    pub fn from_header<H: Header>(header: &H) -> Result<Self> {
        let detector_name = header
            .keyword(DETECTOR_KEYWORD)?
            .ok_or_else(|| anyhow!("missing {DETECTOR_KEYWORD} keyword"))?;
        let detector = DetectorKind::from_keyword(&detector_name)
            .ok_or_else(|| anyhow!("unsupported {DETECTOR_KEYWORD} '{detector_name}'"))?;

        let mut switches = Switches::uniform(CalSwitch::Omit);
        for step in Step::ALL {
            *switches.get_mut(step) = match read_switch(header, step.keyword())? {
                CalSwitch::Complete => CalSwitch::Perform,
                value => value,
            };
        }
        Ok(Self::new(detector, switches))
    }

    /// Request every step in `steps` regardless of the header value.
    pub fn request(&mut self, steps: &[Step]) {
        for &step in steps {
            *self.switches.get_mut(step) = CalSwitch::Perform;
        }
    }

    /// Force every step outside `steps` to `Omit`. An empty slice keeps all requests.
    pub fn restrict_to(&mut self, steps: &[Step]) {
        if steps.is_empty() {
            return;
        }
        for step in Step::ALL {
            if !steps.contains(&step) {
                *self.switches.get_mut(step) = CalSwitch::Omit;
            }
        }
    }
}
