//! Shared deterministic types for flag resolution.
//!
//! These types define stable contracts between the checkers, the orchestrator,
//! and the report writer. They carry no I/O and serialize with stable names so
//! reports stay diffable across runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Literal file name meaning "no reference file for this role".
pub const NOT_APPLICABLE: &str = "N/A";

/// Pedigree values starting with this prefix mark placeholder reference files.
pub const DUMMY_PEDIGREE_PREFIX: &str = "DUMMY";

/// State of a calibration switch.
///
/// Requests start as read from the caller; validation may move `Perform` to
/// `Omit` but never the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalSwitch {
    Perform,
    Omit,
    /// The step was already applied by an earlier calibration pass.
    Complete,
}

impl CalSwitch {
    /// Interpret a header switch value (case-insensitive).
    ///
    /// Anything other than `PERFORM` or `COMPLETE` reads as `Omit`.
    pub fn from_keyword(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("perform") {
            CalSwitch::Perform
        } else if value.eq_ignore_ascii_case("complete") {
            CalSwitch::Complete
        } else {
            CalSwitch::Omit
        }
    }

    pub fn is_perform(self) -> bool {
        self == CalSwitch::Perform
    }

    pub fn label(self) -> &'static str {
        match self {
            CalSwitch::Perform => "PERFORM",
            CalSwitch::Omit => "OMIT",
            CalSwitch::Complete => "COMPLETE",
        }
    }
}

/// Whether a reference file was found.
///
/// `Unknown` is the state of a record the resolver has not visited yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Existence {
    Yes,
    No,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pedigree {
    Good,
    Dummy,
}

impl Pedigree {
    /// Classify a `PEDIGREE` keyword value. Absent values count as good.
    pub fn from_keyword(value: Option<&str>) -> Self {
        match value {
            Some(value) if starts_with_ignore_case(value.trim(), DUMMY_PEDIGREE_PREFIX) => {
                Pedigree::Dummy
            }
            _ => Pedigree::Good,
        }
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Sensor technology of the exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Charge-coupled detector (`WFC`, `HRC`).
    Ccd,
    /// Photon-counting detector (`SBC`).
    Mama,
}

impl DetectorKind {
    /// Map a `DETECTOR` keyword value to a detector kind.
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "WFC" | "HRC" | "CCD" | "UVIS" => Some(DetectorKind::Ccd),
            "SBC" | "MAMA" | "FUV-MAMA" | "NUV-MAMA" => Some(DetectorKind::Mama),
            _ => None,
        }
    }
}

/// How a reference file is opened by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Table,
    Image,
}

/// Reference file roles, named by the header keyword that holds the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RefRole {
    #[serde(rename = "CCDTAB")]
    CcdTab,
    #[serde(rename = "OSCNTAB")]
    OscnTab,
    #[serde(rename = "BPIXTAB")]
    BpixTab,
    #[serde(rename = "ATODTAB")]
    AtodTab,
    #[serde(rename = "BIASFILE")]
    BiasFile,
    #[serde(rename = "SATUFILE")]
    SatuFile,
    #[serde(rename = "SNKCFILE")]
    SnkcFile,
}

impl RefRole {
    pub const ALL: [RefRole; 7] = [
        RefRole::CcdTab,
        RefRole::OscnTab,
        RefRole::BpixTab,
        RefRole::AtodTab,
        RefRole::BiasFile,
        RefRole::SatuFile,
        RefRole::SnkcFile,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            RefRole::CcdTab => "CCDTAB",
            RefRole::OscnTab => "OSCNTAB",
            RefRole::BpixTab => "BPIXTAB",
            RefRole::AtodTab => "ATODTAB",
            RefRole::BiasFile => "BIASFILE",
            RefRole::SatuFile => "SATUFILE",
            RefRole::SnkcFile => "SNKCFILE",
        }
    }

    pub fn kind(self) -> RefKind {
        match self {
            RefRole::CcdTab | RefRole::OscnTab | RefRole::BpixTab | RefRole::AtodTab => {
                RefKind::Table
            }
            RefRole::BiasFile | RefRole::SatuFile | RefRole::SnkcFile => RefKind::Image,
        }
    }

    /// Look up a role by its header keyword (case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        RefRole::ALL
            .into_iter()
            .find(|role| role.keyword().eq_ignore_ascii_case(keyword.trim()))
    }
}

impl fmt::Display for RefRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Resolved state of one reference file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefFile {
    pub role: RefRole,
    pub name: String,
    pub exists: Existence,
    pub pedigree: Pedigree,
    pub descrip: String,
}

impl RefFile {
    /// Record for a role the resolver has not visited yet.
    pub fn unresolved(role: RefRole) -> Self {
        Self {
            role,
            name: String::new(),
            exists: Existence::Unknown,
            pedigree: Pedigree::Good,
            descrip: String::new(),
        }
    }

    /// Record for a file that could not be found.
    pub fn not_found(role: RefRole, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exists: Existence::No,
            ..Self::unresolved(role)
        }
    }

    pub fn exists(&self) -> bool {
        self.exists == Existence::Yes
    }

    pub fn is_dummy(&self) -> bool {
        self.pedigree == Pedigree::Dummy
    }
}

/// A calibration step gated by a switch keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    #[serde(rename = "DQICORR")]
    Dqi,
    #[serde(rename = "ATODCORR")]
    AtoD,
    #[serde(rename = "BLEVCORR")]
    Blev,
    #[serde(rename = "BIASCORR")]
    Bias,
    #[serde(rename = "SINKCORR")]
    Sink,
}

impl Step {
    pub const ALL: [Step; 5] = [Step::Dqi, Step::AtoD, Step::Blev, Step::Bias, Step::Sink];

    pub fn keyword(self) -> &'static str {
        match self {
            Step::Dqi => "DQICORR",
            Step::AtoD => "ATODCORR",
            Step::Blev => "BLEVCORR",
            Step::Bias => "BIASCORR",
            Step::Sink => "SINKCORR",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Step {
    type Err = String;

    /// Accepts the switch keyword (`biascorr`) or its short form (`bias`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        let short = normalized.strip_suffix("CORR").unwrap_or(&normalized);
        Step::ALL
            .into_iter()
            .find(|step| step.keyword().strip_suffix("CORR") == Some(short))
            .ok_or_else(|| {
                format!("unknown calibration step '{value}' (expected one of dqicorr, atodcorr, blevcorr, biascorr, sinkcorr)")
            })
    }
}

/// Terminal outcome of one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one step can run and every required file was found.
    Proceed,
    /// One or more required reference files are missing or dummy.
    FileMissing,
    /// Nothing is authorized to run; the caller should skip calibration.
    NothingToDo,
}
