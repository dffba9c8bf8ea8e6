//! Flag resolution for `calgate check` and `calgate switches`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::core::exposure::ExposureConfig;
use crate::core::lookup::{Header, ReferenceResolver};
use crate::core::orchestrator::resolve_flags;
use crate::core::types::{RefRole, Step};
use crate::io::config::load_config;
use crate::io::header::load_header;
use crate::io::reference::DiskResolver;
use crate::io::report::ResolutionReport;

/// Inputs for a check run against files on disk.
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    pub header_path: PathBuf,
    pub config_path: PathBuf,
    /// Request these steps whatever the header says.
    pub perform: Vec<Step>,
    /// Restrict the run to these steps; empty keeps the header requests.
    pub only: Vec<Step>,
    /// Reference file names that replace the header values.
    pub overrides: Vec<(RefRole, String)>,
}

/// Validate an exposure header held in memory.
///
/// Steps in `perform` are requested on top of the header's requests; a
/// non-empty `only` then omits every step outside it.
pub fn check_exposure<H: Header, R: ReferenceResolver>(
    header: &H,
    resolver: &R,
    perform: &[Step],
    only: &[Step],
) -> Result<ResolutionReport> {
    let mut exposure = ExposureConfig::from_header(header)?;
    exposure.request(perform);
    exposure.restrict_to(only);
    debug!(detector = ?exposure.detector, switches = ?exposure.switches, "requested switches");
    let resolution = resolve_flags(&mut exposure, header, resolver)?;
    Ok(ResolutionReport::new(&exposure, &resolution))
}

/// Load config and header from disk, then validate.
pub fn check_from_paths(request: &CheckRequest) -> Result<ResolutionReport> {
    let cfg = load_config(&request.config_path).context("load config")?;
    let header = load_header(&request.header_path)?;
    let mut resolver = DiskResolver::new(&cfg).context("load reference manifest")?;
    for (role, name) in &request.overrides {
        resolver = resolver.with_override(*role, name.clone());
    }
    check_exposure(&header, &resolver, &request.perform, &request.only)
}

/// Read the detector and requested switches without resolving references.
pub fn requested_switches(header_path: &Path) -> Result<ExposureConfig> {
    let header = load_header(header_path)?;
    ExposureConfig::from_header(&header)
}

/// Parse a `KEYWORD=NAME` reference override.
pub fn parse_override(raw: &str) -> Result<(RefRole, String)> {
    let (keyword, name) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEYWORD=NAME, got '{raw}'"))?;
    let role = RefRole::from_keyword(keyword)
        .ok_or_else(|| anyhow!("unknown reference keyword '{}'", keyword.trim()))?;
    Ok((role, name.trim().to_string()))
}
