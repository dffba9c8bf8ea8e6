//! Resolver configuration stored in `calgate.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "calgate.toml";

/// Reference lookup configuration (TOML).
///
/// Missing fields default to values that resolve plain paths only, with
/// environment-variable fallback for `prefix$file` names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GateConfig {
    /// Directory for each `prefix$` used in reference file names (e.g. `jref`).
    pub ref_dirs: BTreeMap<String, PathBuf>,

    /// Fall back to an environment variable named after the prefix.
    pub env_ref_dirs: bool,

    /// JSON manifest carrying pedigree and description per reference file.
    pub manifest: Option<PathBuf>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            ref_dirs: BTreeMap::new(),
            env_ref_dirs: true,
            manifest: None,
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<()> {
        for (prefix, dir) in &self.ref_dirs {
            if prefix.trim().is_empty() {
                return Err(anyhow!("ref_dirs prefix must be non-empty"));
            }
            if prefix.contains('$') {
                return Err(anyhow!("ref_dirs prefix '{prefix}' must not contain '$'"));
            }
            if dir.as_os_str().is_empty() {
                return Err(anyhow!("ref_dirs.{prefix} must be a non-empty path"));
            }
        }
        if let Some(manifest) = &self.manifest
            && manifest.as_os_str().is_empty()
        {
            return Err(anyhow!("manifest must be a non-empty path"));
        }
        Ok(())
    }

    /// Make relative paths absolute against `base` (the config file's directory).
    pub fn rebase(mut self, base: &Path) -> Self {
        for dir in self.ref_dirs.values_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        if let Some(manifest) = self.manifest.as_mut()
            && manifest.is_relative()
        {
            *manifest = base.join(&*manifest);
        }
        self
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GateConfig::default()`. Relative paths in
/// the file are resolved against its directory.
pub fn load_config(path: &Path) -> Result<GateConfig> {
    if !path.exists() {
        let cfg = GateConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GateConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(cfg.rebase(base))
}
