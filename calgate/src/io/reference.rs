//! Filesystem-backed reference file resolution.
//!
//! File names come from a per-keyword override or the exposure header. Names
//! of the form `prefix$file` expand through configured reference directories
//! (or an environment variable named after the prefix). Pedigree and
//! description are taken from an optional JSON manifest keyed by file name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::lookup::{Header, ReferenceResolver, apply_pedigree, has_file_name};
use crate::core::types::{CalSwitch, Existence, Pedigree, RefFile, RefKind, RefRole};
use crate::io::config::GateConfig;

/// Pedigree metadata for one reference file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestEntry {
    pub pedigree: Option<String>,
    pub descrip: Option<String>,
}

/// Reference manifest: `{ "files": { "<basename>": { "pedigree": ..., "descrip": ... } } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceManifest {
    pub files: BTreeMap<String, ManifestEntry>,
}

impl ReferenceManifest {
    pub fn insert(&mut self, file: &str, pedigree: &str, descrip: &str) {
        self.files.insert(
            file.to_string(),
            ManifestEntry {
                pedigree: Some(pedigree.to_string()),
                descrip: Some(descrip.to_string()),
            },
        );
    }

    /// Entry for `path`, matched by file name.
    pub fn lookup(&self, path: &Path) -> Option<&ManifestEntry> {
        let file_name = path.file_name()?.to_str()?;
        self.files.get(file_name)
    }
}

pub fn load_manifest(path: &Path) -> Result<ReferenceManifest> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read manifest {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse manifest {}", path.display()))
}

/// Resolves reference files against the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct DiskResolver {
    ref_dirs: BTreeMap<String, PathBuf>,
    env_ref_dirs: bool,
    overrides: BTreeMap<RefRole, String>,
    manifest: ReferenceManifest,
}

impl DiskResolver {
    pub fn new(config: &GateConfig) -> Result<Self> {
        let manifest = match &config.manifest {
            Some(path) => load_manifest(path)?,
            None => ReferenceManifest::default(),
        };
        Ok(Self {
            ref_dirs: config.ref_dirs.clone(),
            env_ref_dirs: config.env_ref_dirs,
            overrides: BTreeMap::new(),
            manifest,
        })
    }

    /// Use `name` for `role` instead of the header value.
    pub fn with_override(mut self, role: RefRole, name: impl Into<String>) -> Self {
        self.overrides.insert(role, name.into());
        self
    }

    pub fn with_manifest(mut self, manifest: ReferenceManifest) -> Self {
        self.manifest = manifest;
        self
    }

    fn file_name<H: Header>(&self, header: &H, role: RefRole) -> Result<String> {
        if let Some(name) = self.overrides.get(&role) {
            return Ok(name.clone());
        }
        Ok(header
            .keyword(role.keyword())?
            .map(|name| name.trim().to_string())
            .unwrap_or_default())
    }

    /// Expand `prefix$file` names. Returns `None` for an unknown prefix.
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let Some((prefix, file)) = name.split_once('$') else {
            return Some(PathBuf::from(name));
        };
        if prefix.is_empty() {
            return None;
        }
        if let Some(dir) = self.ref_dirs.get(prefix) {
            return Some(dir.join(file));
        }
        if self.env_ref_dirs
            && let Some(dir) = std::env::var_os(prefix)
        {
            return Some(PathBuf::from(dir).join(file));
        }
        None
    }

    fn resolve_ref<H: Header>(
        &self,
        header: &H,
        role: RefRole,
        kind: RefKind,
        switch: Option<&mut CalSwitch>,
    ) -> Result<RefFile> {
        let name = self.file_name(header, role)?;
        if !has_file_name(&name) {
            return Ok(RefFile::not_found(role, name));
        }

        let lookup_name = match kind {
            RefKind::Image => strip_extension_suffix(&name),
            RefKind::Table => name.as_str(),
        };
        let Some(path) = self.locate(lookup_name) else {
            debug!(keyword = %role, file = %name, "unknown reference directory prefix");
            return Ok(RefFile::not_found(role, name));
        };
        if !path.is_file() {
            debug!(keyword = %role, path = %path.display(), "reference file not on disk");
            return Ok(RefFile::not_found(role, name));
        }

        let entry = self.manifest.lookup(&path);
        let record = RefFile {
            role,
            name,
            exists: Existence::Yes,
            pedigree: Pedigree::from_keyword(entry.and_then(|e| e.pedigree.as_deref())),
            descrip: entry.and_then(|e| e.descrip.clone()).unwrap_or_default(),
        };
        apply_pedigree(&record, switch);
        debug!(keyword = %role, file = %record.name, pedigree = ?record.pedigree, "resolved reference");
        Ok(record)
    }
}

impl ReferenceResolver for DiskResolver {
    fn resolve_table<H: Header>(
        &self,
        header: &H,
        role: RefRole,
        switch: Option<&mut CalSwitch>,
    ) -> Result<RefFile> {
        self.resolve_ref(header, role, RefKind::Table, switch)
    }

    fn resolve_image<H: Header>(
        &self,
        header: &H,
        role: RefRole,
        switch: Option<&mut CalSwitch>,
    ) -> Result<RefFile> {
        self.resolve_ref(header, role, RefKind::Image, switch)
    }
}

/// Drop a trailing `[ext]` selector from an image name.
fn strip_extension_suffix(name: &str) -> &str {
    match name.find('[') {
        Some(idx) if name.ends_with(']') => &name[..idx],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::header;

    fn resolver_for(dir: &Path) -> DiskResolver {
        let mut cfg = GateConfig {
            env_ref_dirs: false,
            ..GateConfig::default()
        };
        cfg.ref_dirs.insert("jref".to_string(), dir.to_path_buf());
        DiskResolver::new(&cfg).expect("resolver")
    }

    #[test]
    fn strip_extension_suffix_handles_selectors() {
        assert_eq!(strip_extension_suffix("a_bia.fits[sci,1]"), "a_bia.fits");
        assert_eq!(strip_extension_suffix("a_bia.fits"), "a_bia.fits");
        assert_eq!(strip_extension_suffix("a[b"), "a[b");
    }

    #[test]
    fn resolves_existing_file_through_prefix() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("x_bia.fits"), b"").expect("write");
        let resolver = resolver_for(temp.path());
        let hdr = header(&[("BIASFILE", "jref$x_bia.fits[sci,1]")]);

        let mut switch = CalSwitch::Perform;
        let record = resolver
            .resolve_image(&hdr, RefRole::BiasFile, Some(&mut switch))
            .expect("resolve");

        assert_eq!(record.exists, Existence::Yes);
        assert_eq!(record.name, "jref$x_bia.fits[sci,1]");
        assert_eq!(record.pedigree, Pedigree::Good);
        assert_eq!(switch, CalSwitch::Perform);
    }

    #[test]
    fn blank_and_unknown_prefix_do_not_exist() {
        let temp = tempfile::tempdir().expect("tempdir");
        let resolver = resolver_for(temp.path());
        let hdr = header(&[("ATODTAB", "N/A"), ("SNKCFILE", "nref$y_snk.fits")]);

        let atod = resolver
            .resolve_table(&hdr, RefRole::AtodTab, None)
            .expect("atod");
        let sink = resolver
            .resolve_image(&hdr, RefRole::SnkcFile, None)
            .expect("sink");
        let ccd = resolver
            .resolve_table(&hdr, RefRole::CcdTab, None)
            .expect("ccd");

        assert_eq!(atod.exists, Existence::No);
        assert_eq!(atod.name, "N/A");
        assert_eq!(sink.exists, Existence::No);
        assert_eq!(ccd.exists, Existence::No);
        assert_eq!(ccd.name, "");
    }

    #[test]
    fn manifest_dummy_pedigree_downgrades_switch() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("z_a2d.fits"), b"").expect("write");
        let mut manifest = ReferenceManifest::default();
        manifest.insert("z_a2d.fits", "DUMMY 2002-03-01", "placeholder table");
        let resolver = resolver_for(temp.path()).with_manifest(manifest);
        let hdr = header(&[("ATODTAB", "jref$z_a2d.fits")]);

        let mut switch = CalSwitch::Perform;
        let record = resolver
            .resolve_table(&hdr, RefRole::AtodTab, Some(&mut switch))
            .expect("resolve");

        assert_eq!(record.pedigree, Pedigree::Dummy);
        assert_eq!(record.descrip, "placeholder table");
        assert_eq!(switch, CalSwitch::Omit);
    }

    #[test]
    fn override_replaces_header_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("alt_ccd.fits"), b"").expect("write");
        let resolver =
            resolver_for(temp.path()).with_override(RefRole::CcdTab, "jref$alt_ccd.fits");
        let hdr = header(&[("CCDTAB", "jref$gone_ccd.fits")]);

        let record = resolver
            .resolve_table(&hdr, RefRole::CcdTab, None)
            .expect("resolve");

        assert_eq!(record.exists, Existence::Yes);
        assert_eq!(record.name, "jref$alt_ccd.fits");
    }

    #[test]
    fn unreadable_manifest_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("refs.json");
        fs::write(&path, "{not json").expect("write");
        let cfg = GateConfig {
            manifest: Some(path),
            ..GateConfig::default()
        };
        let err = DiskResolver::new(&cfg).expect_err("bad manifest");
        assert!(err.to_string().contains("parse manifest"));
    }
}
