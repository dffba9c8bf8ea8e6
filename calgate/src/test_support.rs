//! Test-only doubles for headers, reference resolution, and on-disk fixtures.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::lookup::{Header, ReferenceResolver, apply_pedigree};
use crate::core::types::{CalSwitch, Existence, Pedigree, RefFile, RefRole};
pub use crate::io::header::KeywordHeader;
use crate::io::reference::ReferenceManifest;

/// Build an in-memory header from `(keyword, value)` pairs.
pub fn header(pairs: &[(&str, &str)]) -> KeywordHeader {
    pairs
        .iter()
        .fold(KeywordHeader::new(), |hdr, (name, value)| {
            hdr.with_text(name, value)
        })
}

/// Header that fails when one keyword is read.
pub struct FailingHeader {
    pub inner: KeywordHeader,
    pub failing_keyword: String,
}

impl Header for FailingHeader {
    fn keyword(&self, name: &str) -> Result<Option<String>> {
        if name.eq_ignore_ascii_case(&self.failing_keyword) {
            return Err(anyhow!("cannot read keyword {name}"));
        }
        self.inner.keyword(name)
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Record { name: String, exists: bool, pedigree: Pedigree },
    Fail(String),
}

/// Resolver that returns scripted records and remembers which roles it saw.
///
/// Unscripted roles resolve as not found with a blank name. Dummy records
/// downgrade the supplied switch exactly as a real resolver would.
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    script: BTreeMap<RefRole, Scripted>,
    calls: RefCell<Vec<RefRole>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(mut self, role: RefRole, name: &str, exists: bool, pedigree: Pedigree) -> Self {
        self.script.insert(
            role,
            Scripted::Record {
                name: name.to_string(),
                exists,
                pedigree,
            },
        );
        self
    }

    pub fn good(self, role: RefRole, name: &str) -> Self {
        self.record(role, name, true, Pedigree::Good)
    }

    pub fn dummy(self, role: RefRole, name: &str) -> Self {
        self.record(role, name, true, Pedigree::Dummy)
    }

    pub fn missing(self, role: RefRole, name: &str) -> Self {
        self.record(role, name, false, Pedigree::Good)
    }

    pub fn failing(mut self, role: RefRole, message: &str) -> Self {
        self.script.insert(role, Scripted::Fail(message.to_string()));
        self
    }

    /// Roles resolved so far, in call order.
    pub fn calls(&self) -> Vec<RefRole> {
        self.calls.borrow().clone()
    }

    fn resolve_scripted(&self, role: RefRole, switch: Option<&mut CalSwitch>) -> Result<RefFile> {
        self.calls.borrow_mut().push(role);
        let record = match self.script.get(&role) {
            Some(Scripted::Fail(message)) => return Err(anyhow!("{message}")),
            Some(Scripted::Record {
                name,
                exists,
                pedigree,
            }) => RefFile {
                role,
                name: name.clone(),
                exists: if *exists {
                    Existence::Yes
                } else {
                    Existence::No
                },
                pedigree: if *exists { *pedigree } else { Pedigree::Good },
                descrip: String::new(),
            },
            None => RefFile::not_found(role, ""),
        };
        if record.exists() {
            apply_pedigree(&record, switch);
        }
        Ok(record)
    }
}

impl ReferenceResolver for ScriptedResolver {
    fn resolve_table<H: Header>(
        &self,
        _header: &H,
        role: RefRole,
        switch: Option<&mut CalSwitch>,
    ) -> Result<RefFile> {
        self.resolve_scripted(role, switch)
    }

    fn resolve_image<H: Header>(
        &self,
        _header: &H,
        role: RefRole,
        switch: Option<&mut CalSwitch>,
    ) -> Result<RefFile> {
        self.resolve_scripted(role, switch)
    }
}

/// Temporary directory laid out as a reference tree plus config and header files.
///
/// Reference files live under `jref/` and are addressed as `jref$<file>`.
pub struct RefFixture {
    temp: TempDir,
    manifest: ReferenceManifest,
}

impl RefFixture {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        fs::create_dir_all(temp.path().join("jref")).context("create jref dir")?;
        Ok(Self {
            temp,
            manifest: ReferenceManifest::default(),
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("calgate.toml")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path().join("refs.json")
    }

    /// Create an empty reference file and return its `jref$` name.
    pub fn add_reference(&self, file: &str) -> Result<String> {
        let path = self.path().join("jref").join(file);
        fs::write(&path, b"").with_context(|| format!("write {}", path.display()))?;
        Ok(format!("jref${file}"))
    }

    /// Create a reference file whose manifest entry has dummy pedigree.
    pub fn add_dummy_reference(&mut self, file: &str) -> Result<String> {
        let name = self.add_reference(file)?;
        self.manifest.insert(file, "DUMMY", "placeholder");
        Ok(name)
    }

    /// Write `calgate.toml` and the manifest pointing at this fixture.
    pub fn write_config(&self) -> Result<()> {
        let manifest = serde_json::to_string_pretty(&self.manifest).context("serialize manifest")?;
        fs::write(self.manifest_path(), manifest).context("write manifest")?;
        let config = "env_ref_dirs = false\nmanifest = \"refs.json\"\n\n[ref_dirs]\njref = \"jref\"\n";
        fs::write(self.config_path(), config).context("write config")?;
        Ok(())
    }

    /// Write a header snapshot and return its path.
    pub fn write_header(&self, file: &str, pairs: &[(&str, &str)]) -> Result<PathBuf> {
        let keywords: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
            .collect();
        let document = serde_json::json!({ "keywords": keywords });
        let path = self.path().join(file);
        let mut payload = serde_json::to_string_pretty(&document).context("serialize header")?;
        payload.push('\n');
        fs::write(&path, payload).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
