//! Exposure header snapshots stored as JSON.
//!
//! A snapshot is `{ "keywords": { "DETECTOR": "WFC", ... } }`. Files are
//! validated against the embedded schema before they are deserialized.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::lookup::Header;

const HEADER_SCHEMA: &str = include_str!("../../schemas/header.schema.json");

/// A single header value. Logical values read back as FITS `T`/`F`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl HeaderValue {
    fn as_text(&self) -> String {
        match self {
            HeaderValue::Text(text) => text.clone(),
            HeaderValue::Number(number) => number.to_string(),
            HeaderValue::Flag(true) => "T".to_string(),
            HeaderValue::Flag(false) => "F".to_string(),
        }
    }
}

/// In-memory header keyed by upper-case keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordHeader {
    keywords: BTreeMap<String, HeaderValue>,
}

impl KeywordHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: HeaderValue) {
        self.keywords.insert(name.trim().to_ascii_uppercase(), value);
    }

    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.insert(name, HeaderValue::Text(value.to_string()));
        self
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    fn normalized(self) -> Self {
        let mut header = Self::new();
        for (name, value) in self.keywords {
            header.insert(&name, value);
        }
        header
    }
}

impl Header for KeywordHeader {
    fn keyword(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .keywords
            .get(&name.trim().to_ascii_uppercase())
            .map(HeaderValue::as_text))
    }
}

/// Load and validate a header snapshot from disk.
pub fn load_header(path: &Path) -> Result<KeywordHeader> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read header {}", path.display()))?;
    parse_header(&contents).with_context(|| format!("load header {}", path.display()))
}

/// Parse and validate a header snapshot.
pub fn parse_header(contents: &str) -> Result<KeywordHeader> {
    let value: Value = serde_json::from_str(contents).context("parse header json")?;
    validate_schema(&value)?;
    let header: KeywordHeader = serde_json::from_value(value).context("deserialize header")?;
    Ok(header.normalized())
}

fn validate_schema(instance: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(HEADER_SCHEMA).context("parse header schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(instance) {
        let messages = compiled
            .iter_errors(instance)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "header schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
