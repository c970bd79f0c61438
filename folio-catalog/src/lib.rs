//! Locale resource documents to `TranslationCatalog`.
//!
//! A resource is a JSON document listing `(name, text)` pairs:
//!
//! ```json
//! { "strings": [ { "name": "nav-about", "text": "Über mich" } ] }
//! ```
//!
//! Pairs are taken in document order and a repeated name keeps the last
//! text. Any other top-level field is ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use folio_core::{CatalogSource, I18nError, LocaleCode, SiteConfig, TranslationCatalog};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct ResourceDocument {
    strings: Vec<ResourceEntry>,
}

#[derive(Deserialize)]
struct ResourceEntry {
    name: String,
    text: String,
}

/// Parse a resource document from a JSON string.
pub fn parse_catalog_str(locale: LocaleCode, document: &str) -> Result<TranslationCatalog, I18nError> {
    let value: Value = serde_json::from_str(document)
        .map_err(|err| I18nError::unavailable(locale, format!("invalid JSON: {err}")))?;
    parse_catalog_value(locale, value)
}

/// Parse a resource document already decoded into a `serde_json::Value`.
pub fn parse_catalog_value(locale: LocaleCode, document: Value) -> Result<TranslationCatalog, I18nError> {
    let document: ResourceDocument = serde_json::from_value(document)
        .map_err(|err| I18nError::unavailable(locale, format!("malformed resource: {err}")))?;

    let mut seen = HashMap::new();
    let mut pairs = Vec::with_capacity(document.strings.len());
    for entry in document.strings {
        if entry.name.trim().is_empty() {
            log::warn!("{locale}: skipping entry without a name");
            continue;
        }
        if let Some(previous) = seen.insert(entry.name.clone(), pairs.len()) {
            log::debug!("{locale}: {:?} redefined (entry {previous} replaced)", entry.name);
        }
        pairs.push((entry.name, entry.text));
    }

    Ok(TranslationCatalog::from_pairs(locale, pairs))
}

/// Keys present in `reference` but missing from `other`, sorted.
pub fn missing_keys(reference: &TranslationCatalog, other: &TranslationCatalog) -> Vec<String> {
    reference
        .keys()
        .into_iter()
        .filter(|key| !other.contains(key))
        .map(str::to_string)
        .collect()
}

/// Resources read from a directory laid out as `<dir>/<code>.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve resources the same way the site does, relative to `site_root`.
    pub fn for_site(site_root: impl AsRef<Path>, config: &SiteConfig) -> Self {
        Self::new(site_root.as_ref().join(&config.resource_base))
    }

    pub fn path_for(&self, locale: LocaleCode) -> PathBuf {
        self.root.join(format!("{}.json", locale.as_str()))
    }

    pub fn load(&self, locale: LocaleCode) -> Result<TranslationCatalog, I18nError> {
        let path = self.path_for(locale);
        let document = std::fs::read_to_string(&path).map_err(|err| {
            I18nError::unavailable(locale, format!("cannot read {}: {err}", path.display()))
        })?;
        parse_catalog_str(locale, &document)
    }
}

impl CatalogSource for DirSource {
    async fn fetch(&self, locale: LocaleCode) -> Result<TranslationCatalog, I18nError> {
        self.load(locale)
    }
}

/// Resource documents held in memory, parsed on each fetch.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<LocaleCode, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, locale: LocaleCode, document: impl Into<String>) -> Self {
        self.documents.insert(locale, document.into());
        self
    }
}

impl CatalogSource for MemorySource {
    async fn fetch(&self, locale: LocaleCode) -> Result<TranslationCatalog, I18nError> {
        let document = self
            .documents
            .get(&locale)
            .ok_or_else(|| I18nError::unavailable(locale, "no resource registered"))?;
        parse_catalog_str(locale, document)
    }
}
