use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{I18nError, LocaleCode};

/// Flat key -> localized string mapping for one locale.
///
/// Values may carry inline markup; catalogs are shipped with the site and
/// are trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationCatalog {
    locale: Option<LocaleCode>,
    entries: HashMap<String, String>,
}

impl TranslationCatalog {
    /// Builds a catalog from `(name, text)` pairs in document order.
    /// A repeated name keeps the last value seen.
    pub fn from_pairs<I, K, V>(locale: LocaleCode, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = HashMap::new();
        for (name, text) in pairs {
            entries.insert(name.into(), text.into());
        }
        Self {
            locale: Some(locale),
            entries,
        }
    }

    pub fn locale(&self) -> Option<LocaleCode> {
        self.locale
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order, for stable reports.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Anything able to produce the catalog for a locale.
///
/// The returned future may suspend on I/O; callers must not hold borrows of
/// shared page state across it.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn fetch(&self, locale: LocaleCode) -> Result<TranslationCatalog, I18nError>;
}
