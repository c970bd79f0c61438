use serde::Serialize;

use crate::timeline::{ContentNode, TimelineEntry, TimelinePoint};
use crate::{I18nError, LocaleCode, TranslationCatalog};

/// Kinds of translatable attachment points in the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Rendered content is replaced.
    Text,
    /// The block's date attribute is set; timelines read it on rebuild.
    Date,
    /// The input placeholder is set.
    Placeholder,
}

impl Marker {
    pub const ALL: [Marker; 3] = [Marker::Text, Marker::Date, Marker::Placeholder];

    /// Attribute holding the translation key.
    pub fn key_attribute(self) -> &'static str {
        match self {
            Self::Text => "data-i18n",
            Self::Date => "data-i18n-date",
            Self::Placeholder => "data-i18n-placeholder",
        }
    }

    /// Attribute receiving the value, or `None` for content.
    pub fn target_attribute(self) -> Option<&'static str> {
        match self {
            Self::Text => None,
            Self::Date => Some(crate::timeline::DATE_ATTRIBUTE),
            Self::Placeholder => Some("placeholder"),
        }
    }
}

/// A typing-text source element: its key and its rendered text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSource {
    pub key: String,
    pub text: String,
}

/// Everything the locale pipeline reads from or writes to the page.
pub trait PageSurface {
    type Node;
    type Block: ContentNode;

    /// Elements carrying `marker`, with their keys, in document order.
    fn tagged(&self, marker: Marker) -> Vec<(Self::Node, String)>;

    fn set_html(&mut self, node: &Self::Node, html: &str) -> Result<(), I18nError>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str)
        -> Result<(), I18nError>;

    fn set_locale_indicator(&mut self, label: &str);

    fn set_document_locale(&mut self, locale: LocaleCode);

    fn typing_sources(&self) -> Vec<TypingSource>;

    /// Detach the container's children, emptying it. `None` if the
    /// container is not on the page.
    fn take_timeline(&mut self, container_id: &str) -> Option<Vec<TimelineEntry<Self::Block>>>;

    fn put_timeline(
        &mut self,
        container_id: &str,
        points: Vec<TimelinePoint<Self::Block>>,
    ) -> Result<(), I18nError>;
}

/// Outcome of one [`apply`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: usize,
    /// Keys found on the page but absent from the catalog; those elements
    /// keep their previous text.
    pub missing: Vec<String>,
    pub failed: usize,
}

/// Write every catalog value the page asks for.
pub fn apply<P: PageSurface>(
    page: &mut P,
    catalog: &TranslationCatalog,
    locale: LocaleCode,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    for marker in Marker::ALL {
        for (node, key) in page.tagged(marker) {
            let Some(value) = catalog.get(&key) else {
                report.missing.push(key);
                continue;
            };
            let written = match marker.target_attribute() {
                None => page.set_html(&node, value),
                Some(attribute) => page.set_attribute(&node, attribute, value),
            };
            match written {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    log::warn!("could not apply {key:?}: {err}");
                    report.failed += 1;
                }
            }
        }
    }

    page.set_locale_indicator(locale.label());

    if !report.missing.is_empty() {
        log::warn!(
            "{} keys missing from {locale} catalog: {}",
            report.missing.len(),
            report.missing.join(", ")
        );
    }
    report
}

/// Typing texts in source order, read back from the source elements after
/// translations are applied.
///
/// Sources therefore yield their rendered text: markup in a catalog value is
/// never typed out, and keys the catalog lacks keep the element's own text.
pub fn typing_texts<P: PageSurface>(page: &P) -> Vec<String> {
    page.typing_sources()
        .into_iter()
        .map(|source| source.text)
        .collect()
}
