use crate::LocaleCode;

/// Failures surfaced by a locale switch.
///
/// A missing translation key is deliberately absent here: the applicator
/// keeps the previous text and records the key in its report instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum I18nError {
    #[error("unsupported locale: {0:?}")]
    UnsupportedLocale(String),
    #[error("catalog for locale {locale} unavailable: {reason}")]
    CatalogUnavailable { locale: LocaleCode, reason: String },
    #[error("page surface error: {0}")]
    Surface(String),
}

impl I18nError {
    pub fn unavailable(locale: LocaleCode, reason: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            locale,
            reason: reason.into(),
        }
    }
}
