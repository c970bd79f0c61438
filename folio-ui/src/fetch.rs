use folio_core::{CatalogSource, I18nError, LocaleCode, SiteConfig, TranslationCatalog};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::dom::js_error_text;

/// Fetches `<resource_base>/<code>.json` relative to the page.
pub struct HttpSource {
    config: SiteConfig,
}

impl HttpSource {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }
}

impl CatalogSource for HttpSource {
    async fn fetch(&self, locale: LocaleCode) -> Result<TranslationCatalog, I18nError> {
        let fail = |reason: String| I18nError::unavailable(locale, reason);

        let window = web_sys::window().ok_or_else(|| fail("no window".to_string()))?;
        let url = self.config.resource_path(locale);

        let response = JsFuture::from(window.fetch_with_str(&url))
            .await
            .map_err(|err| fail(format!("fetching {url}: {}", js_error_text(&err))))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| fail(format!("fetching {url}: not a Response")))?;
        if !response.ok() {
            return Err(fail(format!("HTTP {} for {url}", response.status())));
        }

        let body = response
            .text()
            .map_err(|err| fail(js_error_text(&err)))?;
        let body = JsFuture::from(body)
            .await
            .map_err(|err| fail(format!("reading {url}: {}", js_error_text(&err))))?;
        let body = body
            .as_string()
            .ok_or_else(|| fail(format!("reading {url}: body is not text")))?;

        folio_catalog::parse_catalog_str(locale, &body)
    }
}
