//! Locale switch coordination.
//!
//! A switch has two halves. The fetch may suspend and holds no borrow of the
//! coordinator; the commit is synchronous and mutates page, typing machine
//! and timelines in one go, so two commits can never interleave.

use std::cell::RefCell;
use std::rc::Rc;

use crate::apply::{apply, typing_texts, ApplyReport, PageSurface};
use crate::timeline;
use crate::typing::{TypingDriver, TypingMachine};
use crate::{CatalogSource, I18nError, LocaleCode, SiteConfig, TranslationCatalog};

/// Persisted locale preference.
pub trait PreferenceStore {
    /// Raw stored value, if any. Callers validate it.
    fn load(&self) -> Option<String>;

    fn save(&mut self, locale: LocaleCode);
}

/// Restart hook for the typing animation.
pub trait TypingControl {
    fn restart(&mut self, texts: Vec<String>);
}

impl<D: TypingDriver> TypingControl for TypingMachine<D> {
    fn restart(&mut self, texts: Vec<String>) {
        self.reset(texts);
    }
}

impl<T: TypingControl> TypingControl for Rc<RefCell<T>> {
    fn restart(&mut self, texts: Vec<String>) {
        self.borrow_mut().restart(texts);
    }
}

/// Who asked for a switch. Only user switches are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOrigin {
    Startup,
    User,
}

pub struct LocaleCoordinator<P, T, S> {
    config: SiteConfig,
    page: P,
    typing: T,
    prefs: S,
    active: Option<LocaleCode>,
    catalog: Option<TranslationCatalog>,
    last_report: Option<ApplyReport>,
}

impl<P, T, S> LocaleCoordinator<P, T, S>
where
    P: PageSurface,
    T: TypingControl,
    S: PreferenceStore,
{
    pub fn new(config: SiteConfig, page: P, typing: T, prefs: S) -> Self {
        Self {
            config,
            page,
            typing,
            prefs,
            active: None,
            catalog: None,
            last_report: None,
        }
    }

    /// Validate a requested locale before anything else happens.
    pub fn resolve(&self, requested: &str) -> Result<LocaleCode, I18nError> {
        LocaleCode::parse(requested)
    }

    /// Stored preference if it names a supported locale, else the default.
    pub fn startup_locale(&self) -> LocaleCode {
        match self.prefs.load() {
            Some(stored) => LocaleCode::parse(&stored).unwrap_or_else(|_| {
                log::debug!("ignoring stored locale {stored:?}");
                self.config.default_locale
            }),
            None => self.config.default_locale,
        }
    }

    /// Apply a freshly loaded catalog to everything that depends on it.
    pub fn commit(
        &mut self,
        locale: LocaleCode,
        catalog: TranslationCatalog,
        origin: SwitchOrigin,
    ) -> &ApplyReport {
        self.page.set_document_locale(locale);
        if origin == SwitchOrigin::User {
            self.prefs.save(locale);
        }

        let report = apply(&mut self.page, &catalog, locale);
        let texts = typing_texts(&self.page);
        self.typing.restart(texts);

        for timeline in &self.config.timelines {
            rebuild_timeline(&mut self.page, &timeline.container_id, &timeline.icon);
        }

        log::info!(
            "switched to {locale}: {} applied, {} missing",
            report.applied,
            report.missing.len()
        );
        self.active = Some(locale);
        self.catalog = Some(catalog);
        self.last_report.insert(report)
    }

    pub fn active(&self) -> Option<LocaleCode> {
        self.active
    }

    pub fn catalog(&self) -> Option<&TranslationCatalog> {
        self.catalog.as_ref()
    }

    pub fn last_report(&self) -> Option<&ApplyReport> {
        self.last_report.as_ref()
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn typing(&self) -> &T {
        &self.typing
    }

    pub fn prefs(&self) -> &S {
        &self.prefs
    }
}

/// Normalize and redecorate one container. Returns `false` when the page has
/// no such container.
pub fn rebuild_timeline<P: PageSurface>(page: &mut P, container_id: &str, icon: &str) -> bool {
    let Some(entries) = page.take_timeline(container_id) else {
        log::debug!("timeline #{container_id} not on page");
        return false;
    };
    if let Err(err) = page.put_timeline(container_id, timeline::rebuild(entries, icon)) {
        log::warn!("timeline #{container_id} not rebuilt: {err}");
    }
    true
}

/// Full switch: validate, fetch, then commit.
///
/// On any failure the coordinator is left exactly as it was.
pub async fn switch_locale<P, T, S, L>(
    coordinator: &RefCell<LocaleCoordinator<P, T, S>>,
    source: &L,
    requested: &str,
    origin: SwitchOrigin,
) -> Result<LocaleCode, I18nError>
where
    P: PageSurface,
    T: TypingControl,
    S: PreferenceStore,
    L: CatalogSource,
{
    let locale = coordinator.borrow().resolve(requested)?;

    let catalog = match source.fetch(locale).await {
        Ok(catalog) => catalog,
        Err(err) => {
            log::warn!("locale switch to {locale} abandoned: {err}");
            return Err(err);
        }
    };

    coordinator.borrow_mut().commit(locale, catalog, origin);
    Ok(locale)
}
