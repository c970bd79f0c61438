use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use folio_core::memory::{MemoryPage, MemoryPreferences};
use folio_core::timeline::{ContentBlock, TimelineChild, TimelineContainer, DATE_ATTRIBUTE};
use folio_core::{
    apply, switch_locale, typing_texts, CatalogSource, I18nError, LocaleCode, LocaleCoordinator, ManualDriver,
    Marker, Phase, SiteConfig, SwitchOrigin, TranslationCatalog, TypingMachine,
};
use futures::executor::block_on;

type Typing = Rc<RefCell<TypingMachine<ManualDriver>>>;
type Coordinator = LocaleCoordinator<MemoryPage, Typing, MemoryPreferences>;

struct FixedSource {
    catalogs: HashMap<LocaleCode, TranslationCatalog>,
}

impl FixedSource {
    fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert(
            LocaleCode::De,
            TranslationCatalog::from_pairs(
                LocaleCode::De,
                [
                    ("GREETING", "Hallo"),
                    ("lead-1", "Entwickler"),
                    ("lead-2", "Bergsteiger"),
                    ("date-job", "2020 - heute"),
                    ("search", "Suchen"),
                ],
            ),
        );
        catalogs.insert(
            LocaleCode::En,
            TranslationCatalog::from_pairs(
                LocaleCode::En,
                [
                    ("GREETING", "Hello"),
                    ("lead-1", "Developer"),
                    ("date-job", "2020 - today"),
                ],
            ),
        );
        Self { catalogs }
    }
}

impl CatalogSource for FixedSource {
    async fn fetch(&self, locale: LocaleCode) -> Result<TranslationCatalog, I18nError> {
        self.catalogs
            .get(&locale)
            .cloned()
            .ok_or_else(|| I18nError::unavailable(locale, "no such resource"))
    }
}

struct Fixture {
    coordinator: RefCell<Coordinator>,
    typing: Typing,
    greeting: usize,
    missing: usize,
    search: usize,
}

fn fixture(prefs: MemoryPreferences) -> Fixture {
    let mut page = MemoryPage::new();
    let greeting = page.push_text("GREETING", "Hello");
    let missing = page.push_text("MISSING", "unchanged");
    let search = page.push_tagged(Marker::Placeholder, "search", "");
    page.push_typing_source("lead-1", "Developer");
    page.push_typing_source("lead-2", "Climber");
    page.push_timeline(TimelineContainer::new(
        "experience-timeline",
        vec![
            ContentBlock::new("<h3>Job</h3>")
                .with_date("2020 - now")
                .with_attribute(Marker::Date.key_attribute(), "date-job"),
            ContentBlock::new("<h3>Internship</h3>"),
        ],
    ));

    let typing: Typing = Rc::new(RefCell::new(TypingMachine::new(
        ManualDriver::new(),
        Default::default(),
    )));
    let coordinator = LocaleCoordinator::new(SiteConfig::default(), page, typing.clone(), prefs);
    Fixture {
        coordinator: RefCell::new(coordinator),
        typing,
        greeting,
        missing,
        search,
    }
}

#[test]
fn apply_replaces_known_keys_and_keeps_missing_ones() {
    let mut page = MemoryPage::new();
    let greeting = page.push_text("GREETING", "Hello");
    let missing = page.push_text("MISSING", "Keep me");
    let catalog = TranslationCatalog::from_pairs(LocaleCode::De, [("GREETING", "Hallo")]);

    let report = apply(&mut page, &catalog, LocaleCode::De);

    assert_eq!(page.html(greeting), Some("Hallo"));
    assert_eq!(page.html(missing), Some("Keep me"));
    assert_eq!(report.applied, 1);
    assert_eq!(report.missing, vec!["MISSING".to_string()]);
    assert_eq!(page.indicator, "DE");
}

#[test]
fn user_switch_updates_every_dependent() {
    let fx = fixture(MemoryPreferences::default());
    let source = FixedSource::new();

    let locale = block_on(switch_locale(&fx.coordinator, &source, "de", SwitchOrigin::User)).unwrap();
    assert_eq!(locale, LocaleCode::De);

    let coordinator = fx.coordinator.borrow();
    let page = coordinator.page();
    assert_eq!(page.lang, Some(LocaleCode::De));
    assert_eq!(page.html(fx.greeting), Some("Hallo"));
    assert_eq!(page.html(fx.missing), Some("unchanged"));
    assert_eq!(page.attribute(fx.search, "placeholder"), Some("Suchen"));
    assert_eq!(coordinator.prefs().stored.as_deref(), Some("de"));
    assert_eq!(coordinator.active(), Some(LocaleCode::De));

    let timeline = page.timeline("experience-timeline").unwrap();
    assert!(timeline.is_decorated());
    let TimelineChild::Point(job) = &timeline.children[0] else {
        panic!("expected decorated block");
    };
    assert_eq!(job.date.as_deref(), Some("2020 - heute"));
    assert_eq!(job.icon, "fa fa-briefcase");

    let typing = fx.typing.borrow();
    assert_eq!(typing.texts(), ["Entwickler", "Bergsteiger"]);
    assert_eq!(typing.phase(), Phase::Typing);
    assert_eq!(typing.driver().queued().len(), 1);
}

#[test]
fn typing_source_without_translation_keeps_its_text() {
    let fx = fixture(MemoryPreferences::default());
    let source = FixedSource::new();

    block_on(switch_locale(&fx.coordinator, &source, "en", SwitchOrigin::User)).unwrap();

    assert_eq!(fx.typing.borrow().texts(), ["Developer", "Climber"]);
}

#[test]
fn switching_twice_rebuilds_without_stacking() {
    let fx = fixture(MemoryPreferences::default());
    let source = FixedSource::new();

    block_on(switch_locale(&fx.coordinator, &source, "de", SwitchOrigin::User)).unwrap();
    fx.typing.borrow_mut().run_next();
    fx.typing.borrow_mut().run_next();
    assert_eq!(fx.typing.borrow().rendered(), "En");

    block_on(switch_locale(&fx.coordinator, &source, "en", SwitchOrigin::User)).unwrap();

    let coordinator = fx.coordinator.borrow();
    let timeline = coordinator.page().timeline("experience-timeline").unwrap();
    assert_eq!(timeline.children.len(), 2);
    let html = timeline.to_html();
    assert_eq!(html.matches("vtimeline-point").count(), 2);
    assert_eq!(html.matches("vtimeline-date").count(), 1);
    assert!(html.contains("2020 - today"));
    assert_eq!(
        timeline.block(0).unwrap().attributes.get(DATE_ATTRIBUTE).map(String::as_str),
        Some("2020 - today")
    );

    let typing = fx.typing.borrow();
    assert_eq!(typing.rendered(), "");
    assert_eq!(typing.driver().queued().len(), 1);
    assert_eq!(coordinator.page().html(fx.greeting), Some("Hello"));
    assert_eq!(coordinator.prefs().stored.as_deref(), Some("en"));
}

#[test]
fn failed_fetch_leaves_state_untouched() {
    let fx = fixture(MemoryPreferences::default());
    let source = FixedSource::new();
    block_on(switch_locale(&fx.coordinator, &source, "de", SwitchOrigin::User)).unwrap();
    fx.typing.borrow_mut().run_next();
    let html_before = fx
        .coordinator
        .borrow()
        .page()
        .timeline("experience-timeline")
        .unwrap()
        .to_html();

    // No French catalog in the fixture source.
    let err = block_on(switch_locale(&fx.coordinator, &source, "fr", SwitchOrigin::User)).unwrap_err();
    assert!(matches!(err, I18nError::CatalogUnavailable { locale: LocaleCode::Fr, .. }));

    let coordinator = fx.coordinator.borrow();
    assert_eq!(coordinator.active(), Some(LocaleCode::De));
    assert_eq!(coordinator.page().lang, Some(LocaleCode::De));
    assert_eq!(coordinator.page().html(fx.greeting), Some("Hallo"));
    assert_eq!(coordinator.prefs().stored.as_deref(), Some("de"));
    assert_eq!(
        coordinator.page().timeline("experience-timeline").unwrap().to_html(),
        html_before
    );
    assert_eq!(fx.typing.borrow().rendered(), "E");
}

#[test]
fn unsupported_locale_is_rejected_before_side_effects() {
    let fx = fixture(MemoryPreferences::default());
    let source = FixedSource::new();

    let err = block_on(switch_locale(&fx.coordinator, &source, "xx", SwitchOrigin::User)).unwrap_err();
    assert_eq!(err, I18nError::UnsupportedLocale("xx".to_string()));

    let coordinator = fx.coordinator.borrow();
    assert_eq!(coordinator.active(), None);
    assert_eq!(coordinator.page().lang, None);
    assert_eq!(coordinator.prefs().writes, 0);
    assert!(fx.typing.borrow().driver().queued().is_empty());
}

#[test]
fn startup_locale_prefers_valid_stored_value() {
    let stored = fixture(MemoryPreferences::with_stored("EN"));
    assert_eq!(stored.coordinator.borrow().startup_locale(), LocaleCode::En);

    let garbage = fixture(MemoryPreferences::with_stored("klingon"));
    assert_eq!(garbage.coordinator.borrow().startup_locale(), LocaleCode::De);

    let empty = fixture(MemoryPreferences::default());
    assert_eq!(empty.coordinator.borrow().startup_locale(), LocaleCode::De);
}

#[test]
fn startup_switch_does_not_persist() {
    let fx = fixture(MemoryPreferences::with_stored("en"));
    let source = FixedSource::new();
    let startup = fx.coordinator.borrow().startup_locale();

    block_on(switch_locale(
        &fx.coordinator,
        &source,
        startup.as_str(),
        SwitchOrigin::Startup,
    ))
    .unwrap();

    let coordinator = fx.coordinator.borrow();
    assert_eq!(coordinator.active(), Some(LocaleCode::En));
    assert_eq!(coordinator.prefs().writes, 0);
}

#[test]
fn typing_texts_use_rendered_text_not_markup() {
    let mut page = MemoryPage::new();
    page.push_typing_source("lead-1", "Developer");
    page.push_typing_source("lead-2", "Fish &amp; chips");
    let catalog = TranslationCatalog::from_pairs(
        LocaleCode::En,
        [("lead-1", "Tom &amp; <em>Jerry</em>")],
    );

    apply(&mut page, &catalog, LocaleCode::En);

    assert_eq!(typing_texts(&page), ["Tom & Jerry", "Fish & chips"]);
}

#[test]
fn switch_feeds_rendered_text_to_the_animation() {
    let fx = fixture(MemoryPreferences::default());
    let source = FixedSource::new();
    {
        let mut coordinator = fx.coordinator.borrow_mut();
        let catalog = TranslationCatalog::from_pairs(
            LocaleCode::En,
            [("lead-1", "<strong>Rust</strong> &lt;dev&gt;")],
        );
        coordinator.commit(LocaleCode::En, catalog, SwitchOrigin::User);
    }
    assert_eq!(fx.typing.borrow().texts(), ["Rust <dev>", "Climber"]);

    block_on(switch_locale(&fx.coordinator, &source, "de", SwitchOrigin::User)).unwrap();
    assert_eq!(fx.typing.borrow().texts(), ["Entwickler", "Bergsteiger"]);
}
