//! `#[wasm_bindgen]` entry points and page-lifetime wiring.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use folio_core::{
    LocaleCode, LocaleCoordinator, SiteConfig, SwitchOrigin, TimelineSpec, TypingTiming,
};
use serde::Deserialize;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, Window};

use crate::dom::{js_error_text, DomPage};
use crate::fetch::HttpSource;
use crate::storage::LocalPreferences;
use crate::timer::{typing_machine, SharedTyping};

const TYPING_TARGET_ID: &str = "lead-text-span";
const CURRENT_YEAR_ID: &str = "current-year";
const LOCALE_BUTTONS: &str = "[data-locale]";
const WIRED_ATTRIBUTE: &str = "data-locale-wired";

type SiteCoordinator = LocaleCoordinator<DomPage, SharedTyping, LocalPreferences>;

struct Site {
    coordinator: RefCell<SiteCoordinator>,
    source: HttpSource,
}

thread_local! {
    static SITE: RefCell<Option<Rc<Site>>> = RefCell::new(None);
}

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&JsValue::from_str("logger already installed"));
        }
    });
}

#[derive(Deserialize)]
struct JsTypingTiming {
    #[serde(default)]
    start_ms: Option<u32>,
    #[serde(default)]
    type_ms: Option<u32>,
    #[serde(default)]
    read_pause_ms: Option<u32>,
    #[serde(default)]
    erase_ms: Option<u32>,
    #[serde(default)]
    next_text_ms: Option<u32>,
}

impl JsTypingTiming {
    fn merge_into(self, base: &mut TypingTiming) {
        if let Some(ms) = self.start_ms {
            base.start_ms = ms;
        }
        if let Some(ms) = self.type_ms {
            base.type_ms = ms;
        }
        if let Some(ms) = self.read_pause_ms {
            base.read_pause_ms = ms;
        }
        if let Some(ms) = self.erase_ms {
            base.erase_ms = ms;
        }
        if let Some(ms) = self.next_text_ms {
            base.next_text_ms = ms;
        }
    }
}

#[derive(Deserialize)]
struct JsSiteConfig {
    #[serde(default)]
    default_locale: Option<String>,
    #[serde(default)]
    resource_base: Option<String>,
    #[serde(default)]
    preference_key: Option<String>,
    #[serde(default)]
    typing: Option<JsTypingTiming>,
    #[serde(default)]
    timelines: Option<Vec<TimelineSpec>>,
}

impl TryFrom<JsSiteConfig> for SiteConfig {
    type Error = JsValue;

    fn try_from(cfg: JsSiteConfig) -> Result<Self, Self::Error> {
        let mut base = SiteConfig::default();
        if let Some(code) = cfg.default_locale {
            base.default_locale =
                LocaleCode::parse(&code).map_err(|err| JsValue::from_str(&err.to_string()))?;
        }
        if let Some(path) = cfg.resource_base {
            base.resource_base = path;
        }
        if let Some(key) = cfg.preference_key {
            base.preference_key = key;
        }
        if let Some(timing) = cfg.typing {
            timing.merge_into(&mut base.typing);
        }
        if let Some(timelines) = cfg.timelines {
            base.timelines = timelines;
        }
        Ok(base)
    }
}

/// Wire the page and load the startup locale.
///
/// `config` is an optional object whose fields override the defaults one by
/// one. Calling this again replaces the previous site state; buttons already
/// wired keep their single listener, which always targets the current state.
#[wasm_bindgen]
pub fn start_site(config: Option<JsValue>) -> Result<(), JsValue> {
    init_logging();

    let config = match config {
        Some(js_cfg) => {
            let cfg: JsSiteConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("invalid site config: {err}")))?;
            SiteConfig::try_from(cfg)?
        }
        None => SiteConfig::default(),
    };

    let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document: Document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    show_current_year(&document);
    if let Some(root) = document.document_element() {
        root.class_list().remove_1("no-js")?;
    }

    let typing = typing_machine(
        window.clone(),
        document.get_element_by_id(TYPING_TARGET_ID),
        config.typing,
    );
    let prefs = LocalPreferences::new(&window, config.preference_key.clone());
    let source = HttpSource::new(config.clone());
    let coordinator = LocaleCoordinator::new(config, DomPage::new(document.clone()), typing, prefs);
    let startup = coordinator.startup_locale();

    let site = Rc::new(Site {
        coordinator: RefCell::new(coordinator),
        source,
    });
    SITE.with(|slot| *slot.borrow_mut() = Some(site.clone()));

    wire_locale_buttons(&document)?;

    wasm_bindgen_futures::spawn_local(async move {
        // Failure is already logged; the page keeps its authored text.
        let _ = folio_core::switch_locale(
            &site.coordinator,
            &site.source,
            startup.as_str(),
            SwitchOrigin::Startup,
        )
        .await;
    });
    Ok(())
}

/// Switch the page to `locale` and remember the choice.
///
/// Resolves to the active locale code; rejects if the locale is unsupported
/// or its catalog could not be loaded, in which case the page is unchanged.
#[wasm_bindgen]
pub async fn switch_locale(locale: String) -> Result<JsValue, JsValue> {
    let site = SITE
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("start_site has not run"))?;

    folio_core::switch_locale(&site.coordinator, &site.source, &locale, SwitchOrigin::User)
        .await
        .map(|active| JsValue::from_str(active.as_str()))
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

fn show_current_year(document: &Document) {
    if let Some(target) = document.get_element_by_id(CURRENT_YEAR_ID) {
        let year = js_sys::Date::new_0().get_full_year();
        target.set_text_content(Some(&year.to_string()));
    }
}

/// Attach a click listener to every locale button not wired yet.
/// Returns the number of buttons wired by this call.
pub(crate) fn wire_locale_buttons(document: &Document) -> Result<u32, JsValue> {
    let buttons = document.query_selector_all(LOCALE_BUTTONS)?;
    let mut wired = 0;
    for index in 0..buttons.length() {
        let Some(button) = buttons.item(index).and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        if button.has_attribute(WIRED_ATTRIBUTE) {
            continue;
        }
        let Some(code) = button.get_attribute("data-locale") else {
            continue;
        };

        let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            let code = code.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = switch_locale(code).await {
                    log::warn!("{}", js_error_text(&err));
                }
            });
        });
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        button.set_attribute(WIRED_ATTRIBUTE, "")?;
        // Buttons live as long as the page.
        on_click.forget();
        wired += 1;
    }
    Ok(wired)
}
