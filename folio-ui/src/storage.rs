use folio_core::{LocaleCode, PreferenceStore};
use web_sys::{Storage, Window};

use crate::dom::js_error_text;

/// Locale preference kept in `localStorage` under a fixed key.
pub struct LocalPreferences {
    key: String,
    storage: Option<Storage>,
}

impl LocalPreferences {
    pub fn new(window: &Window, key: impl Into<String>) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                log::warn!("localStorage unavailable: {}", js_error_text(&err));
                None
            }
        };
        Self {
            key: key.into(),
            storage,
        }
    }
}

impl PreferenceStore for LocalPreferences {
    fn load(&self) -> Option<String> {
        self.storage.as_ref()?.get_item(&self.key).ok().flatten()
    }

    fn save(&mut self, locale: LocaleCode) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(err) = storage.set_item(&self.key, locale.as_str()) {
            log::warn!("locale preference not saved: {}", js_error_text(&err));
        }
    }
}
