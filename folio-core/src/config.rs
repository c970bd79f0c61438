use serde::{Deserialize, Serialize};

use crate::LocaleCode;

/// Delays driving the typing animation, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypingTiming {
    /// Delay before the first character after a reset.
    pub start_ms: u32,
    /// Delay between typed characters.
    pub type_ms: u32,
    /// Pause once a text is fully typed, before erasing starts.
    pub read_pause_ms: u32,
    /// Delay between erased characters.
    pub erase_ms: u32,
    /// Pause after a text is fully erased, before the next one starts.
    pub next_text_ms: u32,
}

impl Default for TypingTiming {
    fn default() -> Self {
        Self {
            start_ms: 0,
            type_ms: 50,
            read_pause_ms: 2000,
            erase_ms: 30,
            next_text_ms: 500,
        }
    }
}

/// A timeline container and the icon class its points carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineSpec {
    pub container_id: String,
    pub icon: String,
}

impl TimelineSpec {
    pub fn new(container_id: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            icon: icon.into(),
        }
    }
}

/// Site-wide settings for the locale pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    pub default_locale: LocaleCode,
    /// Directory (or URL prefix) holding `<code>.json` resources.
    pub resource_base: String,
    /// Key under which the chosen locale is persisted.
    pub preference_key: String,
    pub typing: TypingTiming,
    pub timelines: Vec<TimelineSpec>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_locale: LocaleCode::De,
            resource_base: "lang".to_string(),
            preference_key: "lang".to_string(),
            typing: TypingTiming::default(),
            timelines: vec![
                TimelineSpec::new("experience-timeline", "fa fa-briefcase"),
                TimelineSpec::new("education-timeline", "fa fa-graduation-cap"),
            ],
        }
    }
}

impl SiteConfig {
    /// Location of the resource for `locale`, a pure function of the code.
    pub fn resource_path(&self, locale: LocaleCode) -> String {
        let base = self.resource_base.trim_end_matches('/');
        if base.is_empty() {
            format!("{}.json", locale.as_str())
        } else {
            format!("{base}/{}.json", locale.as_str())
        }
    }
}
