//! Core of the site's locale pipeline: catalogs, the typing animation, the
//! timeline transformer and the coordinator that sequences them on a switch.

pub mod apply;
mod catalog;
mod config;
mod error;
mod locale;
pub mod memory;
mod switcher;
pub mod timeline;
pub mod typing;

pub use apply::{apply, typing_texts, ApplyReport, Marker, PageSurface, TypingSource};
pub use catalog::{CatalogSource, TranslationCatalog};
pub use config::{SiteConfig, TimelineSpec, TypingTiming};
pub use error::I18nError;
pub use locale::LocaleCode;
pub use switcher::{
    rebuild_timeline, switch_locale, LocaleCoordinator, PreferenceStore, SwitchOrigin,
    TypingControl,
};
pub use typing::{ManualDriver, Phase, StepTicket, TypingDriver, TypingMachine};
