//! Browser binding of the locale pipeline.
//!
//! Only meaningful on `wasm32`: the page surface talks to the live DOM,
//! typing steps run on `setTimeout`, the locale preference lives in
//! `localStorage` and catalogs are fetched over HTTP.

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod storage;
#[cfg(target_arch = "wasm32")]
mod timer;

#[cfg(target_arch = "wasm32")]
pub use app::{start_site, switch_locale};
#[cfg(target_arch = "wasm32")]
pub use dom::{DomBlock, DomPage};
#[cfg(target_arch = "wasm32")]
pub use fetch::HttpSource;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalPreferences;
#[cfg(target_arch = "wasm32")]
pub use timer::{typing_machine, SharedTyping, TimerHandle, WindowDriver};

#[cfg(not(target_arch = "wasm32"))]
pub fn start_site(_: Option<wasm_bindgen::JsValue>) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "folio-ui only supports the wasm32 target",
    ))
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn switch_locale(_: String) -> Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "folio-ui only supports the wasm32 target",
    ))
}
