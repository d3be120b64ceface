//! Host-facing configuration.
//!
//! The host passes a single camelCase config object to `open`. Plain fields
//! deserialize through serde; hook callbacks are JS `Function`s and are
//! extracted separately with `Reflect` (functions cannot pass through serde).

use serde::Deserialize;

#[cfg(target_arch = "wasm32")]
use js_sys::Function;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

use crate::error::{Result, ViewerError};

/// Placeholder in the page-indicator template replaced by the current page.
pub const PAGE_PLACEHOLDER: &str = "{page}";
/// Placeholder replaced by the total page count.
pub const PAGES_PLACEHOLDER: &str = "{pages}";

/// Options accepted by `open`. Unknown keys (including the hook functions)
/// are ignored here; every field has a default so hosts only set what they
/// need.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerOptions {
    /// Document URL handed to the rasterization engine (and to print/download).
    pub url: String,
    /// Header caption.
    pub title: String,
    /// Page-indicator template; `{page}` and `{pages}` are substituted.
    pub title_page_number: String,
    /// Page-indicator caption while loading or rendering.
    pub title_loading: String,
    /// Allow dragging the frame by its header.
    pub is_moveable: bool,
    /// Close on Escape.
    pub is_closing_on_escape: bool,
    /// Close on clicks landing exactly on the backdrop.
    pub is_closing_on_click_outside: bool,
    /// Show and enable the download control.
    pub is_downloading_on_click: bool,
    /// Show and enable the print control.
    pub is_printing_on_click: bool,
    /// Per-region style overrides, appended after the built-in styles.
    pub style_backdrop: Option<String>,
    pub style_frame: Option<String>,
    pub style_header: Option<String>,
    pub style_body: Option<String>,
    pub style_controls: Option<String>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            title: "Document".to_string(),
            title_page_number: "{page} / {pages}".to_string(),
            title_loading: "Loading\u{2026}".to_string(),
            is_moveable: false,
            is_closing_on_escape: true,
            is_closing_on_click_outside: true,
            is_downloading_on_click: true,
            is_printing_on_click: true,
            style_backdrop: None,
            style_frame: None,
            style_header: None,
            style_body: None,
            style_controls: None,
        }
    }
}

impl ViewerOptions {
    /// Render the page-indicator text for the given position.
    pub fn page_indicator(&self, page: u32, pages: u32) -> String {
        self.title_page_number
            .replace(PAGE_PLACEHOLDER, &page.to_string())
            .replace(PAGES_PLACEHOLDER, &pages.to_string())
    }

    /// Deserialize the host config object. An absent/undefined config yields
    /// the defaults; a present but malformed one is a `Config` error.
    #[cfg(target_arch = "wasm32")]
    pub fn from_js(config: &JsValue) -> Result<Self> {
        if config.is_undefined() || config.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(config.clone())
            .map_err(|e| ViewerError::Config(e.to_string()))
    }

    /// Validate fields serde cannot: the engine needs a URL to load.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ViewerError::Config("url is required".to_string()));
        }
        Ok(())
    }
}

/// Lifecycle hook callbacks supplied with the config object.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub(crate) struct ViewerHooks {
    pub before_open: Option<Function>,
    pub after_open: Option<Function>,
    pub before_close: Option<Function>,
    pub after_close: Option<Function>,
    pub on_error: Option<Function>,
}

#[cfg(target_arch = "wasm32")]
impl ViewerHooks {
    pub fn from_js(config: &JsValue) -> Self {
        Self {
            before_open: hook_fn(config, "onBeforeOpen"),
            after_open: hook_fn(config, "onAfterOpen"),
            before_close: hook_fn(config, "onBeforeClose"),
            after_close: hook_fn(config, "onAfterClose"),
            on_error: hook_fn(config, "onError"),
        }
    }
}

/// One-shot hooks passed to a single `close` call. When present they take
/// precedence over the config-level hooks for that close.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub(crate) struct CloseHooks {
    pub before_close: Option<Function>,
    pub after_close: Option<Function>,
}

#[cfg(target_arch = "wasm32")]
impl CloseHooks {
    pub fn from_js(hooks: &JsValue) -> Self {
        Self {
            before_close: hook_fn(hooks, "onBeforeClose"),
            after_close: hook_fn(hooks, "onAfterClose"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn hook_fn(object: &JsValue, key: &str) -> Option<Function> {
    if object.is_undefined() || object.is_null() {
        return None;
    }
    js_sys::Reflect::get(object, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

/// Invoke a hook, isolating any exception it throws: the failure is reported
/// to the console and never re-enters the state machine.
#[cfg(target_arch = "wasm32")]
pub(crate) fn call_hook(hook: Option<&Function>, label: &str) {
    if let Some(hook) = hook {
        if let Err(err) = hook.call0(&JsValue::NULL) {
            web_sys::console::warn_2(
                &JsValue::from_str(&format!("pdfmodal: {label} hook threw")),
                &err,
            );
        }
    }
}

/// Invoke a hook with a single argument, with the same isolation.
#[cfg(target_arch = "wasm32")]
pub(crate) fn call_hook_with(hook: Option<&Function>, label: &str, arg: &JsValue) {
    if let Some(hook) = hook {
        if let Err(err) = hook.call1(&JsValue::NULL, arg) {
            web_sys::console::warn_2(
                &JsValue::from_str(&format!("pdfmodal: {label} hook threw")),
                &err,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn camel_case_keys_deserialize_with_defaults() {
        let json = r#"{
            "url": "files/report.pdf",
            "isMoveable": true,
            "titlePageNumber": "Page {page} of {pages}",
            "styleFrame": "border-radius: 0;"
        }"#;
        let options: ViewerOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.url, "files/report.pdf");
        assert!(options.is_moveable);
        assert_eq!(options.style_frame.as_deref(), Some("border-radius: 0;"));
        // Untouched fields keep their defaults.
        assert!(options.is_closing_on_escape);
        assert_eq!(options.title, "Document");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn defaults_are_permissive() {
        let options = ViewerOptions::default();
        assert!(options.is_closing_on_escape);
        assert!(options.is_closing_on_click_outside);
        assert!(options.is_downloading_on_click);
        assert!(options.is_printing_on_click);
        assert!(!options.is_moveable);
        assert!(options.validate().is_err(), "default has no url");
    }

    #[test]
    fn page_indicator_substitutes_both_placeholders() {
        let options = ViewerOptions::default();
        assert_eq!(options.page_indicator(2, 9), "2 / 9");

        let custom = ViewerOptions {
            title_page_number: "Page {page} of {pages}".to_string(),
            ..ViewerOptions::default()
        };
        assert_eq!(custom.page_indicator(3, 3), "Page 3 of 3");
    }
}
