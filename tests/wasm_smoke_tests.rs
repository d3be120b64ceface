//! Browser-targeted smoke tests.
//!
//! Run with `wasm-pack test --headless --chrome`. The substantive coverage
//! lives in the native tests over the session core; these only prove the
//! wasm surface links and exports.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn version_is_exposed() {
    assert!(!pdfmodal::version().is_empty());
}

#[wasm_bindgen_test]
fn default_options_need_a_url() {
    let options = pdfmodal::ViewerOptions::default();
    assert!(options.validate().is_err());
}
