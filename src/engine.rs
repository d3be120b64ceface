//! Boundary to the host-supplied rasterization engine.
//!
//! The engine is an opaque JS object the host hands to the constructor. This
//! layer depends on exactly two operations: loading a document and rendering
//! one page into a canvas. Everything else about the document format is the
//! engine's business.

use js_sys::{Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlCanvasElement;

use crate::error::{Result, ViewerError};

#[wasm_bindgen]
extern "C" {
    /// Host-supplied document engine.
    #[derive(Clone)]
    pub type DocumentEngine;

    /// `loadDocument(url)` resolving to `{pageCount, handle}`.
    #[wasm_bindgen(method, js_name = loadDocument)]
    pub fn load_document(this: &DocumentEngine, url: &str) -> Promise;

    /// Opaque handle to a loaded document. Exclusively owned by the session;
    /// destroyed exactly once, at close.
    #[derive(Clone)]
    pub type DocumentHandle;

    /// `getPage(n)` resolving to a page handle. Pages are 1-based.
    #[wasm_bindgen(method, js_name = getPage)]
    pub fn get_page(this: &DocumentHandle, page_number: u32) -> Promise;

    /// Releases engine-side resources.
    #[wasm_bindgen(method)]
    pub fn destroy(this: &DocumentHandle);

    /// Handle to one page of a loaded document.
    #[derive(Clone)]
    pub type PageHandle;

    /// `getViewport({scale})` returning the scaled page dimensions.
    #[wasm_bindgen(method, js_name = getViewport)]
    pub fn get_viewport(this: &PageHandle, params: &JsValue) -> PageViewport;

    /// `renderTo(surface, viewport)` resolving when the raster is on the
    /// canvas.
    #[wasm_bindgen(method, js_name = renderTo)]
    pub fn render_to(
        this: &PageHandle,
        surface: &HtmlCanvasElement,
        viewport: &PageViewport,
    ) -> Promise;

    /// Scaled page dimensions.
    pub type PageViewport;

    #[wasm_bindgen(method, getter)]
    pub fn width(this: &PageViewport) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn height(this: &PageViewport) -> f64;
}

/// Result of a successful document load.
pub(crate) struct LoadedDocument {
    pub handle: DocumentHandle,
    pub page_count: u32,
}

/// Load a document. Engine rejections become `ViewerError::Load`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) async fn load(engine: &DocumentEngine, url: &str) -> Result<LoadedDocument> {
    let outcome = JsFuture::from(engine.load_document(url))
        .await
        .map_err(|err| ViewerError::Load(js_error_message(&err)))?;
    let page_count = Reflect::get(&outcome, &JsValue::from_str("pageCount"))
        .ok()
        .and_then(|value| value.as_f64())
        .ok_or_else(|| ViewerError::Load("engine returned no pageCount".to_string()))?;
    let handle = Reflect::get(&outcome, &JsValue::from_str("handle"))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
        .ok_or_else(|| ViewerError::Load("engine returned no document handle".to_string()))?
        .unchecked_into::<DocumentHandle>();
    Ok(LoadedDocument {
        handle,
        page_count: page_count.max(0.0) as u32,
    })
}

/// Rasterize one page into the surface at the given scale. The surface is
/// resized to the scaled viewport before drawing.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) async fn render_page(
    handle: &DocumentHandle,
    page_number: u32,
    scale: f32,
    surface: &HtmlCanvasElement,
) -> Result<()> {
    let page = JsFuture::from(handle.get_page(page_number))
        .await
        .map_err(|err| ViewerError::Render(js_error_message(&err)))?
        .unchecked_into::<PageHandle>();

    let params = js_sys::Object::new();
    let _ = Reflect::set(
        &params,
        &JsValue::from_str("scale"),
        &JsValue::from_f64(f64::from(scale)),
    );
    let viewport = page.get_viewport(&params);
    surface.set_width(viewport.width().max(1.0) as u32);
    surface.set_height(viewport.height().max(1.0) as u32);

    JsFuture::from(page.render_to(surface, &viewport))
        .await
        .map_err(|err| ViewerError::Render(js_error_message(&err)))?;
    Ok(())
}

/// Best-effort message extraction from a JS rejection value.
pub(crate) fn js_error_message(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "unknown engine failure".to_string())
}
