//! Print and download integration.
//!
//! Both operations are guarded by their own busy flag, set before the work
//! begins and cleared on every exit path, and neither may start while the
//! other or a render is in flight. Each swaps its trigger to a transient
//! busy caption and restores it afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAnchorElement;

use crate::engine::js_error_message;
use crate::error::{Result, ViewerError};
use crate::filename::download_file_name;
use crate::overlay::Overlay;

use super::{PdfModal, SharedState};

#[wasm_bindgen]
extern "C" {
    /// Host-supplied print pipeline.
    #[derive(Clone)]
    pub type PrintPipeline;

    /// `print({printable, type, onLoadingEnd, onError})`. The pipeline owns
    /// the browser print dialog; completion comes back through the callbacks.
    #[wasm_bindgen(method, catch)]
    pub fn print(this: &PrintPipeline, request: &JsValue) -> std::result::Result<(), JsValue>;
}

impl PdfModal {
    pub(crate) fn internal_print(state: &Rc<RefCell<SharedState>>) {
        let claimed = state.borrow_mut().session.begin_print();
        if !claimed {
            return;
        }

        let (printer, url) = {
            let mut s = state.borrow_mut();
            match s.printer.clone() {
                Some(printer) => {
                    if let Some(button) =
                        s.overlay.as_ref().and_then(|o| o.controls.print.as_ref())
                    {
                        Overlay::set_busy(button, true);
                    }
                    (Some(printer), s.options.url.clone())
                }
                None => {
                    s.session.finish_print();
                    (None, String::new())
                }
            }
        };
        let Some(printer) = printer else {
            Self::report_error(
                state,
                &ViewerError::Print("no print pipeline configured".to_string()),
            );
            return;
        };

        let request = js_sys::Object::new();
        let _ = Reflect::set(
            &request,
            &JsValue::from_str("printable"),
            &JsValue::from_str(&url),
        );
        let _ = Reflect::set(
            &request,
            &JsValue::from_str("type"),
            &JsValue::from_str("pdf"),
        );

        let end_state = Rc::downgrade(state);
        let on_loading_end = Closure::once_into_js(move || {
            if let Some(state) = end_state.upgrade() {
                PdfModal::print_settled(&state, None);
            }
        });
        let _ = Reflect::set(&request, &JsValue::from_str("onLoadingEnd"), &on_loading_end);

        let error_state = Rc::downgrade(state);
        let on_error = Closure::once_into_js(move |err: JsValue| {
            if let Some(state) = error_state.upgrade() {
                PdfModal::print_settled(&state, Some(ViewerError::Print(js_error_message(&err))));
            }
        });
        let _ = Reflect::set(&request, &JsValue::from_str("onError"), &on_error);

        if let Err(err) = printer.print(&request.into()) {
            Self::print_settled(state, Some(ViewerError::Print(js_error_message(&err))));
        }
    }

    /// Print pipeline reported back: clear the guard, restore the trigger,
    /// and release a latched close.
    fn print_settled(state: &Rc<RefCell<SharedState>>, error: Option<ViewerError>) {
        {
            let mut s = state.borrow_mut();
            s.session.finish_print();
            if let Some(button) = s.overlay.as_ref().and_then(|o| o.controls.print.as_ref()) {
                Overlay::set_busy(button, false);
            }
        }
        if let Some(err) = error {
            Self::report_error(state, &err);
        }
        Self::resume_pending_close(state);
    }

    pub(crate) fn internal_download(state: &Rc<RefCell<SharedState>>) {
        let claimed = state.borrow_mut().session.begin_download();
        if !claimed {
            return;
        }

        let url = {
            let mut s = state.borrow_mut();
            if let Some(button) = s.overlay.as_ref().and_then(|o| o.controls.download.as_ref()) {
                Overlay::set_busy(button, true);
            }
            s.options.url.clone()
        };

        let state = Rc::clone(state);
        spawn_local(async move {
            let outcome = fetch_and_save(&url).await;
            {
                let mut s = state.borrow_mut();
                s.session.finish_download();
                if let Some(button) = s.overlay.as_ref().and_then(|o| o.controls.download.as_ref())
                {
                    Overlay::set_busy(button, false);
                }
            }
            if let Err(err) = outcome {
                PdfModal::report_error(&state, &err);
            }
            PdfModal::resume_pending_close(&state);
        });
    }
}

/// Fetch the document bytes and trigger a save through a temporary object
/// URL; the URL is revoked before returning.
async fn fetch_and_save(url: &str) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| ViewerError::Dom("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|err| ViewerError::Download(js_error_message(&err)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| ViewerError::Download("fetch returned no response".to_string()))?;
    if !response.ok() {
        return Err(ViewerError::Download(format!("HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(
        response
            .array_buffer()
            .map_err(|err| ViewerError::Download(js_error_message(&err)))?,
    )
    .await
    .map_err(|err| ViewerError::Download(js_error_message(&err)))?;

    save_bytes(&window, &buffer, &download_file_name(url))
}

fn save_bytes(window: &web_sys::Window, buffer: &JsValue, file_name: &str) -> Result<()> {
    let document = window
        .document()
        .ok_or_else(|| ViewerError::Dom("no document".to_string()))?;
    let parts = js_sys::Array::of1(buffer);
    let props = web_sys::BlobPropertyBag::new();
    props.set_type("application/pdf");
    let blob = web_sys::Blob::new_with_buffer_source_sequence_and_options(parts.as_ref(), &props)
        .map_err(|err| ViewerError::Download(js_error_message(&err)))?;
    let object_url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|err| ViewerError::Download(js_error_message(&err)))?;

    let anchor = document
        .create_element("a")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlAnchorElement>().ok())
        .ok_or_else(|| ViewerError::Dom("failed to create anchor".to_string()))?;
    anchor.set_href(&object_url);
    anchor.set_download(file_name);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&object_url);
    Ok(())
}
