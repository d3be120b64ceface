//! Render coordination: document load and the single render loop.
//!
//! At most one loop runs at a time: `request_render` only spawns one when
//! the session grants `RenderAction::Start`, and the loop keeps the
//! in-flight claim while draining the pending slot. Everything awaited here
//! is an engine promise; no `RefCell` borrow is held across an await.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;

use crate::config;
use crate::engine;
use crate::session::{LifecyclePhase, RenderAction};

use super::{PdfModal, SharedState};

/// Continuation of `open`: load the document, then render page 1.
pub(crate) async fn load_and_render(state: Rc<RefCell<SharedState>>) {
    let (engine_ref, url) = {
        let s = state.borrow();
        (s.engine.clone(), s.options.url.clone())
    };

    match engine::load(&engine_ref, &url).await {
        Ok(loaded) => {
            let (start, after_open) = {
                let mut s = state.borrow_mut();
                if s.session.phase() != LifecyclePhase::Opening {
                    // A close ran while the engine was loading and the
                    // session is already reset. Release the stray handle.
                    drop(s);
                    loaded.handle.destroy();
                    return;
                }
                s.session.finish_open(loaded.page_count);
                s.document = Some(loaded.handle);
                let start = matches!(s.session.request_render(1), RenderAction::Start);
                (start, s.hooks.after_open.clone())
            };
            config::call_hook(after_open.as_ref(), "onAfterOpen");
            if start {
                run_renders(state, 1).await;
            }
        }
        Err(err) => {
            {
                let mut s = state.borrow_mut();
                if s.session.phase() != LifecyclePhase::Opening {
                    return;
                }
                s.session.open_failed();
                s.loading = false;
                if let Some(overlay) = &s.overlay {
                    overlay.show_error(&err.to_string());
                    overlay.sync_controls(&s.session, &s.options, false);
                }
            }
            PdfModal::report_error(&state, &err);
        }
    }
}

/// Entry point for navigation and zoom: start a render now or coalesce into
/// the pending slot.
pub(crate) fn request_render(state: &Rc<RefCell<SharedState>>, page: u32) {
    let start = {
        let mut s = state.borrow_mut();
        matches!(s.session.request_render(page), RenderAction::Start)
    };
    if start {
        let state = Rc::clone(state);
        spawn_local(async move { run_renders(state, page).await });
    }
}

/// The render loop: rasterize `first_page`, then whatever accumulated in the
/// pending slot, until the slot is empty. Releases a latched close once the
/// loop terminates.
pub(crate) async fn run_renders(state: Rc<RefCell<SharedState>>, first_page: u32) {
    let mut page = first_page;
    loop {
        let job = {
            let s = state.borrow();
            match (&s.document, &s.overlay) {
                (Some(handle), Some(overlay)) => {
                    Some((handle.clone(), overlay.surface.clone(), s.session.scale()))
                }
                _ => None,
            }
        };
        let Some((handle, surface, scale)) = job else {
            // Nothing to draw against; drop the in-flight claim and any
            // pending request.
            let mut s = state.borrow_mut();
            while s.session.finish_render(None).is_some() {}
            break;
        };

        let outcome = engine::render_page(&handle, page, scale, &surface).await;

        let (next, error) = {
            let mut s = state.borrow_mut();
            s.loading = false;
            let next = s.session.finish_render(outcome.is_ok().then_some(page));
            if let Some(overlay) = &s.overlay {
                match &outcome {
                    Ok(()) => overlay.hide_error(),
                    Err(err) => overlay.show_error(&err.to_string()),
                }
                overlay.sync_controls(&s.session, &s.options, false);
            }
            (next, outcome.err())
        };
        if let Some(err) = error {
            PdfModal::report_error(&state, &err);
        }
        match next {
            Some(next_page) => page = next_page,
            None => break,
        }
    }
    PdfModal::resume_pending_close(&state);
}
