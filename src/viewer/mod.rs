//! Main `PdfModal` struct - the wasm-exported viewer controller.
//!
//! This module provides the open/close lifecycle:
//! - mounting the overlay and capturing the previously focused element
//! - parking an `open` that arrives while a close is still animating
//! - the timed exit transition and the exactly-once teardown behind it
//!
//! Rendering, input wiring, focus containment, and print/download live in
//! the sibling modules; all of them share one `Rc<RefCell<SharedState>>`.

mod events;
mod export;
mod focus;
mod render;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::config::{self, CloseHooks, ViewerHooks, ViewerOptions};
use crate::engine::{DocumentEngine, DocumentHandle};
use crate::error::ViewerError;
use crate::overlay::{Overlay, CLOSE_TRANSITION_MS};
use crate::session::{CloseAction, LifecyclePhase, OpenAction, Session};

pub use export::PrintPipeline;

use events::Wiring;

/// State shared between the exported controller and its event closures.
pub(crate) struct SharedState {
    pub(crate) session: Session,
    pub(crate) engine: DocumentEngine,
    pub(crate) printer: Option<PrintPipeline>,
    pub(crate) options: ViewerOptions,
    pub(crate) hooks: ViewerHooks,
    /// Engine-side handle; owned exclusively, destroyed exactly once at close.
    pub(crate) document: Option<DocumentHandle>,
    pub(crate) overlay: Option<Overlay>,
    pub(crate) wiring: Option<Wiring>,
    /// Element focused before `open`; restored once at close, never owned.
    pub(crate) prior_focus: Option<HtmlElement>,
    /// Config of an `open` that arrived while closing; replayed afterwards.
    pub(crate) pending_open: Option<JsValue>,
    /// Per-call close hooks; take precedence over the config hooks.
    pub(crate) close_hooks: Option<CloseHooks>,
    pub(crate) close_timer: Option<i32>,
    pub(crate) close_closure: Option<Closure<dyn FnMut()>>,
    /// Page indicator shows the loading caption while true.
    pub(crate) loading: bool,
}

/// The viewer controller exported to JavaScript.
///
/// One instance per host; the host owns its lifetime and calls
/// `open`/`close` imperatively. The overlay subtree the instance mounts is
/// exclusively its own.
#[wasm_bindgen]
pub struct PdfModal {
    state: Rc<RefCell<SharedState>>,
}

#[wasm_bindgen]
impl PdfModal {
    /// Create a controller bound to a rasterization engine and, optionally,
    /// a print pipeline. Nothing is mounted until `open`.
    #[wasm_bindgen(constructor)]
    pub fn new(engine: DocumentEngine, printer: Option<PrintPipeline>) -> PdfModal {
        console_error_panic_hook::set_once();

        PdfModal {
            state: Rc::new(RefCell::new(SharedState {
                session: Session::new(),
                engine,
                printer,
                options: ViewerOptions::default(),
                hooks: ViewerHooks::default(),
                document: None,
                overlay: None,
                wiring: None,
                prior_focus: None,
                pending_open: None,
                close_hooks: None,
                close_timer: None,
                close_closure: None,
                loading: false,
            })),
        }
    }

    /// Open the viewer for the configured document URL.
    ///
    /// No-op while already opening or open. While a previous close is still
    /// animating, the config is parked and the open completes only after
    /// that close fully finishes.
    pub fn open(&self, config: JsValue) -> Result<(), JsValue> {
        Self::open_from(&self.state, config)
    }

    /// Close the viewer, optionally with one-shot `onBeforeClose` /
    /// `onAfterClose` hooks for this call.
    ///
    /// No-op while already closed or closing. While a render, print, or
    /// download is in flight the request is latched and honored once the
    /// work quiesces; it never preempts in-flight work.
    pub fn close(&self, hooks: JsValue) {
        Self::close_from(&self.state, CloseHooks::from_js(&hooks));
    }

    /// True from the moment the overlay mounts until a close completes.
    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.state.borrow().session.is_open()
    }

    /// Complement of `isOpen`.
    #[wasm_bindgen(js_name = isClosed)]
    pub fn is_closed(&self) -> bool {
        self.state.borrow().session.is_closed()
    }
}

impl PdfModal {
    pub(crate) fn open_from(
        state: &Rc<RefCell<SharedState>>,
        config: JsValue,
    ) -> Result<(), JsValue> {
        // Claim the phase before any DOM work: focus and hook callbacks can
        // re-enter `open`, and a second mount must be impossible.
        {
            let mut s = state.borrow_mut();
            match s.session.request_open() {
                OpenAction::Ignored => return Ok(()),
                OpenAction::Parked => {
                    s.pending_open = Some(config);
                    return Ok(());
                }
                OpenAction::Proceed => {}
            }
        }

        if let Err(err) = Self::mount_and_load(state, &config) {
            // Roll back to Closed so a later open can retry.
            let mut s = state.borrow_mut();
            s.session.finish_close();
            s.overlay = None;
            s.wiring = None;
            return Err(err);
        }
        Ok(())
    }

    fn mount_and_load(state: &Rc<RefCell<SharedState>>, config: &JsValue) -> Result<(), JsValue> {
        let options = ViewerOptions::from_js(config)?;
        options.validate()?;
        let hooks = ViewerHooks::from_js(config);

        let window =
            web_sys::window().ok_or_else(|| ViewerError::Dom("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| ViewerError::Dom("no document".to_string()))?;

        config::call_hook(hooks.before_open.as_ref(), "onBeforeOpen");

        let prior_focus = document
            .active_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let mut overlay = Overlay::build(&document, &options)?;
        overlay.mount(&document)?;
        let _ = overlay.frame.focus();

        let wiring = events::wire(state, &overlay, &options);

        {
            let mut s = state.borrow_mut();
            s.options = options;
            s.hooks = hooks;
            s.prior_focus = prior_focus;
            s.loading = true;
            overlay.sync_controls(&s.session, &s.options, true);
            s.overlay = Some(overlay);
            s.wiring = Some(wiring);
        }

        wasm_bindgen_futures::spawn_local(render::load_and_render(Rc::clone(state)));
        Ok(())
    }

    pub(crate) fn close_from(state: &Rc<RefCell<SharedState>>, hooks: CloseHooks) {
        let action = {
            let mut s = state.borrow_mut();
            let action = s.session.request_close();
            if action != CloseAction::Ignored {
                s.close_hooks = Some(hooks);
            }
            action
        };
        if action == CloseAction::Proceed {
            Self::begin_close_transition(state);
        }
    }

    /// Release a latched close once in-flight work has drained.
    pub(crate) fn resume_pending_close(state: &Rc<RefCell<SharedState>>) {
        let proceed = state.borrow_mut().session.take_pending_close();
        if proceed {
            Self::begin_close_transition(state);
        }
    }

    pub(crate) fn begin_close_transition(state: &Rc<RefCell<SharedState>>) {
        let before = {
            let s = state.borrow();
            s.close_hooks
                .as_ref()
                .and_then(|h| h.before_close.clone())
                .or_else(|| s.hooks.before_close.clone())
        };
        config::call_hook(before.as_ref(), "onBeforeClose");

        {
            let s = state.borrow();
            if let Some(overlay) = &s.overlay {
                overlay.begin_exit();
            }
        }
        Self::schedule_close_timer(state);
    }

    fn schedule_close_timer(state: &Rc<RefCell<SharedState>>) {
        let Some(window) = web_sys::window() else {
            Self::finish_close(state);
            return;
        };
        let mut s = state.borrow_mut();
        if let Some(timer) = s.close_timer.take() {
            window.clear_timeout_with_handle(timer);
        }
        if s.close_closure.is_none() {
            let weak = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    PdfModal::finish_close(&state);
                }
            }) as Box<dyn FnMut()>);
            s.close_closure = Some(closure);
        }
        let Some(callback) = s.close_closure.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            CLOSE_TRANSITION_MS,
        ) {
            Ok(id) => s.close_timer = Some(id),
            Err(_) => {
                drop(s);
                Self::finish_close(state);
            }
        }
    }

    /// Exit transition done: tear everything down, exactly once.
    pub(crate) fn finish_close(state: &Rc<RefCell<SharedState>>) {
        let (overlay, wiring, document_handle, prior_focus, after, pending_open) = {
            let mut s = state.borrow_mut();
            if s.session.phase() != LifecyclePhase::Closing {
                return;
            }
            s.close_timer = None;
            let overlay = s.overlay.take();
            let wiring = s.wiring.take();
            let document_handle = s.document.take();
            let prior_focus = s.prior_focus.take();
            let after = s
                .close_hooks
                .take()
                .and_then(|h| h.after_close)
                .or_else(|| s.hooks.after_close.clone());
            let pending_open = s.pending_open.take();
            s.loading = false;
            s.session.finish_close();
            (overlay, wiring, document_handle, prior_focus, after, pending_open)
        }; // borrow dropped here; teardown and hooks below may re-enter

        drop(wiring);
        if let Some(overlay) = overlay {
            overlay.unmount();
        }
        if let Some(handle) = document_handle {
            handle.destroy();
        }
        if let Some(element) = prior_focus {
            if element.is_connected() {
                let _ = element.focus();
            }
        }
        config::call_hook(after.as_ref(), "onAfterClose");

        if let Some(parked) = pending_open {
            if let Err(err) = Self::open_from(state, parked) {
                web_sys::console::error_1(&err);
            }
        }
    }

    /// Surface a non-fatal error: console plus the `onError` hook.
    pub(crate) fn report_error(state: &Rc<RefCell<SharedState>>, error: &ViewerError) {
        let hook = { state.borrow().hooks.on_error.clone() };
        let message = JsValue::from_str(&error.to_string());
        web_sys::console::error_1(&message);
        config::call_hook_with(hook.as_ref(), "onError", &message);
    }
}
