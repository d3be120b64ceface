//! Pointer and control wiring for `PdfModal`.
//!
//! Handlers translate DOM events into pure session calls and apply the
//! returned values; none of them mutates the overlay directly beyond the
//! declarative sync. Every listener is registered through a [`Handler`] that
//! removes itself on drop, so unmounting the overlay detaches everything.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, HtmlButtonElement, KeyboardEvent, MouseEvent, Node};

use crate::config::{CloseHooks, ViewerOptions};
use crate::overlay::Overlay;

use super::{render, PdfModal, SharedState};

enum HandlerClosure {
    Mouse(Closure<dyn FnMut(MouseEvent)>),
    Keyboard(Closure<dyn FnMut(KeyboardEvent)>),
}

/// One registered listener; deregisters itself on drop.
struct Handler {
    target: EventTarget,
    event: &'static str,
    callback: Function,
    _closure: HandlerClosure,
}

impl Drop for Handler {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, &self.callback);
    }
}

/// All listeners for one mounted overlay. Dropped at close completion.
pub(crate) struct Wiring {
    #[allow(dead_code)] // Held for Drop; dropping detaches every listener.
    handlers: Vec<Handler>,
}

impl Wiring {
    fn on_mouse(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(MouseEvent)>,
    ) {
        let callback = closure.as_ref().unchecked_ref::<Function>().clone();
        let _ = target.add_event_listener_with_callback(event, &callback);
        self.handlers.push(Handler {
            target: target.clone(),
            event,
            callback,
            _closure: HandlerClosure::Mouse(closure),
        });
    }

    fn on_keyboard(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(KeyboardEvent)>,
    ) {
        let callback = closure.as_ref().unchecked_ref::<Function>().clone();
        let _ = target.add_event_listener_with_callback(event, &callback);
        self.handlers.push(Handler {
            target: target.clone(),
            event,
            callback,
            _closure: HandlerClosure::Keyboard(closure),
        });
    }
}

fn wire_button(
    wiring: &mut Wiring,
    button: &HtmlButtonElement,
    state: &Rc<RefCell<SharedState>>,
    action: fn(&Rc<RefCell<SharedState>>),
) {
    let state = Rc::clone(state);
    let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
        action(&state);
    }) as Box<dyn FnMut(MouseEvent)>);
    wiring.on_mouse(button.as_ref(), "click", closure);
}

/// Attach every listener for a freshly mounted overlay.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn wire(
    state: &Rc<RefCell<SharedState>>,
    overlay: &Overlay,
    options: &ViewerOptions,
) -> Wiring {
    let mut wiring = Wiring {
        handlers: Vec::new(),
    };

    wire_button(&mut wiring, &overlay.controls.previous, state, |s| {
        PdfModal::internal_previous_page(s);
    });
    wire_button(&mut wiring, &overlay.controls.next, state, |s| {
        PdfModal::internal_next_page(s);
    });
    wire_button(&mut wiring, &overlay.controls.zoom_out, state, |s| {
        PdfModal::internal_zoom(s, false);
    });
    wire_button(&mut wiring, &overlay.controls.zoom_in, state, |s| {
        PdfModal::internal_zoom(s, true);
    });
    if let Some(print) = &overlay.controls.print {
        wire_button(&mut wiring, print, state, |s| {
            PdfModal::internal_print(s);
        });
    }
    if let Some(download) = &overlay.controls.download {
        wire_button(&mut wiring, download, state, |s| {
            PdfModal::internal_download(s);
        });
    }
    wire_button(&mut wiring, &overlay.controls.close, state, |s| {
        PdfModal::close_from(s, CloseHooks::default());
    });

    // Backdrop click: close only when the click lands exactly on the
    // backdrop, not inside the frame.
    if options.is_closing_on_click_outside {
        let state_ref = Rc::clone(state);
        let backdrop = overlay.backdrop.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let Some(target) = event.target() else {
                return;
            };
            let Some(node) = target.dyn_ref::<Node>() else {
                return;
            };
            let backdrop_node: &Node = backdrop.as_ref();
            if backdrop_node.is_same_node(Some(node)) {
                PdfModal::close_from(&state_ref, CloseHooks::default());
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        wiring.on_mouse(overlay.backdrop.as_ref(), "click", closure);
    }

    // Frame repositioning: header drag, only when configured moveable.
    // Presses on the header controls never start a drag.
    if options.is_moveable {
        let state_ref = Rc::clone(state);
        let frame = overlay.frame.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let over_control = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.closest("button").ok().flatten())
                .is_some();
            if over_control {
                return;
            }
            let rect = frame.get_bounding_client_rect();
            let x = event.client_x() as f32;
            let y = event.client_y() as f32;
            {
                let mut s = state_ref.borrow_mut();
                s.session
                    .start_frame_drag((x - rect.left() as f32, y - rect.top() as f32));
            }
            // Switch from the centering transform to explicit coordinates so
            // the drag positions the frame absolutely.
            let style = frame.style();
            let _ = style.set_property("transform", "none");
            let _ = style.set_property("left", &format!("{}px", rect.left()));
            let _ = style.set_property("top", &format!("{}px", rect.top()));
            event.prevent_default();
        }) as Box<dyn FnMut(MouseEvent)>);
        wiring.on_mouse(overlay.header.as_ref(), "mousedown", closure);
    }

    // Content panning: amplified scroll drag inside the body viewport.
    {
        let state_ref = Rc::clone(state);
        let body = overlay.body.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let scroll = (body.scroll_left() as f32, body.scroll_top() as f32);
            {
                let mut s = state_ref.borrow_mut();
                s.session
                    .start_pan((event.client_x() as f32, event.client_y() as f32), scroll);
            }
            let _ = body.style().set_property("cursor", "grabbing");
            event.prevent_default();
        }) as Box<dyn FnMut(MouseEvent)>);
        wiring.on_mouse(overlay.body.as_ref(), "mousedown", closure);
    }

    // Pointer leaving the content viewport terminates a pan (a frame drag
    // crossing it keeps going).
    {
        let state_ref = Rc::clone(state);
        let body = overlay.body.clone();
        let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
            state_ref.borrow_mut().session.end_pan();
            let _ = body.style().set_property("cursor", "grab");
        }) as Box<dyn FnMut(MouseEvent)>);
        wiring.on_mouse(overlay.body.as_ref(), "mouseleave", closure);
    }

    let document_target: Option<EventTarget> = web_sys::window()
        .and_then(|w| w.document())
        .map(|d| d.into());

    if let Some(document_target) = &document_target {
        // Drag moves are tracked on the document so fast pointers cannot
        // escape the gesture.
        let state_ref = Rc::clone(state);
        let body = overlay.body.clone();
        let frame = overlay.frame.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let pointer = (event.client_x() as f32, event.client_y() as f32);
            let (pan, frame_pos) = {
                let s = state_ref.borrow();
                (
                    s.session.pan_position(pointer),
                    s.session.frame_position(pointer),
                )
            };
            if let Some((scroll_x, scroll_y)) = pan {
                body.set_scroll_left(scroll_x as i32);
                body.set_scroll_top(scroll_y as i32);
            }
            if let Some((left, top)) = frame_pos {
                let style = frame.style();
                let _ = style.set_property("left", &format!("{left}px"));
                let _ = style.set_property("top", &format!("{top}px"));
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        wiring.on_mouse(document_target, "mousemove", closure);

        let state_ref = Rc::clone(state);
        let body = overlay.body.clone();
        let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
            state_ref.borrow_mut().session.end_drag();
            let _ = body.style().set_property("cursor", "grab");
        }) as Box<dyn FnMut(MouseEvent)>);
        wiring.on_mouse(document_target, "mouseup", closure);

        let state_ref = Rc::clone(state);
        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            PdfModal::internal_key_down(&state_ref, &event);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        wiring.on_keyboard(document_target, "keydown", closure);
    }

    wiring
}

impl PdfModal {
    pub(crate) fn internal_previous_page(state: &Rc<RefCell<SharedState>>) {
        let target = state.borrow().session.previous_page();
        if let Some(page) = target {
            render::request_render(state, page);
        }
    }

    pub(crate) fn internal_next_page(state: &Rc<RefCell<SharedState>>) {
        let target = state.borrow().session.next_page();
        if let Some(page) = target {
            render::request_render(state, page);
        }
    }

    /// Step the zoom and re-render the current page at the new scale.
    pub(crate) fn internal_zoom(state: &Rc<RefCell<SharedState>>, zoom_in: bool) {
        let target = {
            let mut s = state.borrow_mut();
            let changed = if zoom_in {
                s.session.zoom_in()
            } else {
                s.session.zoom_out()
            };
            if changed.is_some() {
                if let Some(overlay) = &s.overlay {
                    overlay.sync_controls(&s.session, &s.options, s.loading);
                }
                Some(s.session.current_page())
            } else {
                None
            }
        };
        if let Some(page) = target {
            render::request_render(state, page);
        }
    }
}
