//! Focus containment for `PdfModal`.
//!
//! While the overlay is mounted, Tab cycles within its focusable controls:
//! Tab on the last wraps to the first, Shift+Tab on the first wraps to the
//! last, and everything in between behaves natively. Escape and arrow keys
//! are routed here too since they share the document keydown listener.

use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{KeyboardEvent, Node};

use crate::config::CloseHooks;

use super::{PdfModal, SharedState};

impl PdfModal {
    pub(crate) fn internal_key_down(state: &Rc<RefCell<SharedState>>, event: &KeyboardEvent) {
        match event.key().as_str() {
            "Tab" => {
                if Self::wrap_tab(state, event.shift_key()) {
                    event.prevent_default();
                }
            }
            "Escape" => {
                let close = {
                    let s = state.borrow();
                    s.options.is_closing_on_escape && s.session.is_open()
                };
                if close {
                    Self::close_from(state, CloseHooks::default());
                }
            }
            "ArrowLeft" => Self::internal_previous_page(state),
            "ArrowRight" => Self::internal_next_page(state),
            _ => {}
        }
    }

    /// Wrap focus at the ends of the cached focus loop. Returns true when
    /// the default tab move must be suppressed.
    fn wrap_tab(state: &Rc<RefCell<SharedState>>, backwards: bool) -> bool {
        let (first, last) = {
            let s = state.borrow();
            let Some(overlay) = &s.overlay else {
                return false;
            };
            (
                overlay.first_focusable.clone(),
                overlay.last_focusable.clone(),
            )
        }; // borrow dropped here; focus() below can fire handlers

        let (Some(first), Some(last)) = (first, last) else {
            return false;
        };
        let active = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.active_element());
        let Some(active) = active else {
            return false;
        };
        let active_node: &Node = active.as_ref();

        if backwards {
            let first_node: &Node = first.as_ref();
            if first_node.is_same_node(Some(active_node)) {
                let _ = last.focus();
                return true;
            }
        } else {
            let last_node: &Node = last.as_ref();
            if last_node.is_same_node(Some(active_node)) {
                let _ = first.focus();
                return true;
            }
        }
        false
    }
}
