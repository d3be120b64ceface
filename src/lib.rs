//! pdfmodal - embeddable modal PDF viewer for the web
//!
//! Mounts a floating, draggable, keyboard-accessible overlay over the host
//! page and coordinates an external rasterization engine through WebAssembly:
//! - open/close lifecycle with focus capture and restoration
//! - page renders serialized and coalesced (at most one in flight plus one
//!   pending request; the view always converges to the latest input)
//! - zoom clamped to 0.5-3.0 in 0.1 steps
//! - amplified content panning and header-drag frame repositioning
//! - cyclic tab order while mounted, print and download affordances
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { PdfModal } from 'pdfmodal';
//! await init();
//! const viewer = new PdfModal(engine, printPipeline);
//! viewer.open({ url: 'report.pdf', title: 'Report' });
//! viewer.close();
//! ```
//!
//! The engine is any object exposing `loadDocument(url)` resolving to
//! `{pageCount, handle}` plus per-page `getPage`/`getViewport`/`renderTo`;
//! the print pipeline is any object exposing a print-js shaped `print()`.

// Pure core (native-testable)
pub mod config;
pub mod error;
pub mod filename;
pub mod session;

// Browser integration
#[cfg(target_arch = "wasm32")]
pub mod engine;
#[cfg(target_arch = "wasm32")]
pub mod overlay;
#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use engine::{DocumentEngine, DocumentHandle, PageHandle, PageViewport};
#[cfg(target_arch = "wasm32")]
pub use viewer::{PdfModal, PrintPipeline};

pub use config::ViewerOptions;
pub use error::{Result, ViewerError};
pub use session::{
    CloseAction, ControlStates, DragGesture, LifecyclePhase, OpenAction, RenderAction, Session,
};

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
