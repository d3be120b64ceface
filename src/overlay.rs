//! The modal overlay's DOM subtree.
//!
//! Builds the backdrop/frame/header/body structure, mounts and unmounts it,
//! and re-syncs every affordance (disabled flags, page indicator, zoom
//! readout, busy captions) from a session snapshot. Handlers never mutate
//! the DOM directly; they update the session and call [`Overlay::sync_controls`].
//!
//! The subtree is exclusively owned by the controller; hosts restyle it via
//! the `style*` options or CSS targeting the `data-pdfmodal` attributes.

use wasm_bindgen::JsCast;
use web_sys::{
    Document, HtmlButtonElement, HtmlCanvasElement, HtmlDivElement, HtmlElement, NodeList,
};

use crate::config::ViewerOptions;
use crate::error::{Result, ViewerError};
use crate::session::Session;

/// Duration of the exit transition; the close timer matches the CSS fade.
pub(crate) const CLOSE_TRANSITION_MS: i32 = 200;

/// Elements participating in the cyclic tab order, in DOM order.
const FOCUSABLE_SELECTOR: &str =
    "button, [href], input, select, textarea, [tabindex]:not([tabindex=\"-1\"])";

const BACKDROP_STYLE: &str = "position: fixed; inset: 0; z-index: 2147483000; \
     background: rgba(15, 18, 22, 0.55); opacity: 1; transition: opacity 200ms ease;";
const FRAME_STYLE: &str = "position: fixed; left: 50%; top: 50%; \
     transform: translate(-50%, -50%); display: flex; flex-direction: column; \
     width: min(860px, 92vw); height: min(92vh, 1100px); background: #ffffff; \
     border-radius: 6px; box-shadow: 0 12px 48px rgba(0, 0, 0, 0.35); overflow: hidden;";
const HEADER_STYLE: &str = "display: flex; align-items: center; gap: 12px; \
     padding: 10px 14px; background: #f4f5f7; border-bottom: 1px solid #e0e2e6; \
     font: 14px/1.4 system-ui, sans-serif; user-select: none; flex-shrink: 0;";
const CONTROLS_STYLE: &str = "display: flex; align-items: center; gap: 4px; margin-left: auto;";
const BUTTON_STYLE: &str = "min-width: 28px; padding: 4px 8px; border: 1px solid #c9ccd2; \
     border-radius: 4px; background: #ffffff; cursor: pointer; \
     font: 13px/1.2 system-ui, sans-serif;";
const BODY_STYLE: &str =
    "flex: 1; overflow: auto; position: relative; background: #8a8f98; cursor: grab;";
const SURFACE_STYLE: &str = "display: block; margin: 16px auto; background: #ffffff; \
     box-shadow: 0 2px 12px rgba(0, 0, 0, 0.4);";
const ERROR_STYLE: &str = "display: none; position: absolute; left: 50%; top: 40%; \
     transform: translate(-50%, -50%); max-width: 80%; padding: 12px 18px; \
     background: #fdf2f2; color: #8a1f1f; border: 1px solid #e3b8b8; border-radius: 4px; \
     font: 13px/1.5 system-ui, sans-serif;";

/// The interactive controls in the header.
pub(crate) struct Controls {
    pub previous: HtmlButtonElement,
    pub next: HtmlButtonElement,
    pub zoom_out: HtmlButtonElement,
    pub zoom_in: HtmlButtonElement,
    /// Absent when `isPrintingOnClick` is off.
    pub print: Option<HtmlButtonElement>,
    /// Absent when `isDownloadingOnClick` is off.
    pub download: Option<HtmlButtonElement>,
    pub close: HtmlButtonElement,
}

/// The mounted overlay subtree. Lives from open to close completion.
pub(crate) struct Overlay {
    pub backdrop: HtmlDivElement,
    pub frame: HtmlDivElement,
    pub header: HtmlDivElement,
    pub page_label: HtmlElement,
    pub zoom_label: HtmlElement,
    pub controls: Controls,
    pub body: HtmlDivElement,
    pub surface: HtmlCanvasElement,
    pub error_box: HtmlDivElement,
    /// First/last focusable descendants, cached at mount for tab wrapping.
    pub first_focusable: Option<HtmlElement>,
    pub last_focusable: Option<HtmlElement>,
}

fn create_div(document: &Document) -> Result<HtmlDivElement> {
    document
        .create_element("div")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlDivElement>().ok())
        .ok_or_else(|| ViewerError::Dom("failed to create div".to_string()))
}

fn create_span(document: &Document) -> Result<HtmlElement> {
    document
        .create_element("span")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| ViewerError::Dom("failed to create span".to_string()))
}

fn create_button(document: &Document, action: &str, label: &str, text: &str) -> Result<HtmlButtonElement> {
    let button = document
        .create_element("button")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        .ok_or_else(|| ViewerError::Dom("failed to create button".to_string()))?;
    let _ = button.set_attribute("type", "button");
    let _ = button.set_attribute("data-pdfmodal", action);
    let _ = button.set_attribute("aria-label", label);
    button.set_text_content(Some(text));
    button.style().set_css_text(BUTTON_STYLE);
    Ok(button)
}

fn apply_region_style(element: &HtmlElement, base: &str, extra: Option<&str>) {
    let mut css = base.to_string();
    if let Some(extra) = extra {
        css.push(' ');
        css.push_str(extra);
    }
    element.style().set_css_text(&css);
}

impl Overlay {
    /// Build the full subtree (detached). `mount` attaches it to the body.
    pub fn build(document: &Document, options: &ViewerOptions) -> Result<Self> {
        let backdrop = create_div(document)?;
        let _ = backdrop.set_attribute("data-pdfmodal", "backdrop");
        apply_region_style(&backdrop, BACKDROP_STYLE, options.style_backdrop.as_deref());

        let frame = create_div(document)?;
        let _ = frame.set_attribute("data-pdfmodal", "frame");
        let _ = frame.set_attribute("role", "dialog");
        let _ = frame.set_attribute("aria-modal", "true");
        let _ = frame.set_attribute("aria-label", &options.title);
        // Focusable programmatically but skipped by the tab order.
        let _ = frame.set_attribute("tabindex", "-1");
        apply_region_style(&frame, FRAME_STYLE, options.style_frame.as_deref());

        let header = create_div(document)?;
        let _ = header.set_attribute("data-pdfmodal", "header");
        apply_region_style(&header, HEADER_STYLE, options.style_header.as_deref());
        if options.is_moveable {
            let _ = header.style().set_property("cursor", "move");
        }

        let title = create_span(document)?;
        let _ = title.set_attribute("data-pdfmodal", "title");
        let _ = title.style().set_property("font-weight", "600");
        title.set_text_content(Some(&options.title));

        let page_label = create_span(document)?;
        let _ = page_label.set_attribute("data-pdfmodal", "page-indicator");
        let _ = page_label.set_attribute("aria-live", "polite");
        let _ = page_label.style().set_property("color", "#5a5f66");

        let zoom_label = create_span(document)?;
        let _ = zoom_label.set_attribute("data-pdfmodal", "zoom-indicator");
        let _ = zoom_label.style().set_property("color", "#5a5f66");

        let controls_bar = create_div(document)?;
        let _ = controls_bar.set_attribute("data-pdfmodal", "controls");
        apply_region_style(&controls_bar, CONTROLS_STYLE, options.style_controls.as_deref());

        let previous = create_button(document, "previous", "Previous page", "\u{2039}")?;
        let next = create_button(document, "next", "Next page", "\u{203a}")?;
        let zoom_out = create_button(document, "zoom-out", "Zoom out", "\u{2212}")?;
        let zoom_in = create_button(document, "zoom-in", "Zoom in", "+")?;
        let print = if options.is_printing_on_click {
            Some(create_button(document, "print", "Print document", "Print")?)
        } else {
            None
        };
        let download = if options.is_downloading_on_click {
            Some(create_button(document, "download", "Download document", "Download")?)
        } else {
            None
        };
        let close = create_button(document, "close", "Close viewer", "\u{00d7}")?;

        let body = create_div(document)?;
        let _ = body.set_attribute("data-pdfmodal", "body");
        apply_region_style(&body, BODY_STYLE, options.style_body.as_deref());

        let surface = document
            .create_element("canvas")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| ViewerError::Dom("failed to create canvas".to_string()))?;
        let _ = surface.set_attribute("data-pdfmodal", "surface");
        surface.style().set_css_text(SURFACE_STYLE);

        let error_box = create_div(document)?;
        let _ = error_box.set_attribute("data-pdfmodal", "error");
        let _ = error_box.set_attribute("role", "alert");
        error_box.style().set_css_text(ERROR_STYLE);

        let _ = controls_bar.append_child(&previous);
        let _ = controls_bar.append_child(&next);
        let _ = controls_bar.append_child(&zoom_out);
        let _ = controls_bar.append_child(&zoom_in);
        if let Some(print) = &print {
            let _ = controls_bar.append_child(print);
        }
        if let Some(download) = &download {
            let _ = controls_bar.append_child(download);
        }
        let _ = controls_bar.append_child(&close);

        let _ = header.append_child(&title);
        let _ = header.append_child(&page_label);
        let _ = header.append_child(&zoom_label);
        let _ = header.append_child(&controls_bar);

        let _ = body.append_child(&surface);
        let _ = body.append_child(&error_box);

        let _ = frame.append_child(&header);
        let _ = frame.append_child(&body);
        let _ = backdrop.append_child(&frame);

        Ok(Self {
            backdrop,
            frame,
            header,
            page_label,
            zoom_label,
            controls: Controls {
                previous,
                next,
                zoom_out,
                zoom_in,
                print,
                download,
                close,
            },
            body,
            surface,
            error_box,
            first_focusable: None,
            last_focusable: None,
        })
    }

    /// Attach the subtree to `document.body` and cache the focus loop ends.
    pub fn mount(&mut self, document: &Document) -> Result<()> {
        let body = document
            .body()
            .ok_or_else(|| ViewerError::Dom("document has no body".to_string()))?;
        body.append_child(&self.backdrop)
            .map_err(|_| ViewerError::Dom("failed to mount overlay".to_string()))?;
        self.cache_focusables();
        Ok(())
    }

    /// Detach the subtree. Listener closures are dropped by the caller.
    pub fn unmount(&self) {
        self.backdrop.remove();
    }

    /// Start the exit fade; the close timer fires after [`CLOSE_TRANSITION_MS`].
    pub fn begin_exit(&self) {
        let _ = self.backdrop.style().set_property("opacity", "0");
    }

    fn cache_focusables(&mut self) {
        let list: Option<NodeList> = self.frame.query_selector_all(FOCUSABLE_SELECTOR).ok();
        let Some(list) = list else {
            return;
        };
        let mut first = None;
        let mut last = None;
        for index in 0..list.length() {
            let Some(element) = list.get(index).and_then(|n| n.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            if first.is_none() {
                first = Some(element.clone());
            }
            last = Some(element);
        }
        self.first_focusable = first;
        self.last_focusable = last;
    }

    /// Re-derive every affordance from the session. `loading` swaps the page
    /// indicator for the configured loading caption.
    #[allow(clippy::cast_possible_truncation)]
    pub fn sync_controls(&self, session: &Session, options: &ViewerOptions, loading: bool) {
        let states = session.controls();
        set_enabled(&self.controls.previous, states.previous);
        set_enabled(&self.controls.next, states.next);
        set_enabled(&self.controls.zoom_out, states.zoom_out);
        set_enabled(&self.controls.zoom_in, states.zoom_in);

        let indicator = if loading {
            options.title_loading.clone()
        } else if session.page_count() == 0 {
            String::new()
        } else {
            options.page_indicator(session.current_page(), session.page_count())
        };
        self.page_label.set_text_content(Some(&indicator));

        let percent = (f64::from(session.scale()) * 100.0).round() as i64;
        self.zoom_label.set_text_content(Some(&format!("{percent}%")));
    }

    /// Swap a trigger to its transient busy caption, or restore it.
    pub fn set_busy(button: &HtmlButtonElement, busy: bool) {
        if busy {
            let original = button.text_content().unwrap_or_default();
            let _ = button.set_attribute("data-restore-label", &original);
            let _ = button.set_attribute("disabled", "");
            button.set_text_content(Some("\u{2026}"));
        } else {
            if let Some(original) = button.get_attribute("data-restore-label") {
                button.set_text_content(Some(&original));
            }
            let _ = button.remove_attribute("data-restore-label");
            let _ = button.remove_attribute("disabled");
        }
    }

    /// Show the inline error message in the body.
    pub fn show_error(&self, message: &str) {
        self.error_box.set_text_content(Some(message));
        let _ = self.error_box.style().set_property("display", "block");
    }

    pub fn hide_error(&self) {
        let _ = self.error_box.style().set_property("display", "none");
    }
}

fn set_enabled(button: &HtmlButtonElement, enabled: bool) {
    if enabled {
        let _ = button.remove_attribute("disabled");
    } else {
        let _ = button.set_attribute("disabled", "");
    }
}
