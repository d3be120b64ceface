//! Viewer session state: lifecycle phases, render coalescing, zoom and
//! navigation clamps, busy guards, and drag gestures.
//!
//! Everything here is plain synchronous state with no DOM or JS dependencies.
//! The wasm layer translates events into these calls and applies the returned
//! values to the document; tests drive the same functions natively.

/// Minimum zoom scale.
pub const ZOOM_MIN: f32 = 0.5;
/// Maximum zoom scale.
pub const ZOOM_MAX: f32 = 3.0;
/// Zoom increment per step.
pub const ZOOM_STEP: f32 = 0.1;
/// Amplification applied to pointer deltas while panning the content area.
pub const PAN_SPEED: f32 = 2.0;

/// Where the controller is in its open/close cycle.
///
/// `Opening` and `Closing` are transient: they are entered by `open`/`close`
/// and exited by their own continuation (load completion, exit transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// An active pointer drag. Exists only for the duration of a gesture.
///
/// Pan and frame drags start from disjoint regions (content body vs header),
/// and the single slot makes the exclusivity structural.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragGesture {
    /// Content panning: pointer origin and the scroll offsets at gesture start.
    Pan {
        pointer: (f32, f32),
        scroll: (f32, f32),
    },
    /// Frame repositioning: offset from the pointer to the frame's top-left.
    Frame { offset: (f32, f32) },
}

/// Outcome of an `open` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAction {
    /// Proceed with mounting; the phase is now `Opening`.
    Proceed,
    /// Already opening or open; the request has no effect.
    Ignored,
    /// A close is still in progress; park the request and replay it after.
    Parked,
}

/// Outcome of a `close` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// Proceed with the exit transition; the phase is now `Closing`.
    Proceed,
    /// Work is in flight; the request is latched and honored at quiesce.
    Latched,
    /// Already closed or closing; the request has no effect.
    Ignored,
}

/// Outcome of a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderAction {
    /// No render was in flight; the caller starts this one now.
    Start,
    /// A render is in flight; the request replaced the pending slot.
    Coalesced,
}

/// Enabled/disabled state of the navigation and zoom affordances, derived
/// from the current position against the page and scale clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlStates {
    pub previous: bool,
    pub next: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
}

/// One viewer session. Created at construction, reused across opens; every
/// successful close resets it to defaults.
#[derive(Debug, Clone)]
pub struct Session {
    phase: LifecyclePhase,
    current_page: u32,
    page_count: u32,
    scale: f32,
    render_in_flight: bool,
    pending_page: Option<u32>,
    printing: bool,
    downloading: bool,
    close_pending: bool,
    drag: Option<DragGesture>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Round a stepped scale to one decimal so repeated ±0.1 steps land exactly
/// on the clamp boundaries instead of drifting by float error.
fn round_to_step(scale: f32) -> f32 {
    (scale * 10.0).round() / 10.0
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: LifecyclePhase::Closed,
            current_page: 1,
            page_count: 0,
            scale: 1.0,
            render_in_flight: false,
            pending_page: None,
            printing: false,
            downloading: false,
            close_pending: false,
            drag: None,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// True from the moment the overlay mounts until the close completes.
    pub fn is_open(&self) -> bool {
        self.phase != LifecyclePhase::Closed
    }

    pub fn is_closed(&self) -> bool {
        self.phase == LifecyclePhase::Closed
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn render_in_flight(&self) -> bool {
        self.render_in_flight
    }

    pub fn is_printing(&self) -> bool {
        self.printing
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn drag(&self) -> Option<DragGesture> {
        self.drag
    }

    /// Affordance state derived from position against the clamps. Empty
    /// (all disabled) until a document is loaded.
    pub fn controls(&self) -> ControlStates {
        if self.page_count == 0 {
            return ControlStates::default();
        }
        ControlStates {
            previous: self.current_page > 1,
            next: self.current_page < self.page_count,
            zoom_in: self.scale < ZOOM_MAX,
            zoom_out: self.scale > ZOOM_MIN,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Request an open. Only `OpenAction::Proceed` changes state.
    pub fn request_open(&mut self) -> OpenAction {
        match self.phase {
            LifecyclePhase::Opening | LifecyclePhase::Open => OpenAction::Ignored,
            LifecyclePhase::Closing => OpenAction::Parked,
            LifecyclePhase::Closed => {
                self.phase = LifecyclePhase::Opening;
                OpenAction::Proceed
            }
        }
    }

    /// Document load succeeded: record the page count and enter `Open`.
    pub fn finish_open(&mut self, page_count: u32) {
        self.page_count = page_count;
        self.current_page = 1;
        self.phase = LifecyclePhase::Open;
    }

    /// Document load failed. The overlay stays mounted with an inline error
    /// and no page rendered, so the phase still advances to `Open`.
    pub fn open_failed(&mut self) {
        self.page_count = 0;
        self.current_page = 1;
        self.phase = LifecyclePhase::Open;
    }

    /// Request a close. While a render, print, or download is in flight the
    /// request is latched rather than honored; `take_pending_close` releases
    /// it once the system quiesces.
    pub fn request_close(&mut self) -> CloseAction {
        match self.phase {
            LifecyclePhase::Closed | LifecyclePhase::Closing => CloseAction::Ignored,
            LifecyclePhase::Opening | LifecyclePhase::Open => {
                if self.render_in_flight || self.printing || self.downloading {
                    self.close_pending = true;
                    CloseAction::Latched
                } else {
                    self.close_pending = false;
                    self.phase = LifecyclePhase::Closing;
                    CloseAction::Proceed
                }
            }
        }
    }

    /// Release a latched close once nothing is in flight. Returns true at
    /// most once per latch; the phase is `Closing` afterwards.
    pub fn take_pending_close(&mut self) -> bool {
        if !self.close_pending
            || self.render_in_flight
            || self.printing
            || self.downloading
            || !matches!(self.phase, LifecyclePhase::Opening | LifecyclePhase::Open)
        {
            return false;
        }
        self.close_pending = false;
        self.phase = LifecyclePhase::Closing;
        true
    }

    /// The exit transition finished: reset every field to defaults.
    pub fn finish_close(&mut self) {
        *self = Self::new();
    }

    // ------------------------------------------------------------------
    // Render coalescing
    // ------------------------------------------------------------------

    /// The coalescing policy: start immediately when idle, otherwise
    /// overwrite the single pending slot (last-writer-wins; intermediate
    /// pages requested during a render are never rendered).
    pub fn request_render(&mut self, page: u32) -> RenderAction {
        if self.render_in_flight {
            self.pending_page = Some(page);
            RenderAction::Coalesced
        } else {
            self.render_in_flight = true;
            RenderAction::Start
        }
    }

    /// A render finished. `completed` carries the page number on success and
    /// is `None` on failure (the page indicator then keeps its last value).
    ///
    /// If the pending slot is occupied, it is taken atomically and returned;
    /// the in-flight flag stays set so no competing render can start in
    /// between, and the caller begins the returned page immediately.
    pub fn finish_render(&mut self, completed: Option<u32>) -> Option<u32> {
        if let Some(page) = completed {
            if self.page_count > 0 {
                self.current_page = page.clamp(1, self.page_count);
            }
        }
        match self.pending_page.take() {
            Some(next) => Some(next),
            None => {
                self.render_in_flight = false;
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Navigation and zoom
    // ------------------------------------------------------------------

    /// Page to render for a "previous" request, or `None` when rejected
    /// (render in flight, nothing loaded, or already at page 1).
    pub fn previous_page(&self) -> Option<u32> {
        if self.render_in_flight || self.page_count == 0 || self.current_page <= 1 {
            return None;
        }
        Some(self.current_page - 1)
    }

    /// Page to render for a "next" request, or `None` when rejected.
    pub fn next_page(&self) -> Option<u32> {
        if self.render_in_flight || self.page_count == 0 || self.current_page >= self.page_count {
            return None;
        }
        Some(self.current_page + 1)
    }

    /// Step the scale up. Returns the new scale when it changed; the caller
    /// re-renders the current page at that scale.
    pub fn zoom_in(&mut self) -> Option<f32> {
        self.step_scale(ZOOM_STEP)
    }

    /// Step the scale down. Returns the new scale when it changed.
    pub fn zoom_out(&mut self) -> Option<f32> {
        self.step_scale(-ZOOM_STEP)
    }

    fn step_scale(&mut self, delta: f32) -> Option<f32> {
        if self.render_in_flight || self.page_count == 0 {
            return None;
        }
        let next = round_to_step(self.scale + delta).clamp(ZOOM_MIN, ZOOM_MAX);
        if (next - self.scale).abs() < f32::EPSILON {
            return None;
        }
        self.scale = next;
        Some(next)
    }

    // ------------------------------------------------------------------
    // Print / download guards
    // ------------------------------------------------------------------

    /// Claim the print guard. Fails while printing, downloading, or a render
    /// is in flight, and outside the `Open` phase.
    pub fn begin_print(&mut self) -> bool {
        if self.phase != LifecyclePhase::Open
            || self.printing
            || self.downloading
            || self.render_in_flight
        {
            return false;
        }
        self.printing = true;
        true
    }

    pub fn finish_print(&mut self) {
        self.printing = false;
    }

    /// Claim the download guard. Same exclusions as `begin_print`.
    pub fn begin_download(&mut self) -> bool {
        if self.phase != LifecyclePhase::Open
            || self.printing
            || self.downloading
            || self.render_in_flight
        {
            return false;
        }
        self.downloading = true;
        true
    }

    pub fn finish_download(&mut self) {
        self.downloading = false;
    }

    // ------------------------------------------------------------------
    // Drag gestures
    // ------------------------------------------------------------------

    /// Begin panning the content area. Ignored while another gesture is
    /// active or the overlay is not mounted.
    pub fn start_pan(&mut self, pointer: (f32, f32), scroll: (f32, f32)) {
        if self.drag.is_none() && self.is_open() {
            self.drag = Some(DragGesture::Pan { pointer, scroll });
        }
    }

    /// Scroll offsets for the current pointer position during a pan:
    /// `origin - delta * PAN_SPEED`. `None` outside an active pan.
    pub fn pan_position(&self, pointer: (f32, f32)) -> Option<(f32, f32)> {
        match self.drag {
            Some(DragGesture::Pan {
                pointer: origin,
                scroll,
            }) => Some((
                scroll.0 - (pointer.0 - origin.0) * PAN_SPEED,
                scroll.1 - (pointer.1 - origin.1) * PAN_SPEED,
            )),
            _ => None,
        }
    }

    /// Begin repositioning the frame. `offset` is pointer minus the frame's
    /// current top-left corner.
    pub fn start_frame_drag(&mut self, offset: (f32, f32)) {
        if self.drag.is_none() && self.is_open() {
            self.drag = Some(DragGesture::Frame { offset });
        }
    }

    /// Frame top-left for the current pointer position during a frame drag:
    /// `pointer - offset`, no amplification. `None` outside an active drag.
    pub fn frame_position(&self, pointer: (f32, f32)) -> Option<(f32, f32)> {
        match self.drag {
            Some(DragGesture::Frame { offset }) => {
                Some((pointer.0 - offset.0, pointer.1 - offset.1))
            }
            _ => None,
        }
    }

    /// End any active gesture (pointer released).
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// End an active pan only (pointer left the content viewport). A frame
    /// drag crossing the viewport keeps going.
    pub fn end_pan(&mut self) {
        if matches!(self.drag, Some(DragGesture::Pan { .. })) {
            self.drag = None;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;

    #[test]
    fn scale_steps_land_exactly_on_tenths() {
        let mut session = Session::new();
        session.finish_open(3);
        for _ in 0..5 {
            session.zoom_out();
        }
        assert_eq!(session.scale(), 0.5);
        assert!(session.zoom_out().is_none(), "already at the minimum");
    }

    #[test]
    fn pending_slot_is_last_writer_wins() {
        let mut session = Session::new();
        session.finish_open(10);
        assert_eq!(session.request_render(1), RenderAction::Start);
        assert_eq!(session.request_render(2), RenderAction::Coalesced);
        assert_eq!(session.request_render(7), RenderAction::Coalesced);
        assert_eq!(session.finish_render(Some(1)), Some(7));
        assert_eq!(session.finish_render(Some(7)), None);
        assert_eq!(session.current_page(), 7);
    }

    #[test]
    fn pan_amplifies_pointer_delta() {
        let mut session = Session::new();
        session.request_open();
        session.finish_open(1);
        session.start_pan((100.0, 100.0), (10.0, 20.0));
        assert_eq!(session.pan_position((105.0, 92.0)), Some((0.0, 36.0)));
        session.end_drag();
        assert_eq!(session.pan_position((105.0, 92.0)), None);
    }
}
