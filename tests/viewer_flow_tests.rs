//! End-to-end controller flow over the pure session core.
//!
//! Drives the session exactly the way the wasm render loop does, with a
//! recording engine standing in for the rasterizer, and checks the full
//! walkthrough the viewer promises: open, navigate, zoom, close, release.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use pdfmodal::session::{CloseAction, OpenAction, RenderAction, Session};

/// Stand-in for the rasterization engine: records every render and enforces
/// the handle contract.
struct RecordingEngine {
    pages: u32,
    rendered: Vec<(u32, f32)>,
    destroyed: bool,
}

impl RecordingEngine {
    fn new(pages: u32) -> Self {
        Self {
            pages,
            rendered: Vec::new(),
            destroyed: false,
        }
    }

    fn render(&mut self, page: u32, scale: f32) {
        assert!(!self.destroyed, "render against a destroyed handle");
        assert!(
            (1..=self.pages).contains(&page),
            "render outside document range: {page}"
        );
        self.rendered.push((page, scale));
    }

    fn destroy(&mut self) {
        assert!(!self.destroyed, "handle must be destroyed exactly once");
        self.destroyed = true;
    }
}

/// Run the render loop to quiescence, rasterizing through the engine.
fn pump(session: &mut Session, engine: &mut RecordingEngine, first: u32) {
    let mut page = first;
    loop {
        engine.render(page, session.scale());
        match session.finish_render(Some(page)) {
            Some(next) => page = next,
            None => break,
        }
    }
}

#[test]
fn test_three_page_walkthrough() {
    let mut engine = RecordingEngine::new(3);
    let mut session = Session::new();

    // Open: load resolves with the page count and page 1 renders.
    assert_eq!(session.request_open(), OpenAction::Proceed);
    session.finish_open(engine.pages);
    assert_eq!(session.request_render(1), RenderAction::Start);
    pump(&mut session, &mut engine, 1);
    assert_eq!(session.current_page(), 1);

    // nextPage twice lands on the last page.
    for _ in 0..2 {
        let target = session.next_page().unwrap();
        assert_eq!(session.request_render(target), RenderAction::Start);
        pump(&mut session, &mut engine, target);
    }
    assert_eq!(session.current_page(), 3);
    let controls = session.controls();
    assert!(!controls.next, "next disabled at the last page");
    assert!(controls.previous, "previous enabled at the last page");

    // zoomOut five times from 1.0 reads exactly 0.5.
    for _ in 0..5 {
        if session.zoom_out().is_some() {
            let page = session.current_page();
            assert_eq!(session.request_render(page), RenderAction::Start);
            pump(&mut session, &mut engine, page);
        }
    }
    assert_eq!(session.scale(), 0.5);
    assert!(!session.controls().zoom_out, "zoom-out disabled at 0.5");

    // Close: after the exit transition the session is reset and the
    // document handle released.
    assert_eq!(session.request_close(), CloseAction::Proceed);
    session.finish_close();
    engine.destroy();
    assert!(!session.is_open());
    assert!(session.is_closed());
    assert_eq!(session.scale(), 1.0, "session resets to defaults");

    // Pages 1-3 at scale 1.0, then page 3 once per zoom step.
    assert_eq!(
        engine.rendered,
        vec![
            (1, 1.0),
            (2, 1.0),
            (3, 1.0),
            (3, 0.9),
            (3, 0.8),
            (3, 0.7),
            (3, 0.6),
            (3, 0.5)
        ]
    );
}

#[test]
fn test_rapid_requests_mid_render_converge_to_last() {
    let mut engine = RecordingEngine::new(9);
    let mut session = Session::new();
    assert_eq!(session.request_open(), OpenAction::Proceed);
    session.finish_open(engine.pages);

    assert_eq!(session.request_render(1), RenderAction::Start);
    // Input arrives faster than rendering completes.
    for page in [4, 6, 8, 2] {
        assert_eq!(session.request_render(page), RenderAction::Coalesced);
    }
    pump(&mut session, &mut engine, 1);

    assert_eq!(session.current_page(), 2, "view converges to the last request");
    assert_eq!(
        engine.rendered,
        vec![(1, 1.0), (2, 1.0)],
        "one in-flight render plus one for the surviving request"
    );
}

#[test]
fn test_reopen_during_close_never_overlaps() {
    let mut engine = RecordingEngine::new(2);
    let mut session = Session::new();
    assert_eq!(session.request_open(), OpenAction::Proceed);
    session.finish_open(engine.pages);
    assert_eq!(session.request_render(1), RenderAction::Start);
    pump(&mut session, &mut engine, 1);

    // Close starts animating; the re-open must wait for it.
    assert_eq!(session.request_close(), CloseAction::Proceed);
    assert_eq!(session.request_open(), OpenAction::Parked);
    assert!(session.is_open(), "still tearing down, not yet re-openable");

    session.finish_close();
    engine.destroy();

    // The parked open replays against a fresh session.
    assert_eq!(session.request_open(), OpenAction::Proceed);
    let mut engine = RecordingEngine::new(2);
    session.finish_open(engine.pages);
    assert_eq!(session.request_render(1), RenderAction::Start);
    pump(&mut session, &mut engine, 1);
    assert_eq!(session.current_page(), 1);
}

#[test]
fn test_deferred_close_runs_after_final_render() {
    let mut engine = RecordingEngine::new(6);
    let mut session = Session::new();
    assert_eq!(session.request_open(), OpenAction::Proceed);
    session.finish_open(engine.pages);

    assert_eq!(session.request_render(1), RenderAction::Start);
    assert_eq!(session.request_render(5), RenderAction::Coalesced);
    assert_eq!(session.request_close(), CloseAction::Latched);

    // The loop drains: in-flight page, then the surviving pending page.
    engine.render(1, session.scale());
    let next = session.finish_render(Some(1)).unwrap();
    assert!(!session.take_pending_close(), "loop still holds the claim");
    engine.render(next, session.scale());
    assert_eq!(session.finish_render(Some(next)), None);

    // Quiesced: the latched close proceeds, bounded by in-flight + 1 renders.
    assert!(session.take_pending_close());
    session.finish_close();
    engine.destroy();
    assert_eq!(engine.rendered.len(), 2);
    assert!(session.is_closed());
}
