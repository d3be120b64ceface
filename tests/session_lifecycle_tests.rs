//! Lifecycle state machine tests
//!
//! Open/close transitions, close idempotence, the parked re-open slot, and
//! the latched close that waits for in-flight work to quiesce.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use pdfmodal::session::{CloseAction, LifecyclePhase, OpenAction, RenderAction, Session};

/// Open a session with a loaded document, the way the controller does.
fn open_session(pages: u32) -> Session {
    let mut session = Session::new();
    assert_eq!(session.request_open(), OpenAction::Proceed);
    session.finish_open(pages);
    session
}

// =============================================================================
// OPEN
// =============================================================================

#[test]
fn test_open_from_closed_proceeds() {
    let mut session = Session::new();
    assert!(session.is_closed());
    assert_eq!(session.request_open(), OpenAction::Proceed);
    assert_eq!(session.phase(), LifecyclePhase::Opening);
    assert!(session.is_open(), "overlay is mounted from Opening onward");
}

#[test]
fn test_open_is_noop_while_opening_or_open() {
    let mut session = Session::new();
    assert_eq!(session.request_open(), OpenAction::Proceed);
    assert_eq!(session.request_open(), OpenAction::Ignored);
    session.finish_open(3);
    assert_eq!(session.request_open(), OpenAction::Ignored);
    assert_eq!(session.phase(), LifecyclePhase::Open);
}

#[test]
fn test_open_during_close_is_parked_until_close_finishes() {
    let mut session = open_session(3);
    assert_eq!(session.request_close(), CloseAction::Proceed);
    // Close still animating: the open must wait, never double-mount.
    assert_eq!(session.request_open(), OpenAction::Parked);
    assert_eq!(session.phase(), LifecyclePhase::Closing);
    session.finish_close();
    // Replayed only after the close fully finished.
    assert_eq!(session.request_open(), OpenAction::Proceed);
    assert_eq!(session.phase(), LifecyclePhase::Opening);
}

#[test]
fn test_load_failure_still_reaches_open_with_no_pages() {
    let mut session = Session::new();
    assert_eq!(session.request_open(), OpenAction::Proceed);
    session.open_failed();
    assert_eq!(session.phase(), LifecyclePhase::Open);
    assert_eq!(session.page_count(), 0);
    let controls = session.controls();
    assert!(
        !controls.previous && !controls.next && !controls.zoom_in && !controls.zoom_out,
        "no affordance is enabled without a document"
    );
}

// =============================================================================
// CLOSE
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let mut session = open_session(2);
    assert_eq!(session.request_close(), CloseAction::Proceed);
    // Second call while Closing: no additional side effects.
    assert_eq!(session.request_close(), CloseAction::Ignored);
    assert_eq!(session.phase(), LifecyclePhase::Closing);
    session.finish_close();
    assert!(session.is_closed());
    // And after Closed.
    assert_eq!(session.request_close(), CloseAction::Ignored);
    assert!(session.is_closed());
}

#[test]
fn test_close_resets_all_session_fields() {
    let mut session = open_session(5);
    assert_eq!(session.request_render(1), RenderAction::Start);
    assert_eq!(session.finish_render(Some(3)), None);
    session.zoom_in();
    assert_eq!(session.request_close(), CloseAction::Proceed);
    session.finish_close();

    assert_eq!(session.phase(), LifecyclePhase::Closed);
    assert_eq!(session.page_count(), 0);
    assert_eq!(session.current_page(), 1);
    assert_eq!(session.scale(), 1.0);
    assert!(!session.render_in_flight());
    assert!(!session.is_printing());
    assert!(!session.is_downloading());
    assert!(session.drag().is_none());
}

#[test]
fn test_close_waits_for_render_to_quiesce() {
    let mut session = open_session(4);
    assert_eq!(session.request_render(2), RenderAction::Start);
    assert_eq!(session.request_close(), CloseAction::Latched);
    assert_eq!(
        session.phase(),
        LifecyclePhase::Open,
        "close must not preempt the in-flight render"
    );
    assert!(!session.take_pending_close(), "still in flight");
    assert_eq!(session.finish_render(Some(2)), None);
    assert!(session.take_pending_close());
    assert_eq!(session.phase(), LifecyclePhase::Closing);
    assert!(!session.take_pending_close(), "latch releases exactly once");
}

#[test]
fn test_latched_close_waits_for_pending_render_too() {
    let mut session = open_session(4);
    assert_eq!(session.request_render(2), RenderAction::Start);
    assert_eq!(session.request_render(3), RenderAction::Coalesced);
    assert_eq!(session.request_close(), CloseAction::Latched);
    // First completion hands over the pending page; the claim is not yet
    // released.
    assert_eq!(session.finish_render(Some(2)), Some(3));
    assert!(!session.take_pending_close());
    assert_eq!(session.finish_render(Some(3)), None);
    assert!(session.take_pending_close());
}

#[test]
fn test_close_waits_for_print_and_download() {
    let mut session = open_session(2);
    assert!(session.begin_print());
    assert_eq!(session.request_close(), CloseAction::Latched);
    assert!(!session.take_pending_close());
    session.finish_print();
    assert!(session.take_pending_close());

    let mut session = open_session(2);
    assert!(session.begin_download());
    assert_eq!(session.request_close(), CloseAction::Latched);
    session.finish_download();
    assert!(session.take_pending_close());
}

// =============================================================================
// BUSY GUARDS
// =============================================================================

#[test]
fn test_print_and_download_are_mutually_exclusive() {
    let mut session = open_session(2);
    assert!(session.begin_print());
    assert!(!session.begin_download());
    assert!(!session.begin_print(), "print also serializes itself");
    session.finish_print();
    assert!(session.begin_download());
    assert!(!session.begin_print());
    session.finish_download();
    assert!(session.begin_print());
}

#[test]
fn test_print_and_download_rejected_while_render_in_flight() {
    let mut session = open_session(2);
    assert_eq!(session.request_render(1), RenderAction::Start);
    assert!(!session.begin_print());
    assert!(!session.begin_download());
    assert_eq!(session.finish_render(Some(1)), None);
    assert!(session.begin_print());
}

#[test]
fn test_print_rejected_before_document_is_open() {
    let mut session = Session::new();
    assert!(!session.begin_print(), "nothing to print while closed");
    assert_eq!(session.request_open(), OpenAction::Proceed);
    assert!(!session.begin_print(), "nothing to print while loading");
    session.finish_open(1);
    assert!(session.begin_print());
}

#[test]
fn test_render_allowed_while_printing() {
    let mut session = open_session(3);
    assert!(session.begin_print());
    // The print dialog lives in its own window; rendering stays available.
    assert_eq!(session.request_render(2), RenderAction::Start);
    assert_eq!(session.finish_render(Some(2)), None);
    assert_eq!(session.current_page(), 2);
    session.finish_print();
}
