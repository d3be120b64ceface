//! Render coalescing tests
//!
//! The single-slot policy: at most one render in flight, newer requests
//! overwrite the pending slot, and the view converges to the most recently
//! requested page without rendering intermediates.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use pdfmodal::session::{OpenAction, RenderAction, Session};

fn open_session(pages: u32) -> Session {
    let mut session = Session::new();
    assert_eq!(session.request_open(), OpenAction::Proceed);
    session.finish_open(pages);
    session
}

/// Complete renders until the pending slot drains, the way the async loop
/// does, recording every page actually rendered.
fn drain(session: &mut Session, first: u32) -> Vec<u32> {
    let mut rendered = Vec::new();
    let mut page = first;
    loop {
        rendered.push(page);
        match session.finish_render(Some(page)) {
            Some(next) => page = next,
            None => break,
        }
    }
    rendered
}

#[test]
fn test_requests_during_flight_coalesce_to_last() {
    let mut session = open_session(9);
    assert_eq!(session.request_render(1), RenderAction::Start);
    for page in [2, 3, 4, 5] {
        assert_eq!(session.request_render(page), RenderAction::Coalesced);
    }

    let rendered = drain(&mut session, 1);
    assert_eq!(rendered, vec![1, 5], "intermediate pages are never rendered");
    assert_eq!(session.current_page(), 5);
    assert!(!session.render_in_flight());
}

#[test]
fn test_total_renders_at_most_in_flight_plus_one() {
    let mut session = open_session(50);
    assert_eq!(session.request_render(10), RenderAction::Start);
    for page in 11..=40 {
        assert_eq!(session.request_render(page), RenderAction::Coalesced);
    }
    let rendered = drain(&mut session, 10);
    assert!(
        rendered.len() <= 2,
        "thirty coalesced requests still cost at most one extra render, got {}",
        rendered.len()
    );
    assert_eq!(session.current_page(), 40);
}

#[test]
fn test_render_failure_keeps_page_and_drains_pending() {
    let mut session = open_session(5);
    assert_eq!(session.request_render(2), RenderAction::Start);
    assert_eq!(session.request_render(3), RenderAction::Coalesced);

    // The in-flight render fails; the pending request still runs.
    assert_eq!(session.finish_render(None), Some(3));
    assert_eq!(
        session.current_page(),
        1,
        "a failed render leaves the page position untouched"
    );
    assert_eq!(session.finish_render(Some(3)), None);
    assert_eq!(session.current_page(), 3);
}

#[test]
fn test_completion_clamps_into_document_range() {
    let mut session = open_session(5);
    assert_eq!(session.request_render(5), RenderAction::Start);
    assert_eq!(session.finish_render(Some(9)), None);
    assert_eq!(session.current_page(), 5, "current page never leaves [1, pageCount]");
}

#[test]
fn test_new_request_after_drain_starts_immediately() {
    let mut session = open_session(3);
    assert_eq!(session.request_render(1), RenderAction::Start);
    assert_eq!(session.finish_render(Some(1)), None);
    // Queue is empty again: the next request is not coalesced.
    assert_eq!(session.request_render(2), RenderAction::Start);
    assert_eq!(session.finish_render(Some(2)), None);
    assert_eq!(session.current_page(), 2);
}

#[test]
fn test_in_flight_claim_survives_handover() {
    let mut session = open_session(4);
    assert_eq!(session.request_render(1), RenderAction::Start);
    assert_eq!(session.request_render(4), RenderAction::Coalesced);
    // Handover keeps the claim: a request arriving exactly between the two
    // renders still coalesces instead of starting a second loop.
    assert_eq!(session.finish_render(Some(1)), Some(4));
    assert!(session.render_in_flight());
    assert_eq!(session.request_render(2), RenderAction::Coalesced);
    assert_eq!(session.finish_render(Some(4)), Some(2));
    assert_eq!(session.finish_render(Some(2)), None);
    assert_eq!(session.current_page(), 2);
}
