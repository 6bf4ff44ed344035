mod common;

use std::path::PathBuf;

use common::fake_driver::{FakeDriver, FakeState};
use common::test_config;
use pageflow::browser::driver::{
    Action, DialogResponse, Driver, EventKind, EventOutcome, ExpectationId, LoadState, PageId,
};
use pageflow::browser::event;
use pageflow::browser::query::{ElementQuery, FrameScope};
use pageflow::browser::session::{BrowserRequest, BrowserResponse};
use pageflow::error::HarnessError;
use pageflow::page::PageContext;

// =========================================================================
// BrowserRequest serialization
// =========================================================================

#[test]
fn goto_request_serializes_with_wait_state() {
    let req = BrowserRequest::Goto {
        page: PageId(2),
        url: "https://example.com",
        wait_until: LoadState::NetworkIdle,
        timeout_ms: 5000,
    };
    let json: serde_json::Value = serde_json::to_value(&req).unwrap();

    assert_eq!(json["cmd"], "goto");
    assert_eq!(json["page"], 2);
    assert_eq!(json["url"], "https://example.com");
    assert_eq!(json["wait_until"], "networkidle");
    assert_eq!(json["timeout_ms"], 5000);
}

#[test]
fn act_request_carries_query_and_tagged_action() {
    let target = FrameScope::root()
        .frame("#ifinbox")
        .locator("div.m")
        .with_text("Screener")
        .first();
    let action = Action::fill("hello");
    let req = BrowserRequest::Act {
        page: PageId(1),
        target: &target,
        action: &action,
        timeout_ms: 100,
    };
    let json: serde_json::Value = serde_json::to_value(&req).unwrap();

    assert_eq!(json["cmd"], "act");
    assert_eq!(json["target"]["frames"][0], "#ifinbox");
    assert_eq!(json["target"]["selector"], "div.m");
    assert_eq!(json["target"]["hasText"], "Screener", "has_text serializes as 'hasText'");
    assert_eq!(json["target"]["nth"], 0);
    assert_eq!(json["action"]["kind"], "fill");
    assert_eq!(json["action"]["value"], "hello");
}

#[test]
fn plain_query_omits_optional_fields() {
    let target = ElementQuery::new("#go");
    let json: serde_json::Value = serde_json::to_value(&target).unwrap();

    assert_eq!(json["selector"], "#go");
    assert!(json.get("frames").is_none());
    assert!(json.get("nth").is_none());
    assert!(json.get("hasText").is_none());
}

#[test]
fn expect_request_flattens_event_kind() {
    let kind = EventKind::Download {
        dir: PathBuf::from("/tmp/dl"),
        file_name: Some("report.xlsx".into()),
    };
    let req = BrowserRequest::Expect {
        id: ExpectationId(7),
        page: PageId(1),
        kind: &kind,
    };
    let json: serde_json::Value = serde_json::to_value(&req).unwrap();

    assert_eq!(json["cmd"], "expect");
    assert_eq!(json["id"], 7);
    assert_eq!(json["event"], "download");
    assert_eq!(json["dir"], "/tmp/dl");
    assert_eq!(json["file_name"], "report.xlsx");
}

#[test]
fn dialog_expectation_serializes_answer() {
    let kind = EventKind::Dialog {
        answer: DialogResponse::AcceptWith { text: "Hello".into() },
    };
    let json: serde_json::Value = serde_json::to_value(&kind).unwrap();

    assert_eq!(json["event"], "dialog");
    assert_eq!(json["answer"]["response"], "accept_with");
    assert_eq!(json["answer"]["text"], "Hello");
}

#[test]
fn quit_request_is_bare() {
    let json: serde_json::Value = serde_json::to_value(&BrowserRequest::Quit).unwrap();
    assert_eq!(json, serde_json::json!({"cmd": "quit"}));
}

// =========================================================================
// BrowserResponse
// =========================================================================

#[test]
fn timeout_response_maps_to_timeout_error() {
    let resp: BrowserResponse =
        serde_json::from_str(r#"{"ok": false, "error": "Timeout 50ms exceeded", "error_kind": "timeout"}"#).unwrap();
    let target = ElementQuery::new("#x");
    let req = BrowserRequest::Visible {
        page: PageId(1),
        target: &target,
        timeout_ms: 50,
    };

    match resp.into_result(&req).unwrap_err() {
        HarnessError::Timeout { command, timeout_ms } => {
            assert_eq!(command, "visible");
            assert_eq!(timeout_ms, 50);
        }
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[test]
fn failed_response_maps_to_driver_error() {
    let resp: BrowserResponse = serde_json::from_str(r#"{"ok": false, "error": "page closed"}"#).unwrap();

    let err = resp.into_result(&BrowserRequest::NewPage).unwrap_err();

    assert!(!err.is_timeout());
    assert!(err.to_string().contains("page closed"), "{}", err);
}

#[test]
fn event_response_deserializes_outcome() {
    let resp: BrowserResponse = serde_json::from_str(
        r#"{"ok": true, "event": {"event": "page", "page": 3, "url": "https://example.com/tab"}}"#,
    )
    .unwrap();

    let resp = resp.into_result(&BrowserRequest::NewPage).unwrap();

    assert_eq!(
        resp.event,
        Some(EventOutcome::Page {
            page: PageId(3),
            url: "https://example.com/tab".into()
        })
    );
}

// =========================================================================
// Queries
// =========================================================================

#[test]
fn query_display_shows_frames_text_and_index() {
    let query = FrameScope::root()
        .frame("#outer")
        .frame("#inner")
        .locator("p")
        .with_text("hi")
        .nth(2);

    assert_eq!(query.to_string(), r#"#outer >>> #inner >>> p [text~="hi"] [2]"#);
}

#[test]
fn child_query_keeps_frame_scope() {
    let host = FrameScope::root().frame("#f").locator("#host");
    let child = host.child("button");

    assert_eq!(child.frames, ["#f"]);
    assert_eq!(child.selector, "#host >> button");
    assert_eq!(FrameScope::root().frame("a").frame("b").depth(), 2);
}

// =========================================================================
// Event expectations
// =========================================================================

#[test]
fn listener_is_registered_before_the_triggering_click() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let state = FakeState::default().with_event(EventOutcome::Dialog {
        dialog_type: "alert".into(),
        message: "I am an alert box!".into(),
    });
    let (mut driver, shared) = FakeDriver::new(state);
    let page = driver.new_page().unwrap();
    let mut ctx = PageContext::new(&mut driver, page, &config);

    let outcome = ctx
        .click_expecting(
            "open alert",
            &ElementQuery::new("#alertBtn"),
            EventKind::Dialog {
                answer: DialogResponse::Accept,
            },
            config.timeouts.action(),
        )
        .unwrap();

    assert!(matches!(outcome, EventOutcome::Dialog { ref message, .. } if message == "I am an alert box!"));
    let s = shared.lock().unwrap();
    let expect = s.position("expect").unwrap();
    let act = s.position("act").unwrap();
    let awaited = s.position("await").unwrap();
    assert!(expect < act && act < awaited, "log: {:?}", s.log);
    assert!(s.entries("cancel").is_empty());
}

#[test]
fn stalled_trigger_cancels_the_listener() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let (mut driver, shared) = FakeDriver::new(FakeState::default().with_stalled("#missing"));
    let page = driver.new_page().unwrap();
    let mut ctx = PageContext::new(&mut driver, page, &config);

    let err = ctx
        .click_expecting(
            "open popup",
            &ElementQuery::new("#missing"),
            EventKind::Page,
            config.timeouts.action(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), "element_not_ready");
    assert!(err.to_string().contains("open popup"), "{}", err);
    let s = shared.lock().unwrap();
    assert_eq!(s.entries("cancel").len(), 1);
    assert!(s.entries("await").is_empty());
    assert!(s.pending.is_empty());
}

#[test]
fn dropped_expectation_releases_the_listener() {
    let (mut driver, shared) = FakeDriver::new(FakeState::default());
    let page = driver.new_page().unwrap();

    {
        let pending = event::expect(&mut driver, page, EventKind::Close).unwrap();
        assert_eq!(pending.id().0, 1);
    }

    let s = shared.lock().unwrap();
    assert_eq!(s.entries("cancel"), ["cancel 1"]);
    assert!(s.pending.is_empty());
}

#[test]
fn download_lands_in_the_requested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let (mut driver, _shared) = FakeDriver::new(FakeState::default().with_download("sample.txt", b"hello"));
    let page = driver.new_page().unwrap();

    let pending = event::expect(
        &mut driver,
        page,
        EventKind::Download {
            dir: dir.path().to_path_buf(),
            file_name: None,
        },
    )
    .unwrap();
    let outcome = pending
        .trigger(std::time::Duration::from_millis(100), |d| {
            d.act(page, &ElementQuery::new("a.download"), &Action::click(), std::time::Duration::from_millis(100))
        })
        .unwrap();

    match outcome {
        EventOutcome::Download { suggested_filename, path } => {
            assert_eq!(suggested_filename, "sample.txt");
            assert_eq!(path, dir.path().join("sample.txt"));
            assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        }
        other => panic!("expected Download, got {:?}", other),
    }
}
