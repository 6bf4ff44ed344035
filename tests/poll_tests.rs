mod common;

use std::time::Duration;

use common::fake_driver::{FakeDriver, FakeState};
use common::test_config;
use pageflow::browser::driver::{Driver, LoadState};
use pageflow::browser::query::ElementQuery;
use pageflow::error::{HarnessError, Result};
use pageflow::fixture::HarnessConfig;
use pageflow::flow::poll::{poll, Observer, PollOutcome, PollPolicy, RefreshStrategy, Refreshed};
use pageflow::page::PageContext;

// ============================================================================
// Scripted observer
// ============================================================================

/// Shows its value on the `appears_on`-th look (never when `None`).
struct Scripted {
    appears_on: Option<u32>,
    looks: u32,
    refreshes: u32,
    timeout_on: Vec<u32>,
    events: Vec<String>,
}

impl Scripted {
    fn new(appears_on: Option<u32>) -> Self {
        Scripted {
            appears_on,
            looks: 0,
            refreshes: 0,
            timeout_on: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl Observer for Scripted {
    type Output = String;

    fn observe(&mut self, _timeout: Duration) -> Result<Option<String>> {
        self.looks += 1;
        self.events.push(format!("look {}", self.looks));
        if self.timeout_on.contains(&self.looks) {
            return Err(HarnessError::Timeout {
                command: "visible".into(),
                timeout_ms: 10,
            });
        }
        if Some(self.looks) == self.appears_on {
            return Ok(Some("Welcome to Screener".to_string()));
        }
        Ok(None)
    }

    fn refresh(&mut self) -> Result<Refreshed> {
        self.refreshes += 1;
        self.events.push("refresh".to_string());
        Ok(Refreshed::Reload)
    }
}

fn policy(max_attempts: u32) -> PollPolicy {
    PollPolicy::new(max_attempts, Duration::from_millis(10))
}

// ============================================================================
// Poll loop
// ============================================================================

#[test]
fn never_true_predicate_stops_after_exactly_eight_attempts() {
    let mut observer = Scripted::new(None);

    let outcome = poll(&mut observer, &policy(8)).unwrap();

    assert_eq!(outcome, PollOutcome::NotFound { attempts: 8 });
    assert!(!outcome.is_found());
    assert_eq!(observer.looks, 8);
    assert_eq!(observer.refreshes, 7, "no refresh after the final attempt");
}

#[test]
fn found_value_is_returned_with_attempt_count() {
    let mut observer = Scripted::new(Some(3));

    let outcome = poll(&mut observer, &policy(8)).unwrap();

    assert_eq!(outcome.attempts(), 3);
    assert_eq!(outcome.into_value().as_deref(), Some("Welcome to Screener"));
    assert_eq!(observer.events, ["look 1", "refresh", "look 2", "refresh", "look 3"]);
}

#[test]
fn first_attempt_hit_never_refreshes() {
    let mut observer = Scripted::new(Some(1));

    let outcome = poll(&mut observer, &policy(8)).unwrap();

    assert!(outcome.is_found());
    assert_eq!(observer.refreshes, 0);
}

#[test]
fn timed_out_attempts_count_as_not_found() {
    let mut observer = Scripted::new(Some(4));
    observer.timeout_on = vec![1, 2];

    let outcome = poll(&mut observer, &policy(8)).unwrap();

    assert_eq!(outcome.attempts(), 4);
}

#[test]
fn zero_attempts_returns_not_found_without_looking() {
    let mut observer = Scripted::new(Some(1));

    let outcome = poll(&mut observer, &policy(0)).unwrap();

    assert_eq!(outcome, PollOutcome::NotFound { attempts: 0 });
    assert_eq!(observer.looks, 0);
}

#[test]
fn default_policy_uses_eight_attempts() {
    let config = HarnessConfig::default();
    let policy = PollPolicy::from_config(&config);
    assert_eq!(policy.max_attempts, 8);
    assert_eq!(policy.attempt_timeout, Duration::from_millis(1_000));
}

// ============================================================================
// Refresh strategy
// ============================================================================

fn strategy() -> RefreshStrategy {
    RefreshStrategy::new(
        vec![
            ElementQuery::new("button.refresh"),
            ElementQuery::new("#refresh"),
            ElementQuery::new("i.fa.fa-refresh"),
        ],
        "https://yopmail.com/en/?testuser_1",
    )
}

#[test]
fn first_visible_control_wins() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let state = FakeState::default().with_visible("#refresh").with_visible("i.fa.fa-refresh");
    let (mut driver, shared) = FakeDriver::new(state);
    let page = driver.new_page().unwrap();
    let mut ctx = PageContext::new(&mut driver, page, &config);

    let how = strategy().apply(&mut ctx).unwrap();

    assert_eq!(how, Refreshed::Control(1));
    let s = shared.lock().unwrap();
    assert_eq!(s.entries("act"), [format!("act {} click #refresh", page.0)]);
    assert!(s.entries("goto").is_empty());
    assert_eq!(s.entries("wait_for_load"), [format!("wait_for_load {} {:?}", page.0, LoadState::NetworkIdle)]);
}

#[test]
fn no_visible_control_falls_back_to_keyed_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let (mut driver, shared) = FakeDriver::new(FakeState::default());
    let page = driver.new_page().unwrap();
    let mut ctx = PageContext::new(&mut driver, page, &config);

    let how = strategy().apply(&mut ctx).unwrap();

    assert_eq!(how, Refreshed::Reload);
    let s = shared.lock().unwrap();
    assert!(s.entries("act").is_empty());
    assert_eq!(
        s.entries("goto"),
        [format!("goto {} https://yopmail.com/en/?testuser_1", page.0)]
    );
    // every control was checked in preference order
    let checked: Vec<String> = s.entries("visible");
    assert_eq!(checked.len(), 3);
    assert!(checked[0].ends_with("button.refresh"));
    assert!(checked[2].ends_with("i.fa.fa-refresh"));
}

#[test]
fn broken_refresh_control_is_an_error_not_a_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let (mut driver, shared) = FakeDriver::new(FakeState::default().with_broken("#refresh"));
    let page = driver.new_page().unwrap();
    let mut ctx = PageContext::new(&mut driver, page, &config);

    let err = strategy().apply(&mut ctx).unwrap_err();

    assert_eq!(err.kind(), "driver_io");
    let s = shared.lock().unwrap();
    assert!(s.entries("goto").is_empty(), "no reload after a driver failure");
    assert!(s.entries("act").is_empty());
}

// ============================================================================
// Inbox observer
// ============================================================================

#[test]
fn inbox_watch_polls_until_the_message_arrives() {
    use common::fake_fixtures;
    use pageflow::fixture::{TestDataSet, MAIL_PAGE};

    let dir = tempfile::tempdir().unwrap();
    let mut state = FakeState::default().with_texts("body", &["Welcome to Screener, please verify your email"]);
    state.appear_after.insert("div.m".to_string(), 2);
    let (mut fx, factory) = fake_fixtures("inbox watch", test_config(dir.path()), TestDataSet::empty(), state);
    let policy = PollPolicy::from_config(fx.config());

    let mut inbox = fx.inbox().unwrap();
    inbox.open_inbox("testuser_1").unwrap();
    let outcome = poll(&mut inbox.watch_for("Screener"), &policy).unwrap();

    assert_eq!(outcome.attempts(), 3);
    assert!(outcome.into_value().unwrap().contains("verify"));
    assert_eq!(fx.open_pages(), [MAIL_PAGE]);

    let session = factory.session(0);
    let s = session.lock().unwrap();
    let reloads: Vec<&String> = s
        .log
        .iter()
        .filter(|l| l.starts_with("goto") && l.ends_with("?testuser_1"))
        .collect();
    assert_eq!(reloads.len(), 2, "one keyed reload between each pair of looks");
}

#[test]
fn inbox_watch_gives_up_after_the_budget() {
    use common::fake_fixtures;
    use pageflow::fixture::TestDataSet;

    let dir = tempfile::tempdir().unwrap();
    let (mut fx, _factory) = fake_fixtures("empty inbox", test_config(dir.path()), TestDataSet::empty(), FakeState::default());
    let policy = PollPolicy::from_config(fx.config());

    let mut inbox = fx.inbox().unwrap();
    inbox.open_inbox("nobody").unwrap();
    let outcome = poll(&mut inbox.watch_for("Screener"), &policy).unwrap();

    assert_eq!(outcome, PollOutcome::NotFound { attempts: 8 });
}

#[test]
fn inbox_settle_failure_ends_the_poll() {
    use common::fake_fixtures;
    use pageflow::fixture::TestDataSet;

    let dir = tempfile::tempdir().unwrap();
    let state = FakeState::default().with_broken("div");
    let (mut fx, _factory) = fake_fixtures("broken inbox", test_config(dir.path()), TestDataSet::empty(), state);
    let policy = PollPolicy::from_config(fx.config());

    let mut inbox = fx.inbox().unwrap();
    inbox.open_inbox("testuser_1").unwrap();
    let err = poll(&mut inbox.watch_for("Screener"), &policy).unwrap_err();

    assert_eq!(err.kind(), "driver_io");
    assert!(err.to_string().contains("broken pipe"), "{}", err);
}
