mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use common::fake_driver::{FakeSessionFactory, FakeState};
use common::{fake_fixtures, test_config};
use pageflow::fixture::registry::slug;
use pageflow::fixture::{Fixtures, HarnessConfig, TestDataSet, MAIL_PAGE, PRIMARY_PAGE};

fn manifest_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

// =========================================================================
// Registry lifecycle
// =========================================================================

#[test]
fn nothing_launches_until_a_page_is_requested() {
    let dir = tempfile::tempdir().unwrap();
    let (mut fx, factory) = fake_fixtures("lazy", test_config(dir.path()), TestDataSet::empty(), FakeState::default());

    assert!(!fx.is_launched());
    assert_eq!(factory.launched(), 0);
    assert!(fx.constructed().is_empty());

    fx.alerts().unwrap();

    assert!(fx.is_launched());
    assert_eq!(factory.launched(), 1);
    assert_eq!(fx.constructed(), ["alerts", "session"]);
}

#[test]
fn page_objects_share_the_primary_page() {
    let dir = tempfile::tempdir().unwrap();
    let (mut fx, factory) = fake_fixtures("shared", test_config(dir.path()), TestDataSet::empty(), FakeState::default());

    fx.alerts().unwrap();
    let first = fx.page_id(PRIMARY_PAGE).unwrap();
    fx.file_upload().unwrap();
    let second = fx.page_id(PRIMARY_PAGE).unwrap();
    let inbox = fx.page_id(MAIL_PAGE).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, inbox);
    assert_eq!(fx.open_pages(), [MAIL_PAGE, PRIMARY_PAGE]);
    let session = factory.session(0);
    assert_eq!(session.lock().unwrap().entries("new_page").len(), 2);
}

#[test]
fn inbox_is_a_second_page_of_the_signup_session() {
    let dir = tempfile::tempdir().unwrap();
    let (mut fx, factory) = fake_fixtures("inbox", test_config(dir.path()), TestDataSet::empty(), FakeState::default());

    fx.signup().unwrap();
    fx.inbox().unwrap();

    assert_eq!(factory.launched(), 1);
    assert_ne!(fx.page_id(PRIMARY_PAGE).unwrap(), fx.page_id(MAIL_PAGE).unwrap());
    let session = factory.session(0);
    assert_eq!(session.lock().unwrap().open_pages.len(), 2);
}

#[test]
fn teardown_closes_pages_and_quits_once() {
    let dir = tempfile::tempdir().unwrap();
    let (mut fx, factory) = fake_fixtures("teardown", test_config(dir.path()), TestDataSet::empty(), FakeState::default());
    fx.page_id(PRIMARY_PAGE).unwrap();
    fx.page_id(MAIL_PAGE).unwrap();

    fx.teardown().unwrap();
    fx.teardown().unwrap();
    drop(fx);

    let session = factory.session(0);
    let s = session.lock().unwrap();
    assert!(s.quit);
    assert!(s.open_pages.is_empty());
    assert_eq!(s.entries("close_page").len(), 2);
    assert_eq!(s.entries("quit").len(), 1);
}

#[test]
fn failed_session_shutdown_is_reported_after_pages_close() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = FakeState::default();
    state.quit_error = Some("browser server exited with exit status: 1".into());
    let (mut fx, factory) = fake_fixtures("shutdown", test_config(dir.path()), TestDataSet::empty(), state);
    fx.page_id(PRIMARY_PAGE).unwrap();

    let err = fx.teardown().unwrap_err();

    assert_eq!(err.kind(), "driver_io");
    assert!(err.to_string().contains("exit status: 1"), "{}", err);
    fx.teardown().unwrap();
    let session = factory.session(0);
    assert_eq!(session.lock().unwrap().entries("close_page").len(), 1);
}

#[test]
fn torn_down_fixtures_refuse_new_pages() {
    let dir = tempfile::tempdir().unwrap();
    let (mut fx, factory) = fake_fixtures("closed", test_config(dir.path()), TestDataSet::empty(), FakeState::default());

    fx.teardown().unwrap();
    let err = fx.page_id(PRIMARY_PAGE).unwrap_err();

    assert_eq!(err.kind(), "driver_io");
    assert_eq!(factory.launched(), 0);
}

#[test]
fn drop_tears_down_a_launched_session() {
    let dir = tempfile::tempdir().unwrap();
    let (mut fx, factory) = fake_fixtures("dropped", test_config(dir.path()), TestDataSet::empty(), FakeState::default());
    fx.page_id(PRIMARY_PAGE).unwrap();

    drop(fx);

    assert!(factory.session(0).lock().unwrap().quit);
}

#[test]
fn download_directories_are_private_per_test() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(dir.path()));
    let data = Arc::new(TestDataSet::empty());
    let factory = Arc::new(FakeSessionFactory::new(FakeState::default()));
    let mut a = Fixtures::new("Export: xlsx", config.clone(), data.clone(), factory.clone());
    let mut b = Fixtures::new("Export: xlsx", config, data, factory.clone());

    let dir_a = a.downloads_dir().unwrap();
    let dir_b = b.downloads_dir().unwrap();

    assert_ne!(dir_a, dir_b);
    assert_eq!(a.downloads_dir().unwrap(), dir_a, "same directory on repeat requests");
    assert!(dir_a.is_dir() && dir_b.is_dir());
    assert!(dir_a.starts_with(dir.path()));
    assert!(dir_a.file_name().unwrap().to_string_lossy().starts_with("export_xlsx-"));
    assert_eq!(factory.launched(), 0, "downloads need no browser");
}

#[test]
fn parallel_tests_get_separate_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(dir.path()));
    let data = Arc::new(TestDataSet::empty());
    let factory = Arc::new(FakeSessionFactory::new(FakeState::default()));

    thread::scope(|scope| {
        for i in 0..4 {
            let (config, data, factory) = (config.clone(), data.clone(), factory.clone());
            scope.spawn(move || {
                let mut fx = Fixtures::new(format!("worker {}", i), config, data, factory);
                let mut ctx = fx.context(PRIMARY_PAGE).unwrap();
                ctx.open(&format!("https://example.com/{}", i)).unwrap();
            });
        }
    });

    assert_eq!(factory.launched(), 4);
    for i in 0..4 {
        let session = factory.session(i);
        let s = session.lock().unwrap();
        assert!(s.quit);
        assert_eq!(s.entries("goto").len(), 1, "each session saw only its own test");
    }
}

#[test]
fn slug_is_filesystem_safe() {
    assert_eq!(slug("verify_account (valid code)"), "verify_account_valid_code");
    assert_eq!(slug("  "), "test");
    assert_eq!(slug("Tags/Input"), "tags_input");
}

// =========================================================================
// Configuration
// =========================================================================

#[test]
fn empty_config_uses_defaults() {
    let config = HarnessConfig::from_yaml("").unwrap();

    assert_eq!(config.polling.max_attempts, 8);
    assert_eq!(config.timeouts.poll_attempt_ms, 1_000);
    assert_eq!(config.run.jobs, 1);
    assert_eq!(config.sites.mail_domain, "yopmail.com");
    assert_eq!(config.convergence.max_actions, None);
}

#[test]
fn partial_config_keeps_other_defaults() {
    let config = HarnessConfig::from_yaml("timeouts:\n  action_ms: 250\nconvergence:\n  max_actions: 40\n").unwrap();

    assert_eq!(config.timeouts.action_ms, 250);
    assert_eq!(config.timeouts.visibility_ms, 10_000);
    assert_eq!(config.convergence.max_actions, Some(40));
}

#[test]
fn shipped_config_parses() {
    let config = HarnessConfig::load(Some(&manifest_path("pageflow.yaml"))).unwrap();

    assert_eq!(config.run.jobs, 2);
    assert_eq!(config.test_data.as_deref(), Some(Path::new("testdata/pageflow-data.yaml")));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let err = HarnessConfig::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert_eq!(err.kind(), "config");
}

#[test]
fn malformed_config_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "timeouts: [1, 2").unwrap();

    let err = HarnessConfig::load(Some(&path)).unwrap_err();

    assert!(err.to_string().contains("bad.yaml"), "{}", err);
}

// =========================================================================
// Test data
// =========================================================================

#[test]
fn test_data_lookup_by_dotted_key() {
    let data = TestDataSet::from_yaml("alerts:\n  prompt_answer: Playwright\ntags: [a, b]\n").unwrap();

    assert_eq!(data.get::<String>("alerts.prompt_answer").unwrap(), "Playwright");
    assert_eq!(data.get::<String>("tags.1").unwrap(), "b");
    assert_eq!(data.get::<Vec<String>>("tags").unwrap(), ["a", "b"]);
    assert_eq!(data.get_or("alerts.missing", 3u32).unwrap(), 3);
}

#[test]
fn missing_or_mistyped_key_names_the_key() {
    let data = TestDataSet::from_yaml("stars_rating:\n  stars: five\n").unwrap();

    let err = data.get::<u32>("stars_rating.stars").unwrap_err();
    assert_eq!(err.kind(), "test_data");
    assert!(err.to_string().contains("stars_rating.stars"));

    let err = data.get::<String>("nope").unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[test]
fn shipped_test_data_has_every_scenario_section() {
    let data = TestDataSet::load(&manifest_path("testdata/pageflow-data.yaml")).unwrap();

    for key in [
        "tags",
        "verify_account.valid_code",
        "alerts.prompt_answer",
        "file_upload.file",
        "dynamic_table.new_row.name",
        "static_table.expected_pdf_text",
        "screener.sender",
        "context_menu.share_items",
        "multi_dropdown.animal_options",
        "superheroes",
        "redirect_chain.pages",
        "product_image.cart_path",
    ] {
        assert!(data.contains(key), "missing {}", key);
    }
}
