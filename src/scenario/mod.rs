//! Canonical behaviour checks, one per logical behaviour of the sites under
//! test, and the per-test context that records their checks.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fixture::Fixtures;

pub mod context;
pub mod model;

mod apps;
mod demo_site;
mod exports;
mod mail;
mod playground;
mod shop;

pub use context::TestContext;
pub use model::{CheckResult, TestResult};

/// One named behaviour a suite can run.
///
/// Suites list scenarios by their `scenario` tag:
///
/// ```yaml
/// scenarios:
///   - scenario: sortable_list
///   - scenario: verify_account
///     valid_code: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Scenario {
    SortableList,
    EmailVerification,
    DynamicTableExport,
    StaticTableExport,
    Alerts,
    FileDownload,
    FileUpload,
    DragAndDrop,
    NewTab,
    Popup,
    NestedIframe,
    TagsInput,
    VerifyAccount {
        #[serde(default = "default_true")]
        valid_code: bool,
    },
    ShadowDom,
    StarsRating,
    ContextMenu,
    MultiLevelDropdown,
    CoveredElements,
    OnboardingModal,
    FetchData,
    SuperheroTable,
    RedirectChain,
    ProductImage,
}

fn default_true() -> bool { true }

impl Scenario {
    /// Every scenario, in catalog order.
    pub fn catalog() -> Vec<Scenario> {
        vec![
            Scenario::SortableList,
            Scenario::TagsInput,
            Scenario::VerifyAccount { valid_code: true },
            Scenario::VerifyAccount { valid_code: false },
            Scenario::ShadowDom,
            Scenario::StarsRating,
            Scenario::NewTab,
            Scenario::Popup,
            Scenario::NestedIframe,
            Scenario::ContextMenu,
            Scenario::MultiLevelDropdown,
            Scenario::CoveredElements,
            Scenario::OnboardingModal,
            Scenario::FetchData,
            Scenario::SuperheroTable,
            Scenario::RedirectChain,
            Scenario::Alerts,
            Scenario::FileDownload,
            Scenario::FileUpload,
            Scenario::DragAndDrop,
            Scenario::DynamicTableExport,
            Scenario::StaticTableExport,
            Scenario::ProductImage,
            Scenario::EmailVerification,
        ]
    }

    /// The tag used in suite files.
    pub fn key(&self) -> &'static str {
        match self {
            Scenario::SortableList => "sortable_list",
            Scenario::EmailVerification => "email_verification",
            Scenario::DynamicTableExport => "dynamic_table_export",
            Scenario::StaticTableExport => "static_table_export",
            Scenario::Alerts => "alerts",
            Scenario::FileDownload => "file_download",
            Scenario::FileUpload => "file_upload",
            Scenario::DragAndDrop => "drag_and_drop",
            Scenario::NewTab => "new_tab",
            Scenario::Popup => "popup",
            Scenario::NestedIframe => "nested_iframe",
            Scenario::TagsInput => "tags_input",
            Scenario::VerifyAccount { .. } => "verify_account",
            Scenario::ShadowDom => "shadow_dom",
            Scenario::StarsRating => "stars_rating",
            Scenario::ContextMenu => "context_menu",
            Scenario::MultiLevelDropdown => "multi_level_dropdown",
            Scenario::CoveredElements => "covered_elements",
            Scenario::OnboardingModal => "onboarding_modal",
            Scenario::FetchData => "fetch_data",
            Scenario::SuperheroTable => "superhero_table",
            Scenario::RedirectChain => "redirect_chain",
            Scenario::ProductImage => "product_image",
        }
    }

    /// Test name used in reports and download namespaces.
    pub fn name(&self) -> String {
        match self {
            Scenario::VerifyAccount { valid_code: true } => "verify_account (valid code)".to_string(),
            Scenario::VerifyAccount { valid_code: false } => "verify_account (invalid code)".to_string(),
            other => other.key().to_string(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::SortableList => "drag the sortable list until the page tags every item right",
            Scenario::EmailVerification => "register with a fresh address and poll the inbox for the confirmation email",
            Scenario::DynamicTableExport => "add a row, then find it in the Excel, CSV and PDF exports",
            Scenario::StaticTableExport => "compare the rendered static table with its Excel and PDF exports",
            Scenario::Alerts => "accept, dismiss and answer alert, confirm and prompt dialogs",
            Scenario::FileDownload => "generate a text file and check the downloaded content",
            Scenario::FileUpload => "attach a file, then remove and clear it",
            Scenario::DragAndDrop => "drop every logo into the drop area",
            Scenario::NewTab => "open a link in a new tab and read its header",
            Scenario::Popup => "submit a pop-up window and wait for it to close",
            Scenario::NestedIframe => "click a button two frames deep and read its message",
            Scenario::TagsInput => "add tags up to the input's limit",
            Scenario::VerifyAccount { valid_code: true } => "a valid code shows the success message",
            Scenario::VerifyAccount { valid_code: false } => "an invalid code keeps the form without success",
            Scenario::ShadowDom => "boost the progress bar inside a shadow root",
            Scenario::StarsRating => "click every star without leaving the page",
            Scenario::ContextMenu => "pick every context menu item, including the share submenu",
            Scenario::MultiLevelDropdown => "walk the settings and animals submenus and come back",
            Scenario::CoveredElements => "scroll the covered link into view",
            Scenario::OnboardingModal => "open the onboarding modal and read its title",
            Scenario::FetchData => "wait for fetched posts to render",
            Scenario::SuperheroTable => "look up each hero's real name in the shuffled table",
            Scenario::RedirectChain => "follow the redirect chain to its last page and back",
            Scenario::ProductImage => "the product image matches across product, shop and cart",
        }
    }

    /// Run the scenario against `fx`, recording checks in `ctx`.
    ///
    /// Returns at the first failed check or operation error.
    pub fn run(&self, fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
        match self {
            Scenario::SortableList => playground::sortable_list(fx, ctx),
            Scenario::TagsInput => playground::tags_input(fx, ctx),
            Scenario::VerifyAccount { valid_code } => playground::verify_account(fx, ctx, *valid_code),
            Scenario::ShadowDom => playground::shadow_dom(fx, ctx),
            Scenario::StarsRating => playground::stars_rating(fx, ctx),
            Scenario::NewTab => playground::new_tab(fx, ctx),
            Scenario::Popup => playground::popup(fx, ctx),
            Scenario::NestedIframe => playground::nested_iframe(fx, ctx),
            Scenario::ContextMenu => apps::context_menu(fx, ctx),
            Scenario::MultiLevelDropdown => apps::multi_level_dropdown(fx, ctx),
            Scenario::CoveredElements => apps::covered_elements(fx, ctx),
            Scenario::OnboardingModal => apps::onboarding_modal(fx, ctx),
            Scenario::FetchData => apps::fetch_data(fx, ctx),
            Scenario::SuperheroTable => apps::superhero_table(fx, ctx),
            Scenario::RedirectChain => apps::redirect_chain(fx, ctx),
            Scenario::ProductImage => shop::product_image(fx, ctx),
            Scenario::Alerts => demo_site::alerts(fx, ctx),
            Scenario::FileDownload => demo_site::file_download(fx, ctx),
            Scenario::FileUpload => demo_site::file_upload(fx, ctx),
            Scenario::DragAndDrop => demo_site::drag_and_drop(fx, ctx),
            Scenario::DynamicTableExport => exports::dynamic_table_export(fx, ctx),
            Scenario::StaticTableExport => exports::static_table_export(fx, ctx),
            Scenario::EmailVerification => mail::email_verification(fx, ctx),
        }
    }
}
