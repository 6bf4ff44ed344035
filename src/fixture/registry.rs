use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::browser::driver::{Driver, PageId, SessionFactory};
use crate::error::{HarnessError, Result};
use crate::fixture::config::HarnessConfig;
use crate::fixture::data::TestDataSet;
use crate::page::PageContext;
use crate::page::alerts::AlertsPage;
use crate::page::drag_drop::DragAndDropPage;
use crate::page::files::{FileDownloadPage, FileUploadPage};
use crate::page::mailbox::{InboxPage, SignupPage};
use crate::page::menus::{ContextMenuPage, MultiDropdownPage};
use crate::page::misc::{
    CoveredElementsPage, FetchDataPage, OnboardingModalPage, RedirectChainPage, SuperheroTablePage,
};
use crate::page::products::ProductPage;
use crate::page::sortable::SortableListPage;
use crate::page::table_export::{DynamicTablePage, StaticTablePage};
use crate::page::widgets::{ShadowDomPage, StarsRatingPage, TagsInputPage, VerifyAccountPage};
use crate::page::windows::{NestedFramePage, NewTabPage, PopupPage};

/// Name of the page every test starts on.
pub const PRIMARY_PAGE: &str = "main";
/// Secondary page the webmail inbox lives in.
pub const MAIL_PAGE: &str = "mail";

/// Everything one test execution needs, built lazily and torn down once.
///
/// Nothing is launched until a test asks for it: the browser session starts on
/// the first page request, each named page opens on its first use and is then
/// reused, and the download directory is created on first request. Page
/// objects are borrowed views over one named page, so two accessors for the
/// same page drive the same browser tab. Teardown closes every page and ends
/// the session, and also runs on drop, so it happens whether the test passed,
/// failed, or panicked.
pub struct Fixtures {
    test_name: String,
    config: Arc<HarnessConfig>,
    data: Arc<TestDataSet>,
    factory: Arc<dyn SessionFactory>,
    session: Option<Box<dyn Driver>>,
    pages: BTreeMap<String, PageId>,
    downloads: Option<PathBuf>,
    constructed: Vec<&'static str>,
    torn_down: bool,
}

impl Fixtures {
    pub fn new(
        test_name: impl Into<String>,
        config: Arc<HarnessConfig>,
        data: Arc<TestDataSet>,
        factory: Arc<dyn SessionFactory>,
    ) -> Self {
        Fixtures {
            test_name: test_name.into(),
            config,
            data,
            factory,
            session: None,
            pages: BTreeMap::new(),
            downloads: None,
            constructed: Vec::new(),
            torn_down: false,
        }
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn data(&self) -> &TestDataSet {
        &self.data
    }

    pub fn is_launched(&self) -> bool {
        self.session.is_some()
    }

    /// Fixture names in the order they were first requested.
    pub fn constructed(&self) -> &[&'static str] {
        &self.constructed
    }

    /// Names of the pages opened so far.
    pub fn open_pages(&self) -> Vec<&str> {
        self.pages.keys().map(String::as_str).collect()
    }

    fn mark(&mut self, fixture: &'static str) {
        if !self.constructed.contains(&fixture) {
            debug!(test = %self.test_name, fixture, "fixture constructed");
            self.constructed.push(fixture);
        }
    }

    fn session(&mut self) -> Result<&mut Box<dyn Driver>> {
        if self.torn_down {
            return Err(HarnessError::DriverIo(format!(
                "fixtures for {} already torn down",
                self.test_name
            )));
        }
        if self.session.is_none() {
            info!(test = %self.test_name, "launching browser session");
            self.session = Some(self.factory.launch()?);
            self.mark("session");
        }
        self.session
            .as_mut()
            .ok_or_else(|| HarnessError::DriverIo("browser session unavailable".into()))
    }

    /// The page registered under `name`, opening it on first use.
    pub fn page_id(&mut self, name: &str) -> Result<PageId> {
        if let Some(id) = self.pages.get(name) {
            return Ok(*id);
        }
        let id = self.session()?.new_page()?;
        debug!(test = %self.test_name, page = name, id = id.0, "page opened");
        self.pages.insert(name.to_string(), id);
        Ok(id)
    }

    /// A context over the page registered under `name`.
    pub fn context(&mut self, name: &str) -> Result<PageContext<'_>> {
        let page = self.page_id(name)?;
        let driver = self
            .session
            .as_deref_mut()
            .ok_or_else(|| HarnessError::DriverIo("browser session unavailable".into()))?;
        Ok(PageContext::new(driver, page, &self.config))
    }

    /// This test's private download directory, created on first request.
    pub fn downloads_dir(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.downloads {
            return Ok(dir.clone());
        }
        let namespace = format!("{}-{}", slug(&self.test_name), &Uuid::new_v4().simple().to_string()[..8]);
        let dir = self.config.downloads_dir.join(namespace);
        fs::create_dir_all(&dir)?;
        debug!(test = %self.test_name, dir = %dir.display(), "download directory created");
        self.downloads = Some(dir.clone());
        self.mark("downloads");
        Ok(dir)
    }

    // ------------------------------------------------------------------
    // Page objects
    // ------------------------------------------------------------------

    pub fn sortable_list(&mut self) -> Result<SortableListPage<'_>> {
        self.mark("sortable_list");
        Ok(SortableListPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn tags_input(&mut self) -> Result<TagsInputPage<'_>> {
        self.mark("tags_input");
        Ok(TagsInputPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn verify_account(&mut self) -> Result<VerifyAccountPage<'_>> {
        self.mark("verify_account");
        Ok(VerifyAccountPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn shadow_dom(&mut self) -> Result<ShadowDomPage<'_>> {
        self.mark("shadow_dom");
        Ok(ShadowDomPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn stars_rating(&mut self) -> Result<StarsRatingPage<'_>> {
        self.mark("stars_rating");
        Ok(StarsRatingPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn new_tab(&mut self) -> Result<NewTabPage<'_>> {
        self.mark("new_tab");
        Ok(NewTabPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn popup(&mut self) -> Result<PopupPage<'_>> {
        self.mark("popup");
        Ok(PopupPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn nested_frames(&mut self) -> Result<NestedFramePage<'_>> {
        self.mark("nested_frames");
        Ok(NestedFramePage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn context_menu(&mut self) -> Result<ContextMenuPage<'_>> {
        self.mark("context_menu");
        Ok(ContextMenuPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn multi_dropdown(&mut self) -> Result<MultiDropdownPage<'_>> {
        self.mark("multi_dropdown");
        Ok(MultiDropdownPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn covered_elements(&mut self) -> Result<CoveredElementsPage<'_>> {
        self.mark("covered_elements");
        Ok(CoveredElementsPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn onboarding_modal(&mut self) -> Result<OnboardingModalPage<'_>> {
        self.mark("onboarding_modal");
        Ok(OnboardingModalPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn fetch_data(&mut self) -> Result<FetchDataPage<'_>> {
        self.mark("fetch_data");
        Ok(FetchDataPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn superhero_table(&mut self) -> Result<SuperheroTablePage<'_>> {
        self.mark("superhero_table");
        Ok(SuperheroTablePage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn redirect_chain(&mut self) -> Result<RedirectChainPage<'_>> {
        self.mark("redirect_chain");
        Ok(RedirectChainPage::new(self.context(PRIMARY_PAGE)?))
    }

    /// Product, shop and cart views of `product`.
    pub fn product(&mut self, product: &str) -> Result<ProductPage<'_>> {
        self.mark("product");
        Ok(ProductPage::new(self.context(PRIMARY_PAGE)?, product))
    }

    pub fn alerts(&mut self) -> Result<AlertsPage<'_>> {
        self.mark("alerts");
        Ok(AlertsPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn file_download(&mut self) -> Result<FileDownloadPage<'_>> {
        self.mark("file_download");
        Ok(FileDownloadPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn file_upload(&mut self) -> Result<FileUploadPage<'_>> {
        self.mark("file_upload");
        Ok(FileUploadPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn drag_and_drop(&mut self) -> Result<DragAndDropPage<'_>> {
        self.mark("drag_and_drop");
        Ok(DragAndDropPage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn dynamic_table(&mut self) -> Result<DynamicTablePage<'_>> {
        self.mark("dynamic_table");
        Ok(DynamicTablePage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn static_table(&mut self) -> Result<StaticTablePage<'_>> {
        self.mark("static_table");
        Ok(StaticTablePage::new(self.context(PRIMARY_PAGE)?))
    }

    pub fn signup(&mut self) -> Result<SignupPage<'_>> {
        self.mark("signup");
        Ok(SignupPage::new(self.context(PRIMARY_PAGE)?))
    }

    /// The webmail inbox, on its own page of the same session. It shares the
    /// session's cookies and storage with the sign-up page.
    pub fn inbox(&mut self) -> Result<InboxPage<'_>> {
        self.mark("inbox");
        Ok(InboxPage::new(self.context(MAIL_PAGE)?))
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Close every page and end the session. Safe to call more than once;
    /// the first error is returned after all cleanup has been attempted.
    pub fn teardown(&mut self) -> Result<()> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;
        let mut first_error = None;

        if let Some(mut session) = self.session.take() {
            for (name, id) in std::mem::take(&mut self.pages) {
                if let Err(e) = session.close_page(id) {
                    warn!(test = %self.test_name, page = %name, error = %e, "failed to close page");
                    first_error.get_or_insert(e);
                }
            }
            if let Err(e) = session.quit() {
                warn!(test = %self.test_name, error = %e, "failed to end browser session");
                first_error.get_or_insert(e);
            }
            info!(test = %self.test_name, "fixtures torn down");
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for Fixtures {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            warn!(test = %self.test_name, error = %e, "teardown failed");
        }
    }
}

/// Lowercase, filesystem-safe form of a test name.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "test".to_string()
    } else {
        trimmed.to_string()
    }
}
