//! Playground apps that open extra windows or nest frames.

use crate::browser::driver::{Action, EventKind, EventOutcome};
use crate::browser::query::{ElementQuery, FrameScope};
use crate::error::{HarnessError, Result};
use crate::page::{PageContext, PageHandle, open_playground_section};

const NEW_TAB_HEADING: &str = r#"//h3[text()="New Tab"]"#;
const OPEN_NEW_TAB: &str = r#"//a[text()="Open New Tab"]"#;
const NEW_TAB_HEADER: &str = "h1";

const POPUP_HEADING: &str = r#"//h3[text()="Pop-Up Window"]"#;
const POPUP_INFO: &str = r#"//p[@id="info"]"#;
const POPUP_OPEN: &str = r#"//a[text()="Open"]"#;
const POPUP_SUBMIT: &str = r#"//button[text()="Submit"]"#;

const NESTED_HEADING: &str = r#"//h3[text()="Nested Iframe"]"#;
const OUTER_FRAME: &str = "#frame1";
const INNER_FRAME: &str = "#frame2";
const FRAME_BUTTON: &str = "text=Click Me";
const FRAME_MESSAGE: &str = "#msg";

fn opened_page(operation: &str, outcome: EventOutcome) -> Result<PageHandle> {
    match outcome {
        EventOutcome::Page { page, url } => Ok(PageHandle { id: page, url }),
        other => Err(HarnessError::Driver {
            command: operation.to_string(),
            error: format!("expected a new page, got {:?}", other),
        }),
    }
}

// ============================================================================
// New tab
// ============================================================================

pub struct NewTabPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> NewTabPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        NewTabPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, NEW_TAB_HEADING, OPEN_NEW_TAB)
    }

    /// Click the link and wait for the tab it opens to finish loading.
    pub fn open_new_tab(&mut self) -> Result<PageHandle> {
        let wait = self.ctx.timeouts().navigation();
        let outcome = self
            .ctx
            .click_expecting("open new tab", &ElementQuery::new(OPEN_NEW_TAB), EventKind::Page, wait)?;
        opened_page("open new tab", outcome)
    }

    /// Main header of a tab opened by [`open_new_tab`](Self::open_new_tab).
    pub fn tab_header(&mut self, tab: &PageHandle) -> Result<String> {
        self.ctx
            .on(tab.id)
            .text("read new tab header", &ElementQuery::new(NEW_TAB_HEADER).first())
    }

    pub fn close_tab(&mut self, tab: &PageHandle) -> Result<()> {
        self.ctx.driver().close_page(tab.id)
    }
}

// ============================================================================
// Pop-up window
// ============================================================================

pub struct PopupPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> PopupPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        PopupPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, POPUP_HEADING, POPUP_INFO)
    }

    /// Open the pop-up, press its submit button, and wait until it closes.
    pub fn submit_popup(&mut self) -> Result<PageHandle> {
        let wait = self.ctx.timeouts().navigation();
        let outcome = self
            .ctx
            .click_expecting("open pop-up", &ElementQuery::new(POPUP_OPEN), EventKind::Page, wait)?;
        let popup = opened_page("open pop-up", outcome)?;

        let mut window = self.ctx.on(popup.id);
        let submit = ElementQuery::new(POPUP_SUBMIT);
        window.expect_visible("submit pop-up", &submit)?;
        window.click_expecting("submit pop-up", &submit, EventKind::Close, wait)?;
        Ok(popup)
    }

    pub fn info_text(&mut self) -> Result<String> {
        self.ctx.text("read pop-up info", &ElementQuery::new(POPUP_INFO))
    }
}

// ============================================================================
// Nested iframe
// ============================================================================

pub struct NestedFramePage<'a> {
    ctx: PageContext<'a>,
    scope: FrameScope,
}

impl<'a> NestedFramePage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        NestedFramePage {
            ctx,
            scope: FrameScope::root().frame(OUTER_FRAME).frame(INNER_FRAME),
        }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, NESTED_HEADING, OUTER_FRAME)
    }

    pub fn click_button(&mut self) -> Result<()> {
        let button = self.scope.locator(FRAME_BUTTON);
        self.ctx.perform("click nested frame button", &button, &Action::click())
    }

    /// Message shown in the inner frame after the click.
    pub fn message(&mut self) -> Result<String> {
        let message = self.scope.locator(FRAME_MESSAGE);
        self.ctx.expect_visible("read nested frame message", &message)?;
        self.ctx.text("read nested frame message", &message)
    }
}
