//! Sign-up on the screener site and the disposable webmail inbox that
//! receives its confirmation email.

use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::browser::driver::{Action, LoadState};
use crate::browser::query::{ElementQuery, FrameScope};
use crate::error::Result;
use crate::fixture::config::Sites;
use crate::flow::poll::{Observer, RefreshStrategy, Refreshed};
use crate::page::PageContext;

const GET_FREE_ACCOUNT: &str = r#"//a[text()="Get free account"]"#;
const EMAIL: &str = r#"//input[@name="email"]"#;
const CONFIRM_EMAIL: &str = r#"//input[@name="email2"]"#;
const PASSWORD: &str = r#"//input[@name="password"]"#;
const SUBMIT: &str = r#"//button[@type="submit"]"#;
const REGISTERED_MARKER: &str = r#"//p[text()="Add companies to watchlist"]"#;

const INBOX_LOGIN: &str = "#login";
const INBOX_FRAME: &str = "#ifinbox";
const MAIL_FRAME: &str = "#ifmail";
const MESSAGE_ROW: &str = "div.m";
const REFRESH_CONTROLS: [&str; 3] = ["button.refresh", "#refresh", "i.fa.fa-refresh"];

/// A throwaway mailbox address on the webmail domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
    pub inbox: String,
    pub domain: String,
}

impl MailAddress {
    /// A fresh address that no other run has used.
    pub fn unique(prefix: &str, domain: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        MailAddress {
            inbox: format!("{}_{}", prefix, &suffix[..12]),
            domain: domain.to_string(),
        }
    }

    pub fn email(&self) -> String {
        format!("{}@{}", self.inbox, self.domain)
    }
}

// ============================================================================
// Sign-up
// ============================================================================

pub struct SignupPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> SignupPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        SignupPage { ctx }
    }

    /// Create an account and wait for the post-registration landing page.
    pub fn register(&mut self, address: &MailAddress, password: &str) -> Result<()> {
        let url = Sites::join(&self.ctx.config().sites.signup, "home/");
        self.ctx.open(&url)?;
        let operation = "register account";
        self.ctx.click(operation, &ElementQuery::new(GET_FREE_ACCOUNT))?;
        let email = address.email();
        self.ctx.fill(operation, &ElementQuery::new(EMAIL), &email)?;
        self.ctx.fill(operation, &ElementQuery::new(CONFIRM_EMAIL), &email)?;
        self.ctx.fill(operation, &ElementQuery::new(PASSWORD), password)?;
        self.ctx.click(operation, &ElementQuery::new(SUBMIT))?;
        self.ctx.expect_visible(operation, &ElementQuery::new(REGISTERED_MARKER))?;
        info!(email = %email, "account registered");
        Ok(())
    }
}

// ============================================================================
// Inbox
// ============================================================================

pub struct InboxPage<'a> {
    ctx: PageContext<'a>,
    inbox: Option<String>,
}

impl<'a> InboxPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        InboxPage { ctx, inbox: None }
    }

    pub fn open_inbox(&mut self, inbox: &str) -> Result<()> {
        let url = self.ctx.config().sites.webmail.clone();
        self.ctx.open(&url)?;
        let login = ElementQuery::new(INBOX_LOGIN);
        self.ctx.fill("open inbox", &login, inbox)?;
        self.ctx.perform("open inbox", &login, &Action::press("Enter"))?;
        self.ctx.wait_for_load(LoadState::DomContentLoaded)?;
        self.inbox = Some(inbox.to_string());
        Ok(())
    }

    /// Look once for a message from `sender`; open it and return its body.
    pub fn find_message(&mut self, sender: &str, within: Duration) -> Result<Option<String>> {
        let row = FrameScope::root()
            .frame(INBOX_FRAME)
            .locator(MESSAGE_ROW)
            .with_text(sender)
            .first();
        if !self.ctx.is_visible(&row, within)? {
            return Ok(None);
        }
        self.ctx.click("open message", &row)?;
        let body = FrameScope::root().frame(MAIL_FRAME).locator("body");
        self.ctx.expect_visible("open message", &body)?;
        self.ctx.text("read message", &body).map(Some)
    }

    pub fn refresh_strategy(&self) -> RefreshStrategy {
        let webmail = &self.ctx.config().sites.webmail;
        let fallback = match &self.inbox {
            Some(inbox) => format!("{}?{}", webmail, inbox),
            None => webmail.clone(),
        };
        RefreshStrategy::new(REFRESH_CONTROLS.iter().map(|s| ElementQuery::new(*s)).collect(), fallback)
    }

    /// An observer that waits for a message from `sender` in this inbox.
    pub fn watch_for<'p>(&'p mut self, sender: &str) -> InboxWatch<'p, 'a> {
        let refresh = self.refresh_strategy();
        InboxWatch {
            inbox: self,
            sender: sender.to_string(),
            refresh,
        }
    }
}

pub struct InboxWatch<'p, 'a> {
    inbox: &'p mut InboxPage<'a>,
    sender: String,
    refresh: RefreshStrategy,
}

impl Observer for InboxWatch<'_, '_> {
    type Output = String;

    fn observe(&mut self, timeout: Duration) -> Result<Option<String>> {
        self.inbox.find_message(&self.sender, timeout)
    }

    fn refresh(&mut self) -> Result<Refreshed> {
        let how = self.refresh.apply(&mut self.inbox.ctx)?;
        // Let the inbox frame repopulate before the next look
        let settle = self.inbox.ctx.timeouts().settle();
        let first_row = FrameScope::root().frame(INBOX_FRAME).locator("div").first();
        match self.inbox.ctx.is_visible(&first_row, settle) {
            Ok(_) => Ok(how),
            Err(e) if e.is_timeout() => Ok(how),
            Err(e) => Err(e),
        }
    }
}
