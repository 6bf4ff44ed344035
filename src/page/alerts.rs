use crate::browser::driver::{DialogResponse, EventKind, EventOutcome};
use crate::browser::query::ElementQuery;
use crate::error::{HarnessError, Result};
use crate::fixture::config::Sites;
use crate::page::PageContext;

const SWITCH_TO: &str = r#"//a[text()="SwitchTo"]"#;
const ALERTS: &str = r#"//a[text()="Alerts"]"#;
const OK_TAB: &str = r#"//a[normalize-space(text())="Alert with OK"]"#;
const OK_BUTTON: &str = "#OKTab button";
const CONFIRM_TAB: &str = r#"//a[normalize-space(text())="Alert with OK & Cancel"]"#;
const CONFIRM_BUTTON: &str = "#CancelTab button";
const PROMPT_TAB: &str = r#"//a[normalize-space(text())="Alert with Textbox"]"#;
const PROMPT_BUTTON: &str = "#Textbox button";
const RESULT: &str = "#demo";
const PROMPT_RESULT: &str = "#demo1";

/// A native dialog as the page raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSeen {
    pub dialog_type: String,
    pub message: String,
}

/// Alert, confirm and prompt dialogs on the automation demo site.
pub struct AlertsPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> AlertsPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        AlertsPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        let url = Sites::join(&self.ctx.config().sites.automation_demo, "Windows.html");
        self.ctx.open(&url)?;
        self.ctx.click("open alerts", &ElementQuery::new(SWITCH_TO))?;
        self.ctx.click("open alerts", &ElementQuery::new(ALERTS))?;
        self.ctx.expect_visible("open alerts", &ElementQuery::new(OK_TAB))
    }

    /// Raise the plain alert and accept it.
    pub fn accept_alert(&mut self) -> Result<DialogSeen> {
        self.raise("accept alert", OK_TAB, OK_BUTTON, DialogResponse::Accept)
    }

    /// Raise the confirm dialog and accept or dismiss it.
    pub fn answer_confirm(&mut self, accept: bool) -> Result<DialogSeen> {
        let answer = if accept {
            DialogResponse::Accept
        } else {
            DialogResponse::Dismiss
        };
        self.raise("answer confirm", CONFIRM_TAB, CONFIRM_BUTTON, answer)
    }

    /// Raise the prompt; `Some(text)` accepts with that input, `None` dismisses.
    pub fn answer_prompt(&mut self, input: Option<&str>) -> Result<DialogSeen> {
        let answer = match input {
            Some(text) => DialogResponse::AcceptWith { text: text.to_string() },
            None => DialogResponse::Dismiss,
        };
        self.raise("answer prompt", PROMPT_TAB, PROMPT_BUTTON, answer)
    }

    /// Text the page wrote after the confirm dialog closed.
    pub fn confirm_result(&mut self) -> Result<String> {
        self.ctx.text("read confirm result", &ElementQuery::new(RESULT))
    }

    /// Text the page wrote after the prompt closed.
    pub fn prompt_result(&mut self) -> Result<String> {
        self.ctx.text("read prompt result", &ElementQuery::new(PROMPT_RESULT))
    }

    fn raise(&mut self, operation: &str, tab: &str, button: &str, answer: DialogResponse) -> Result<DialogSeen> {
        self.ctx.click(operation, &ElementQuery::new(tab))?;
        let wait = self.ctx.timeouts().action();
        let outcome = self
            .ctx
            .click_expecting(operation, &ElementQuery::new(button), EventKind::Dialog { answer }, wait)?;
        match outcome {
            EventOutcome::Dialog { dialog_type, message } => Ok(DialogSeen { dialog_type, message }),
            other => Err(HarnessError::Driver {
                command: operation.to_string(),
                error: format!("expected a dialog, got {:?}", other),
            }),
        }
    }
}
