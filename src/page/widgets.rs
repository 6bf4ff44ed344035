//! Small single-section apps on the QA playground.

use std::time::Duration;

use crate::browser::driver::{Action, ElementState};
use crate::browser::query::ElementQuery;
use crate::error::{HarnessError, Result};
use crate::page::{PageContext, open_playground_section};

/// Most tags the input box accepts.
pub const TAG_LIMIT: usize = 10;

const TAGS_HEADING: &str = r#"//h3[text()="Tags Input Box"]"#;
const TAGS_INPUT: &str = r#"//input[@type="text"]"#;
const TAG: &str = ".tag";
const REMOVE_ALL: &str = r#"button:text("Remove All")"#;

const VERIFY_CARD: &str = r#"//h3[text()="Verify Your Account"]"#;
const VERIFY_HEADING: &str = r#"h2:text("Verify Your Account")"#;
const CODE_FIELD: &str = ".code";
const VERIFY_SUCCESS: &str = r#"//small[text()="Success"]"#;
const KEY_DELAY_MS: u64 = 100;

const SHADOW_HEADING: &str = r#"//h3[text()="Shadow DOM"]"#;
const SHADOW_BUTTON: &str = "button";
const PROGRESS_BAR: &str = "progress-bar";

const STARS_HEADING: &str = r#"//h3[text()="Stars Rating Widget"]"#;
const STARS: &str = r#"//div[@class="stars"]"#;

// ============================================================================
// Tags input
// ============================================================================

pub struct TagsInputPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> TagsInputPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        TagsInputPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, TAGS_HEADING, TAGS_INPUT)
    }

    pub fn tag_count(&mut self) -> Result<usize> {
        self.ctx.count(&ElementQuery::new(TAG))
    }

    pub fn tags(&mut self) -> Result<Vec<String>> {
        self.ctx.texts(&ElementQuery::new(TAG))
    }

    /// Add one tag. Returns `false` without typing when the box is full.
    pub fn add_tag(&mut self, tag: &str) -> Result<bool> {
        let before = self.tag_count()?;
        if before >= TAG_LIMIT {
            return Ok(false);
        }
        let input = ElementQuery::new(TAGS_INPUT);
        let operation = format!("add tag {:?}", tag);
        self.ctx.fill(&operation, &input, tag)?;
        self.ctx.perform(&operation, &input, &Action::press("Enter"))?;
        self.ctx
            .wait_for(&operation, &ElementQuery::new(TAG).nth(before), ElementState::Attached)?;
        Ok(true)
    }

    /// Clear every tag if the page offers its "Remove All" control.
    pub fn remove_all(&mut self) -> Result<()> {
        let button = ElementQuery::new(REMOVE_ALL);
        if self.ctx.is_visible_now(&button)? {
            self.ctx.click("remove all tags", &button)?;
            self.ctx
                .wait_for("remove all tags", &ElementQuery::new(TAG).first(), ElementState::Detached)?;
        }
        Ok(())
    }
}

// ============================================================================
// Verify account
// ============================================================================

pub struct VerifyAccountPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> VerifyAccountPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        VerifyAccountPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        let url = self.ctx.config().sites.playground.clone();
        self.ctx.open(&url)?;
        let card = ElementQuery::new(VERIFY_CARD);
        self.ctx.expect_visible("open verify account", &card)?;
        self.ctx
            .open_section(&card, &ElementQuery::new(VERIFY_HEADING))
    }

    /// Type the code one digit per box, confirming each box took its digit.
    pub fn enter_code(&mut self, code: &str) -> Result<()> {
        for (i, digit) in code.chars().enumerate() {
            let field = ElementQuery::new(CODE_FIELD).nth(i);
            let operation = format!("enter code digit {}", i + 1);
            self.ctx.perform(&operation, &field, &Action::force_click())?;
            self.ctx.perform(
                &operation,
                &field,
                &Action::Type {
                    text: digit.to_string(),
                    delay_ms: KEY_DELAY_MS,
                },
            )?;
            let value = self.ctx.input_value(&operation, &field)?;
            if value != digit.to_string() {
                return Err(HarnessError::mismatch(
                    format!("code box {}", i + 1),
                    digit,
                    value,
                ));
            }
        }
        Ok(())
    }

    pub fn success_visible(&mut self, within: Duration) -> Result<bool> {
        self.ctx.is_visible(&ElementQuery::new(VERIFY_SUCCESS), within)
    }

    /// The form is still showing its heading (no redirect after a bad code).
    pub fn heading_visible(&mut self) -> Result<bool> {
        self.ctx.is_visible_now(&ElementQuery::new(VERIFY_HEADING))
    }
}

// ============================================================================
// Shadow DOM
// ============================================================================

pub struct ShadowDomPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> ShadowDomPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        ShadowDomPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, SHADOW_HEADING, PROGRESS_BAR)
    }

    /// Press the button inside the component's shadow root.
    pub fn boost(&mut self) -> Result<()> {
        self.ctx.click("boost progress", &ElementQuery::new(SHADOW_BUTTON))
    }

    pub fn expect_progress(&mut self, percent: &str) -> Result<()> {
        self.ctx
            .expect_attribute("read progress", &ElementQuery::new(PROGRESS_BAR), "percent", percent)
    }
}

// ============================================================================
// Stars rating
// ============================================================================

pub struct StarsRatingPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> StarsRatingPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        StarsRatingPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, STARS_HEADING, STARS)
    }

    /// Click star `n` and return the page URL afterwards.
    pub fn rate(&mut self, n: u8) -> Result<String> {
        let star = ElementQuery::new(format!(r#"//label[contains(@class,"star-{}")]"#, n));
        self.ctx.click(&format!("rate {} stars", n), &star)?;
        self.ctx.url()
    }
}
