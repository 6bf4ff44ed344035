//! Single-purpose playground apps: covered elements, the onboarding modal,
//! fetched posts, the superhero table and the redirect chain.

use crate::browser::driver::Action;
use crate::browser::query::ElementQuery;
use crate::error::Result;
use crate::page::{PageContext, open_playground_section};

const COVERED_HEADING: &str = r#"//h3[text()="Covered Elements"]"#;
const COVERED_INSTRUCTION: &str = r#"//p[text()="Click the button below"]"#;
const FUGITIVE_LINK: &str = r#"//a[@id="fugitive"]"#;

const ONBOARDING_HEADING: &str = r#"//h3[text()="Onboarding Modal Popup"]"#;
const MODAL_MENU_BUTTON: &str = r#"//label[@class="menu-btn"]"#;
const MODAL_WELCOME: &str = r#"//a[text()="Welcome on board!"]"#;
const MODAL_TITLE: &str = r#"//div[@class="title"]"#;

const FETCH_HEADING: &str = r#"//h3[text()="Fetching Data"]"#;
const POST_CARD: &str = ".icard";

const HEROES_HEADING: &str = r#"//h3[text()="Dynamic Table"]"#;
const HEROES_HEADER: &str = "text=SUPERHERO";
const REAL_NAME_COLUMN: usize = 2;

const REDIRECT_HEADING: &str = r#"//h3[text()="Redirect Chain"]"#;
const REDIRECT_START: &str = r#"//a[text()="Start Redirect chain"]"#;
const REDIRECT_BACK: &str = r#"//a[text()="Go Back"]"#;

// ============================================================================
// Covered elements
// ============================================================================

pub struct CoveredElementsPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> CoveredElementsPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        CoveredElementsPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, COVERED_HEADING, COVERED_INSTRUCTION)
    }

    pub fn instruction_visible(&mut self) -> Result<bool> {
        self.ctx.is_visible_now(&ElementQuery::new(COVERED_INSTRUCTION))
    }

    /// Scroll the link that hides behind other content into view.
    pub fn reveal_fugitive_link(&mut self) -> Result<bool> {
        let link = ElementQuery::new(FUGITIVE_LINK);
        self.ctx.perform("reveal fugitive link", &link, &Action::ScrollIntoView)?;
        let within = self.ctx.timeouts().visibility();
        self.ctx.is_visible(&link, within)
    }
}

// ============================================================================
// Onboarding modal
// ============================================================================

pub struct OnboardingModalPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> OnboardingModalPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        OnboardingModalPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, ONBOARDING_HEADING, MODAL_MENU_BUTTON)
    }

    pub fn show_modal(&mut self) -> Result<()> {
        self.ctx
            .click("show onboarding modal", &ElementQuery::new(MODAL_MENU_BUTTON))?;
        self.ctx
            .expect_visible("show onboarding modal", &ElementQuery::new(MODAL_TITLE))
    }

    pub fn welcome_visible(&mut self) -> Result<bool> {
        self.ctx.is_visible_now(&ElementQuery::new(MODAL_WELCOME))
    }

    pub fn title(&mut self) -> Result<String> {
        self.ctx
            .text("read modal title", &ElementQuery::new(MODAL_TITLE))
    }
}

// ============================================================================
// Fetching data
// ============================================================================

pub struct FetchDataPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> FetchDataPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        FetchDataPage { ctx }
    }

    /// Open the section and wait for the first fetched post.
    pub fn open(&mut self) -> Result<()> {
        let url = self.ctx.config().sites.playground.clone();
        self.ctx.open(&url)?;
        self.ctx.open_section(
            &ElementQuery::new(FETCH_HEADING),
            &ElementQuery::new(POST_CARD).first(),
        )
    }

    pub fn post_count(&mut self) -> Result<usize> {
        self.ctx.count(&ElementQuery::new(POST_CARD))
    }

    pub fn post_texts(&mut self) -> Result<Vec<String>> {
        self.ctx.texts(&ElementQuery::new(POST_CARD))
    }
}

// ============================================================================
// Superhero table
// ============================================================================

/// The playground's dynamic table. Rows are shuffled on every load, so rows
/// are found by the hero's name rather than by position.
pub struct SuperheroTablePage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> SuperheroTablePage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        SuperheroTablePage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, HEROES_HEADING, HEROES_HEADER)
    }

    pub fn real_name(&mut self, hero: &str) -> Result<String> {
        let row = ElementQuery::new(format!(r#"text="{}" >> xpath=../../../.."#, hero));
        let cell = row.child("td").nth(REAL_NAME_COLUMN);
        let name = self.ctx.text(&format!("read real name of {}", hero), &cell)?;
        Ok(name.trim().to_string())
    }
}

// ============================================================================
// Redirect chain
// ============================================================================

pub struct RedirectChainPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> RedirectChainPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        RedirectChainPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, REDIRECT_HEADING, REDIRECT_START)
    }

    pub fn start(&mut self) -> Result<()> {
        self.ctx
            .click("start redirect chain", &ElementQuery::new(REDIRECT_START))
    }

    /// Wait for the browser to pass through each page of the chain in turn.
    pub fn follow(&mut self, pages: &[String]) -> Result<()> {
        for slug in pages {
            self.ctx.wait_for_url(slug)?;
        }
        Ok(())
    }

    pub fn expect_last_page(&mut self, text: &str) -> Result<()> {
        let message = ElementQuery::new(format!(r#"//h2[contains(text(),"{}")]"#, text));
        self.ctx.expect_visible("reach last redirect page", &message)
    }

    pub fn go_back(&mut self) -> Result<()> {
        self.ctx
            .click("go back to chain start", &ElementQuery::new(REDIRECT_BACK))?;
        self.ctx
            .expect_visible("go back to chain start", &ElementQuery::new(REDIRECT_START))
    }

    pub fn url(&mut self) -> Result<String> {
        self.ctx.url()
    }
}
