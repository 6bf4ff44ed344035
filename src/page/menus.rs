//! Playground apps built around menus: the right-click context menu and the
//! multi level dropdown.

use crate::browser::driver::Action;
use crate::browser::query::ElementQuery;
use crate::error::Result;
use crate::page::{PageContext, open_playground_section};

const CONTEXT_HEADING: &str = r#"//h3[text()="Right-Click Context Menu"]"#;
const CONTEXT_AREA: &str = "#contextArea";
const MENU_ITEM: &str = ".menu-item";
const CONTEXT_MESSAGE: &str = "#msg";

const DROPDOWN_HEADING: &str = r#"//h3[text()="Multi Level Dropdown"]"#;
const DROPDOWN_TOGGLE: &str = r##"//a[@href="#home"]//*[name()="svg" and @viewBox="0 0 320 512"]"##;
const MY_PROFILE: &str = r##"//a[@href="#undefined"]"##;
const SETTINGS_ENTRY: &str = r#"//a[text()="Settings"]"#;
const ANIMALS_ENTRY: &str = r##"//a[@href="#animals"]"##;
const SETTINGS_TITLE: &str = r#"//h2[text()="My Tutorial"]"#;
const ANIMALS_TITLE: &str = r#"//h2[text()="Animals"]"#;

// ============================================================================
// Right-click context menu
// ============================================================================

pub struct ContextMenuPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> ContextMenuPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        ContextMenuPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, CONTEXT_HEADING, CONTEXT_AREA)
    }

    fn menu_item(name: &str) -> ElementQuery {
        ElementQuery::new(format!("{} >> text={}", MENU_ITEM, name))
    }

    fn open_menu(&mut self) -> Result<()> {
        let area = ElementQuery::new(CONTEXT_AREA);
        self.ctx.expect_visible("open context menu", &area)?;
        self.ctx.perform("open context menu", &area, &Action::right_click())
    }

    fn click_item(&mut self, name: &str) -> Result<String> {
        let operation = format!("choose {:?}", name);
        let item = Self::menu_item(name);
        self.ctx.expect_visible(&operation, &item)?;
        self.ctx.perform(&operation, &item, &Action::force_click())?;
        self.message()
    }

    /// Right-click the area, pick a top-level item, and return the message.
    pub fn choose(&mut self, item: &str) -> Result<String> {
        self.open_menu()?;
        self.click_item(item)
    }

    /// Right-click the area, hover `parent` to reveal its submenu, pick `item`.
    pub fn choose_from_submenu(&mut self, parent: &str, item: &str) -> Result<String> {
        self.open_menu()?;
        let operation = format!("open submenu {:?}", parent);
        let parent = Self::menu_item(parent);
        self.ctx.expect_visible(&operation, &parent)?;
        self.ctx.perform(&operation, &parent, &Action::Hover)?;
        self.click_item(item)
    }

    pub fn message(&mut self) -> Result<String> {
        self.ctx
            .text("read context menu message", &ElementQuery::new(CONTEXT_MESSAGE))
    }
}

// ============================================================================
// Multi level dropdown
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submenu {
    Settings,
    Animals,
}

impl Submenu {
    fn entry(self) -> &'static str {
        match self {
            Submenu::Settings => SETTINGS_ENTRY,
            Submenu::Animals => ANIMALS_ENTRY,
        }
    }

    /// The submenu's title, which also leads back to the main menu.
    fn title(self) -> &'static str {
        match self {
            Submenu::Settings => SETTINGS_TITLE,
            Submenu::Animals => ANIMALS_TITLE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Submenu::Settings => "settings",
            Submenu::Animals => "animals",
        }
    }
}

pub struct MultiDropdownPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> MultiDropdownPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        MultiDropdownPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, DROPDOWN_HEADING, DROPDOWN_TOGGLE)
    }

    pub fn toggle_visible(&mut self) -> Result<bool> {
        self.ctx.is_visible_now(&ElementQuery::new(DROPDOWN_TOGGLE))
    }

    /// Expand the dropdown and wait for its three main entries.
    pub fn expand(&mut self) -> Result<()> {
        self.ctx
            .click("expand dropdown", &ElementQuery::new(DROPDOWN_TOGGLE))?;
        for entry in [MY_PROFILE, SETTINGS_ENTRY, ANIMALS_ENTRY] {
            self.ctx
                .expect_visible("expand dropdown", &ElementQuery::new(entry))?;
        }
        Ok(())
    }

    pub fn enter(&mut self, submenu: Submenu) -> Result<()> {
        let operation = format!("open {} submenu", submenu.label());
        self.ctx.click(&operation, &ElementQuery::new(submenu.entry()))?;
        self.ctx
            .expect_visible(&operation, &ElementQuery::new(submenu.title()))
    }

    /// Options from `expected` that are not shown.
    pub fn missing_options(&mut self, expected: &[String]) -> Result<Vec<String>> {
        let within = self.ctx.timeouts().visibility();
        let mut missing = Vec::new();
        for option in expected {
            let link = ElementQuery::new(format!(r#"//a[text()="{}"]"#, option));
            if !self.ctx.is_visible(&link, within)? {
                missing.push(option.clone());
            }
        }
        Ok(missing)
    }

    pub fn back(&mut self, submenu: Submenu) -> Result<()> {
        let operation = format!("leave {} submenu", submenu.label());
        self.ctx.click(&operation, &ElementQuery::new(submenu.title()))?;
        self.ctx
            .expect_visible(&operation, &ElementQuery::new(SETTINGS_ENTRY))
    }
}
