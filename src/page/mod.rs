//! Page abstractions: one struct per logical page or section, exposing
//! intention-revealing operations over a [`PageContext`].
//!
//! Every operation performs one logical user action and waits for the state
//! it produces before returning. A driver timeout inside an operation is
//! reported as [`HarnessError::ElementNotReady`] naming the operation and the
//! state it was waiting for.

use std::time::Duration;

use tracing::debug;

use crate::browser::driver::{Action, Driver, ElementState, EventKind, EventOutcome, LoadState, PageId};
use crate::browser::event::{self, Expectation};
use crate::browser::query::ElementQuery;
use crate::error::{HarnessError, Result};
use crate::fixture::config::{HarnessConfig, Timeouts};

pub mod alerts;
pub mod drag_drop;
pub mod files;
pub mod mailbox;
pub mod menus;
pub mod misc;
pub mod products;
pub mod sortable;
pub mod table_export;
pub mod widgets;
pub mod windows;

/// A page opened as a side effect of an action (new tab, popup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHandle {
    pub id: PageId,
    pub url: String,
}

/// Map a driver timeout onto the operation that was waiting.
pub fn ready<T>(operation: &str, expected: &str, result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        if e.is_timeout() {
            HarnessError::not_ready(operation, expected)
        } else {
            e
        }
    })
}

/// Open the playground landing page and enter one of its app sections.
pub(crate) fn open_playground_section(ctx: &mut PageContext<'_>, heading: &str, marker: &str) -> Result<()> {
    let url = ctx.config().sites.playground.clone();
    ctx.open(&url)?;
    ctx.open_section(&ElementQuery::new(heading), &ElementQuery::new(marker))
}

/// One page of one session, plus the run's configuration.
pub struct PageContext<'a> {
    driver: &'a mut dyn Driver,
    page: PageId,
    config: &'a HarnessConfig,
}

impl<'a> PageContext<'a> {
    pub fn new(driver: &'a mut dyn Driver, page: PageId, config: &'a HarnessConfig) -> Self {
        PageContext { driver, page, config }
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn config(&self) -> &HarnessConfig {
        self.config
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.config.timeouts
    }

    pub fn driver(&mut self) -> &mut dyn Driver {
        &mut *self.driver
    }

    /// The same session, pointed at another page.
    pub fn on(&mut self, page: PageId) -> PageContext<'_> {
        PageContext {
            driver: &mut *self.driver,
            page,
            config: self.config,
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn open(&mut self, url: &str) -> Result<()> {
        self.open_until(url, LoadState::Load)
    }

    pub fn open_until(&mut self, url: &str, state: LoadState) -> Result<()> {
        debug!(page = self.page.0, url, "open");
        let timeout = self.timeouts().navigation();
        let result = self.driver.goto(self.page, url, state, timeout);
        ready(&format!("open {}", url), state_label(state), result)
    }

    pub fn wait_for_load(&mut self, state: LoadState) -> Result<()> {
        let timeout = self.timeouts().navigation();
        let result = self.driver.wait_for_load(self.page, state, timeout);
        ready("wait for load", state_label(state), result)
    }

    pub fn wait_for_url(&mut self, fragment: &str) -> Result<()> {
        let timeout = self.timeouts().navigation();
        let result = self.driver.wait_for_url(self.page, fragment, timeout);
        ready("wait for url", &format!("url containing {:?}", fragment), result)
    }

    pub fn url(&mut self) -> Result<String> {
        self.driver.current_url(self.page)
    }

    /// Click a section heading on a landing page and wait for the section's
    /// marker element.
    pub fn open_section(&mut self, heading: &ElementQuery, marker: &ElementQuery) -> Result<()> {
        let operation = format!("open section {}", heading);
        self.perform(&operation, heading, &Action::ScrollIntoView)?;
        self.perform(&operation, heading, &Action::click())?;
        self.expect_visible(&operation, marker)
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub fn perform(&mut self, operation: &str, target: &ElementQuery, action: &Action) -> Result<()> {
        debug!(page = self.page.0, operation, action = action.name(), target = %target, "act");
        let timeout = self.timeouts().action();
        let result = self.driver.act(self.page, target, action, timeout);
        ready(operation, &format!("{} to be actionable", target), result)
    }

    pub fn click(&mut self, operation: &str, target: &ElementQuery) -> Result<()> {
        self.perform(operation, target, &Action::click())
    }

    pub fn fill(&mut self, operation: &str, target: &ElementQuery, value: &str) -> Result<()> {
        self.perform(operation, target, &Action::fill(value))
    }

    // ------------------------------------------------------------------
    // State waits
    // ------------------------------------------------------------------

    pub fn wait_for(&mut self, operation: &str, target: &ElementQuery, state: ElementState) -> Result<()> {
        let timeout = self.timeouts().visibility();
        let result = self.driver.wait_for(self.page, target, state, timeout);
        ready(operation, &format!("{} {}", target, state.as_str()), result)
    }

    pub fn expect_visible(&mut self, operation: &str, target: &ElementQuery) -> Result<()> {
        self.wait_for(operation, target, ElementState::Visible)
    }

    pub fn expect_hidden(&mut self, operation: &str, target: &ElementQuery) -> Result<()> {
        self.wait_for(operation, target, ElementState::Hidden)
    }

    pub fn expect_attribute(&mut self, operation: &str, target: &ElementQuery, name: &str, value: &str) -> Result<()> {
        let timeout = self.timeouts().visibility();
        let result = self.driver.wait_for_attribute(self.page, target, name, value, timeout);
        ready(operation, &format!("{} {}={:?}", target, name, value), result)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn is_visible(&mut self, target: &ElementQuery, timeout: Duration) -> Result<bool> {
        self.driver.is_visible(self.page, target, timeout)
    }

    /// Visible right now, without waiting.
    pub fn is_visible_now(&mut self, target: &ElementQuery) -> Result<bool> {
        self.driver.is_visible(self.page, target, Duration::ZERO)
    }

    pub fn text(&mut self, operation: &str, target: &ElementQuery) -> Result<String> {
        let timeout = self.timeouts().visibility();
        let text = self.driver.text(self.page, target, timeout)?;
        text.ok_or_else(|| HarnessError::not_ready(operation, format!("{} to have text", target)))
    }

    pub fn texts(&mut self, target: &ElementQuery) -> Result<Vec<String>> {
        self.driver.all_texts(self.page, target)
    }

    pub fn attributes(&mut self, target: &ElementQuery, name: &str) -> Result<Vec<Option<String>>> {
        self.driver.all_attributes(self.page, target, name)
    }

    pub fn count(&mut self, target: &ElementQuery) -> Result<usize> {
        self.driver.count(self.page, target)
    }

    pub fn attribute(&mut self, target: &ElementQuery, name: &str) -> Result<Option<String>> {
        let timeout = self.timeouts().action();
        self.driver.attribute(self.page, target, name, timeout)
    }

    pub fn input_value(&mut self, operation: &str, target: &ElementQuery) -> Result<String> {
        let timeout = self.timeouts().action();
        let result = self.driver.input_value(self.page, target, timeout);
        ready(operation, &format!("{} to accept input", target), result)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register a one-shot listener on this page.
    pub fn expect(&mut self, kind: EventKind) -> Result<Expectation<'_, dyn Driver + 'a>> {
        event::expect(&mut *self.driver, self.page, kind)
    }

    /// Register a listener for `kind`, click `target`, and wait for the event.
    pub fn click_expecting(
        &mut self,
        operation: &str,
        target: &ElementQuery,
        kind: EventKind,
        wait: Duration,
    ) -> Result<EventOutcome> {
        let page = self.page;
        let action_timeout = self.timeouts().action();
        let expected = format!("{} event", kind.name());
        let pending = self.expect(kind)?;
        let outcome = pending.trigger(wait, |driver| {
            ready(
                operation,
                &format!("{} to be actionable", target),
                driver.act(page, target, &Action::click(), action_timeout),
            )
        });
        ready(operation, &expected, outcome)
    }
}

fn state_label(state: LoadState) -> &'static str {
    match state {
        LoadState::Load => "load",
        LoadState::DomContentLoaded => "domcontentloaded",
        LoadState::NetworkIdle => "networkidle",
    }
}
