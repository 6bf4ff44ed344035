//! Page-object UI test orchestration over a Playwright-backed browser driver.
//!
//! Tests are written against page objects ([`page`]) composed per test by a
//! lazy fixture registry ([`fixture`]). Two control-flow primitives sit above
//! single operations: bounded polling with a refresh fallback and stepwise
//! list convergence ([`flow`]). Exported files are captured and checked
//! against the UI by [`export`]. Canonical behaviours live in [`scenario`] and
//! run in parallel through [`suite`].

pub mod browser;
pub mod cli;
pub mod error;
pub mod export;
pub mod fixture;
pub mod flow;
pub mod page;
pub mod report;
pub mod scenario;
pub mod suite;

pub use error::{HarnessError, Result};
