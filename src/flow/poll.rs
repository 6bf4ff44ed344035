use std::time::Duration;

use tracing::{debug, info, warn};

use crate::browser::driver::LoadState;
use crate::browser::query::ElementQuery;
use crate::error::{HarnessError, Result};
use crate::fixture::config::HarnessConfig;
use crate::page::PageContext;

// ============================================================================
// Policy and outcome
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    /// How long each attempt waits for the observation before giving up
    pub attempt_timeout: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        PollPolicy {
            max_attempts,
            attempt_timeout,
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        PollPolicy::new(config.polling.max_attempts, config.timeouts.poll_attempt())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Found { value: T, attempts: u32 },
    NotFound { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, PollOutcome::Found { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Found { attempts, .. } | PollOutcome::NotFound { attempts } => *attempts,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            PollOutcome::Found { value, .. } => Some(value),
            PollOutcome::NotFound { .. } => None,
        }
    }
}

/// How the page was refreshed between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refreshed {
    /// The page's own refresh control at this index was clicked
    Control(usize),
    /// No control was usable; the page was reloaded
    Reload,
}

/// Something that may or may not be visible yet, and a way to nudge the page.
pub trait Observer {
    type Output;

    /// One bounded look. `Ok(None)` means not there yet.
    fn observe(&mut self, timeout: Duration) -> Result<Option<Self::Output>>;

    fn refresh(&mut self) -> Result<Refreshed>;
}

// ============================================================================
// Poll loop
// ============================================================================

/// Look for the observation up to `max_attempts` times, refreshing between
/// attempts.
///
/// Exhausting the attempts is a normal [`PollOutcome::NotFound`], not an
/// error; the caller decides whether absence fails the test. Attempts that
/// time out count as not found. No refresh follows the final attempt.
pub fn poll<O: Observer + ?Sized>(observer: &mut O, policy: &PollPolicy) -> Result<PollOutcome<O::Output>> {
    for attempt in 1..=policy.max_attempts {
        match observer.observe(policy.attempt_timeout) {
            Ok(Some(value)) => {
                info!(attempt, "observation found");
                return Ok(PollOutcome::Found {
                    value,
                    attempts: attempt,
                });
            }
            Ok(None) => debug!(attempt, max = policy.max_attempts, "not observed yet"),
            Err(e) if is_transient(&e) => debug!(attempt, error = %e, "attempt timed out"),
            Err(e) => return Err(e),
        }

        if attempt < policy.max_attempts {
            match observer.refresh() {
                Ok(how) => debug!(attempt, ?how, "refreshed"),
                Err(e) if is_transient(&e) => warn!(attempt, error = %e, "refresh timed out"),
                Err(e) => return Err(e),
            }
        }
    }
    info!(attempts = policy.max_attempts, "observation not found");
    Ok(PollOutcome::NotFound {
        attempts: policy.max_attempts,
    })
}

fn is_transient(e: &HarnessError) -> bool {
    matches!(e, HarnessError::Timeout { .. } | HarnessError::ElementNotReady { .. })
}

// ============================================================================
// Refresh strategy
// ============================================================================

/// Prefer the page's own refresh control; fall back to reloading a known URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshStrategy {
    /// Candidate controls, tried in order; the first visible one is clicked
    pub controls: Vec<ElementQuery>,
    pub fallback_url: String,
}

impl RefreshStrategy {
    pub fn new(controls: Vec<ElementQuery>, fallback_url: impl Into<String>) -> Self {
        RefreshStrategy {
            controls,
            fallback_url: fallback_url.into(),
        }
    }

    pub fn apply(&self, ctx: &mut PageContext<'_>) -> Result<Refreshed> {
        for (index, control) in self.controls.iter().enumerate() {
            match ctx.is_visible_now(control) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) if is_transient(&e) => {
                    debug!(index, error = %e, "refresh control check timed out");
                    continue;
                }
                Err(e) => return Err(e),
            }
            ctx.click("refresh", control)?;
            ctx.wait_for_load(LoadState::NetworkIdle)?;
            return Ok(Refreshed::Control(index));
        }
        ctx.open_until(&self.fallback_url, LoadState::DomContentLoaded)?;
        Ok(Refreshed::Reload)
    }
}
