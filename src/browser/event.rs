use std::time::Duration;

use tracing::{debug, warn};

use crate::browser::driver::{Driver, EventKind, EventOutcome, ExpectationId, PageId};
use crate::error::Result;

/// A registered one-shot event listener waiting for its triggering action.
///
/// The only way to obtain one is [`expect`], which registers the listener with
/// the browser before returning, and the only way to run the triggering action
/// is [`Expectation::trigger`]. Registering after the action is therefore not
/// expressible. Dropping an expectation that was never awaited releases the
/// listener.
pub struct Expectation<'d, D: Driver + ?Sized> {
    driver: &'d mut D,
    id: ExpectationId,
    kind: &'static str,
    armed: bool,
}

/// Register a listener for `kind` on `page`.
pub fn expect<'d, D: Driver + ?Sized>(
    driver: &'d mut D,
    page: PageId,
    kind: EventKind,
) -> Result<Expectation<'d, D>> {
    let id = driver.expect_event(page, &kind)?;
    debug!(event = kind.name(), page = page.0, id = id.0, "expectation registered");
    Ok(Expectation {
        driver,
        id,
        kind: kind.name(),
        armed: true,
    })
}

impl<'d, D: Driver + ?Sized> Expectation<'d, D> {
    pub fn id(&self) -> ExpectationId {
        self.id
    }

    /// Run the triggering action, then wait for the event.
    ///
    /// If the action fails the listener is cancelled and the action's error is
    /// returned.
    pub fn trigger<F>(mut self, timeout: Duration, action: F) -> Result<EventOutcome>
    where
        F: FnOnce(&mut D) -> Result<()>,
    {
        if let Err(e) = action(&mut *self.driver) {
            self.release();
            return Err(e);
        }
        self.armed = false;
        let outcome = self.driver.await_event(self.id, timeout)?;
        debug!(event = self.kind, id = self.id.0, "expectation fulfilled");
        Ok(outcome)
    }

    fn release(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        if let Err(e) = self.driver.cancel_event(self.id) {
            warn!(event = self.kind, id = self.id.0, error = %e, "failed to release expectation");
        }
    }
}

impl<'d, D: Driver + ?Sized> Drop for Expectation<'d, D> {
    fn drop(&mut self) {
        self.release();
    }
}
