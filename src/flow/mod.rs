//! Control-flow primitives that sit above single page operations: bounded
//! polling for eventually-consistent content, and closed-loop reordering of a
//! list against the page's own order check.

pub mod converge;
pub mod poll;

pub use converge::{converge, converge_by, ConvergenceReport, OrderTag, OrderableItem, Reorderable};
pub use poll::{poll, Observer, PollOutcome, PollPolicy, Refreshed, RefreshStrategy};
