use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{HarnessError, Result};

// ============================================================================
// Orderable list model
// ============================================================================

/// Per-item verdict shown by the page's own order check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderTag {
    Correct,
    Incorrect,
    /// The page has not judged this item yet
    Unchecked,
}

impl OrderTag {
    /// Classify an item from its `class` attribute tokens.
    pub fn from_class(class: Option<&str>, correct: &str, incorrect: &str) -> Self {
        let tokens: Vec<&str> = class.unwrap_or_default().split_whitespace().collect();
        if tokens.contains(&correct) {
            OrderTag::Correct
        } else if tokens.contains(&incorrect) {
            OrderTag::Incorrect
        } else {
            OrderTag::Unchecked
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderableItem {
    pub position: usize,
    pub name: String,
    pub tag: OrderTag,
}

/// A list on a live page that can be read, reordered, and judged.
pub trait Reorderable {
    /// Current items in displayed order, with the page's latest verdicts.
    fn read_items(&mut self) -> Result<Vec<OrderableItem>>;
    /// Move the item at `from` so it ends up at `to`.
    fn move_item(&mut self, from: usize, to: usize) -> Result<()>;
    /// Ask the page to re-judge every item.
    fn check_order(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvergenceReport {
    pub actions: usize,
    pub passes: usize,
    pub items: Vec<OrderableItem>,
}

// ============================================================================
// Checker
// ============================================================================

/// Drive `list` until every item is tagged correct, ordering by name.
pub fn converge<L: Reorderable + ?Sized>(list: &mut L, max_actions: Option<usize>) -> Result<ConvergenceReport> {
    converge_by(list, max_actions, |a, b| a.name.cmp(&b.name))
}

/// Drive `list` until every item is tagged correct.
///
/// Each pass starts at the first item not tagged correct and, for each
/// position from there, moves any later item that `order` places before it
/// into that position. Every move is followed by a fresh order check and a
/// fresh read, so decisions never rest on a stale snapshot. The number of
/// moves is capped at `max_actions` (n² for an n-item list by default); a
/// pass that finds nothing to move while items are still tagged wrong means
/// the page disagrees with `order` and is reported as stalled.
pub fn converge_by<L, F>(list: &mut L, max_actions: Option<usize>, order: F) -> Result<ConvergenceReport>
where
    L: Reorderable + ?Sized,
    F: Fn(&OrderableItem, &OrderableItem) -> Ordering,
{
    let mut items = list.read_items()?;
    if items.iter().any(|item| item.tag == OrderTag::Unchecked) {
        list.check_order()?;
        items = list.read_items()?;
    }

    let len = items.len();
    let cap = max_actions.unwrap_or(len * len);
    let mut actions = 0;
    let mut passes = 0;

    loop {
        let Some(start) = first_incorrect(&items) else {
            info!(actions, passes, items = len, "list converged");
            return Ok(ConvergenceReport { actions, passes, items });
        };
        passes += 1;
        let actions_before = actions;
        debug!(pass = passes, start, "convergence pass");

        for i in start..len {
            for j in (i + 1)..len {
                if order(&items[j], &items[i]) != Ordering::Less {
                    continue;
                }
                if actions >= cap {
                    return Err(HarnessError::ConvergenceExhausted {
                        actions,
                        passes,
                        reason: format!(
                            "action cap {} reached with {} item(s) still out of place",
                            cap,
                            incorrect_count(&items)
                        ),
                    });
                }
                debug!(from = j, to = i, moving = %items[j].name, "corrective move");
                list.move_item(j, i)?;
                list.check_order()?;
                actions += 1;
                items = list.read_items()?;
                if items.len() != len {
                    return Err(HarnessError::mismatch("orderable item count", len, items.len()));
                }
            }
        }

        if actions == actions_before && first_incorrect(&items).is_some() {
            return Err(HarnessError::ConvergenceExhausted {
                actions,
                passes,
                reason: format!(
                    "stalled: items are in order but {} still tagged incorrect",
                    incorrect_count(&items)
                ),
            });
        }
    }
}

fn first_incorrect(items: &[OrderableItem]) -> Option<usize> {
    items.iter().position(|item| item.tag != OrderTag::Correct)
}

fn incorrect_count(items: &[OrderableItem]) -> usize {
    items.iter().filter(|item| item.tag != OrderTag::Correct).count()
}
