#![allow(dead_code)]

pub mod fake_driver;

use std::path::Path;
use std::sync::Arc;

use pageflow::error::Result;
use pageflow::fixture::{Fixtures, HarnessConfig, TestDataSet};
use pageflow::flow::converge::{OrderTag, OrderableItem, Reorderable};

use fake_driver::{FakeSessionFactory, FakeState};

/// Defaults with short waits and downloads under `downloads`.
pub fn test_config(downloads: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.downloads_dir = downloads.to_path_buf();
    config.timeouts.action_ms = 50;
    config.timeouts.visibility_ms = 50;
    config.timeouts.navigation_ms = 50;
    config.timeouts.download_ms = 300;
    config.timeouts.poll_attempt_ms = 10;
    config.timeouts.settle_ms = 10;
    config
}

/// Fixtures for `name` backed by a fake session factory.
pub fn fake_fixtures(name: &str, config: HarnessConfig, data: TestDataSet, template: FakeState) -> (Fixtures, Arc<FakeSessionFactory>) {
    let factory = Arc::new(FakeSessionFactory::new(template));
    let fx = Fixtures::new(name, Arc::new(config), Arc::new(data), factory.clone());
    (fx, factory)
}

// ============================================================================
// Fake reorderable list
// ============================================================================

/// A list that judges itself against a hidden target order, like the
/// playground's sortable list.
pub struct FakeList {
    pub items: Vec<String>,
    target: Vec<String>,
    checked: bool,
    pub moves: usize,
    pub checks: usize,
    pub reads: usize,
}

impl FakeList {
    pub fn new(items: &[&str], target: &[&str]) -> Self {
        FakeList {
            items: items.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            checked: false,
            moves: 0,
            checks: 0,
            reads: 0,
        }
    }

    /// A list whose target order is alphabetical.
    pub fn sorted_target(items: &[&str]) -> Self {
        let mut target = items.to_vec();
        target.sort();
        Self::new(items, &target)
    }

    pub fn is_sorted(&self) -> bool {
        self.items == self.target
    }
}

impl Reorderable for FakeList {
    fn read_items(&mut self) -> Result<Vec<OrderableItem>> {
        self.reads += 1;
        Ok(self
            .items
            .iter()
            .enumerate()
            .map(|(position, name)| OrderableItem {
                position,
                name: name.clone(),
                tag: if !self.checked {
                    OrderTag::Unchecked
                } else if self.target.get(position) == Some(name) {
                    OrderTag::Correct
                } else {
                    OrderTag::Incorrect
                },
            })
            .collect())
    }

    fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.moves += 1;
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    fn check_order(&mut self) -> Result<()> {
        self.checks += 1;
        self.checked = true;
        Ok(())
    }
}
