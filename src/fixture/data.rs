use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{HarnessError, Result};

/// Read-only literal fixtures (expected texts, codes, row data) shared by all
/// tests of a run. Keys are dotted paths; numeric segments index sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestDataSet {
    root: Value,
}

impl TestDataSet {
    pub fn empty() -> Self {
        TestDataSet { root: Value::Null }
    }

    /// Load a `.json` or YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::TestData {
            key: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let is_json = path.extension().is_some_and(|e| e == "json");
        if is_json {
            let root: Value = serde_json::from_str(&content).map_err(|e| HarnessError::Json {
                context: path.display().to_string(),
                source: e,
            })?;
            Ok(TestDataSet { root })
        } else {
            Self::from_yaml(&content).map_err(|e| match e {
                HarnessError::Yaml { source, .. } => HarnessError::Yaml {
                    context: path.display().to_string(),
                    source,
                },
                other => other,
            })
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let root = serde_yaml::from_str(content).map_err(|e| HarnessError::Yaml {
            context: "test data".into(),
            source: e,
        })?;
        Ok(TestDataSet { root })
    }

    pub fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('.').try_fold(&self.root, |node, segment| match node {
            Value::Mapping(map) => map.get(segment),
            Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Typed value at `key`; missing keys and shape mismatches name the key.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.lookup(key).ok_or_else(|| HarnessError::TestData {
            key: key.into(),
            reason: "missing".into(),
        })?;
        serde_yaml::from_value(value.clone()).map_err(|e| HarnessError::TestData {
            key: key.into(),
            reason: e.to_string(),
        })
    }

    /// Like [`get`](Self::get) but falls back to `default` when the key is absent.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        if self.contains(key) {
            self.get(key)
        } else {
            Ok(default)
        }
    }
}
