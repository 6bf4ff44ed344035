use std::path::Path;

use serde::Serialize;

use crate::error::{HarnessError, Result};
use crate::export::normalize::normalize_text;

/// Text extracted from a document, kept both raw and normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentText {
    raw: String,
    normalized: String,
}

impl DocumentText {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize_text(&raw);
        DocumentText { raw, normalized }
    }

    pub fn from_pdf(path: &Path) -> Result<Self> {
        let bytes = read_artifact(path)?;
        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| HarnessError::Decode {
            format: "pdf".into(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(DocumentText::from_raw(text))
    }

    pub fn from_text_file(path: &Path) -> Result<Self> {
        let bytes = read_artifact(path)?;
        let text = String::from_utf8(bytes).map_err(|e| HarnessError::Decode {
            format: "text".into(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(DocumentText::from_raw(text))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lowercased text with whitespace runs collapsed to one space.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Containment under the same normalization as the document.
    pub fn contains(&self, needle: &str) -> bool {
        self.normalized.contains(&normalize_text(needle))
    }

    /// The values that do not appear in the document, in input order.
    pub fn missing<'v>(&self, values: &[&'v str]) -> Vec<&'v str> {
        values.iter().copied().filter(|v| !self.contains(v)).collect()
    }

    /// Leading slice of the normalized text, for failure messages.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut excerpt: String = self.normalized.chars().take(max_chars).collect();
        if self.normalized.chars().count() > max_chars {
            excerpt.push('…');
        }
        excerpt
    }
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HarnessError::ArtifactMissing {
                path: path.to_path_buf(),
                waited_ms: 0,
            }
        } else {
            e.into()
        }
    })
}
