use std::fmt;

use serde::{Deserialize, Serialize};

/// A deferred reference to the DOM nodes matching `selector`, optionally
/// scoped through a chain of nested frames.
///
/// Queries carry no element handles; the driver resolves them again on every
/// command, so a query can never outlive the page it is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementQuery {
    /// Frame selectors from the outermost frame inward
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<String>,

    /// CSS, XPath (`//…`) or Playwright text selector
    pub selector: String,

    /// Pick the n-th match (0-based) instead of the first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth: Option<usize>,

    /// Restrict matches to nodes containing this text
    #[serde(rename = "hasText", default, skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,
}

impl ElementQuery {
    pub fn new(selector: impl Into<String>) -> Self {
        ElementQuery {
            frames: Vec::new(),
            selector: selector.into(),
            nth: None,
            has_text: None,
        }
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.nth = Some(index);
        self
    }

    pub fn first(self) -> Self {
        self.nth(0)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    /// A query for `selector` nested inside this query's frame scope.
    pub fn child(&self, selector: &str) -> Self {
        ElementQuery {
            frames: self.frames.clone(),
            selector: format!("{} >> {}", self.selector, selector),
            nth: None,
            has_text: None,
        }
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "{} >>> ", frame)?;
        }
        write!(f, "{}", self.selector)?;
        if let Some(text) = &self.has_text {
            write!(f, " [text~={:?}]", text)?;
        }
        if let Some(n) = self.nth {
            write!(f, " [{}]", n)?;
        }
        Ok(())
    }
}

/// A chain of nested frames. Page objects for framed content keep one of these
/// and derive every query from it, so callers never re-derive frame scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameScope {
    frames: Vec<String>,
}

impl FrameScope {
    pub fn root() -> Self {
        FrameScope::default()
    }

    pub fn frame(mut self, selector: impl Into<String>) -> Self {
        self.frames.push(selector.into());
        self
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn locator(&self, selector: impl Into<String>) -> ElementQuery {
        ElementQuery {
            frames: self.frames.clone(),
            ..ElementQuery::new(selector)
        }
    }
}
