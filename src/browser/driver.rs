use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::query::ElementQuery;
use crate::error::Result;

/// One tab/page inside a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u32);

/// Handle to a registered one-shot event expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadState {
    #[default]
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl ElementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementState::Visible => "visible",
            ElementState::Hidden => "hidden",
            ElementState::Attached => "attached",
            ElementState::Detached => "detached",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
}

/// A single user interaction against one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Click {
        #[serde(default)]
        force: bool,
        #[serde(default)]
        button: MouseButton,
    },
    Fill {
        value: String,
    },
    /// Type key by key with a pause between keystrokes
    Type {
        text: String,
        delay_ms: u64,
    },
    Press {
        key: String,
    },
    /// Attach files to an `<input type=file>`; an empty list clears it
    SetInputFiles {
        files: Vec<PathBuf>,
    },
    DragTo {
        target: ElementQuery,
        #[serde(default)]
        force: bool,
    },
    Hover,
    ScrollIntoView,
}

impl Action {
    pub fn click() -> Self {
        Action::Click {
            force: false,
            button: MouseButton::Left,
        }
    }

    pub fn force_click() -> Self {
        Action::Click {
            force: true,
            button: MouseButton::Left,
        }
    }

    pub fn right_click() -> Self {
        Action::Click {
            force: false,
            button: MouseButton::Right,
        }
    }

    pub fn fill(value: impl Into<String>) -> Self {
        Action::Fill {
            value: value.into(),
        }
    }

    pub fn press(key: impl Into<String>) -> Self {
        Action::Press { key: key.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Click { .. } => "click",
            Action::Fill { .. } => "fill",
            Action::Type { .. } => "type",
            Action::Press { .. } => "press",
            Action::SetInputFiles { .. } => "set_input_files",
            Action::DragTo { .. } => "drag_to",
            Action::Hover => "hover",
            Action::ScrollIntoView => "scroll_into_view",
        }
    }
}

/// How a native dialog is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum DialogResponse {
    Accept,
    AcceptWith { text: String },
    Dismiss,
}

/// Events a caller can wait for after triggering an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    Dialog { answer: DialogResponse },
    /// The browser saves the download into `dir`, under `file_name` or the
    /// server-suggested name
    Download {
        dir: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
    },
    /// A new page (tab or popup) opens in the same session
    Page,
    /// The page the expectation was registered on closes
    Close,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Dialog { .. } => "dialog",
            EventKind::Download { .. } => "download",
            EventKind::Page => "page",
            EventKind::Close => "close",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventOutcome {
    Dialog {
        dialog_type: String,
        message: String,
    },
    Download {
        suggested_filename: String,
        path: PathBuf,
    },
    Page {
        page: PageId,
        url: String,
    },
    Close,
}

/// The browser automation capabilities the toolkit is written against.
///
/// One driver value is one isolated browser session. Every method blocks the
/// calling thread until the browser reports the awaited condition or the
/// timeout elapses; a timeout surfaces as [`HarnessError::Timeout`].
///
/// [`HarnessError::Timeout`]: crate::error::HarnessError::Timeout
pub trait Driver {
    fn new_page(&mut self) -> Result<PageId>;
    fn close_page(&mut self, page: PageId) -> Result<()>;

    /// Pages this session believes are open.
    fn pages(&self) -> Vec<PageId>;

    fn goto(&mut self, page: PageId, url: &str, wait_until: LoadState, timeout: Duration) -> Result<()>;
    fn wait_for_load(&mut self, page: PageId, state: LoadState, timeout: Duration) -> Result<()>;
    fn wait_for_url(&mut self, page: PageId, fragment: &str, timeout: Duration) -> Result<()>;
    fn current_url(&mut self, page: PageId) -> Result<String>;

    fn act(&mut self, page: PageId, target: &ElementQuery, action: &Action, timeout: Duration) -> Result<()>;
    fn wait_for(&mut self, page: PageId, target: &ElementQuery, state: ElementState, timeout: Duration) -> Result<()>;
    fn wait_for_attribute(
        &mut self,
        page: PageId,
        target: &ElementQuery,
        name: &str,
        value: &str,
        timeout: Duration,
    ) -> Result<()>;

    /// Trimmed text of the first match, `None` when nothing matches in time.
    fn text(&mut self, page: PageId, target: &ElementQuery, timeout: Duration) -> Result<Option<String>>;
    /// Trimmed text of every match, in document order. Does not wait.
    fn all_texts(&mut self, page: PageId, target: &ElementQuery) -> Result<Vec<String>>;
    /// One attribute of every match, in document order. Does not wait.
    fn all_attributes(&mut self, page: PageId, target: &ElementQuery, name: &str) -> Result<Vec<Option<String>>>;
    fn count(&mut self, page: PageId, target: &ElementQuery) -> Result<usize>;
    /// Whether the target becomes visible within `timeout` (zero: check once).
    fn is_visible(&mut self, page: PageId, target: &ElementQuery, timeout: Duration) -> Result<bool>;
    fn attribute(&mut self, page: PageId, target: &ElementQuery, name: &str, timeout: Duration) -> Result<Option<String>>;
    fn input_value(&mut self, page: PageId, target: &ElementQuery, timeout: Duration) -> Result<String>;

    /// Register a one-shot listener. Must happen before the triggering action.
    fn expect_event(&mut self, page: PageId, kind: &EventKind) -> Result<ExpectationId>;
    fn await_event(&mut self, id: ExpectationId, timeout: Duration) -> Result<EventOutcome>;
    /// Release a listener whose triggering action never ran.
    fn cancel_event(&mut self, id: ExpectationId) -> Result<()>;

    fn quit(&mut self) -> Result<()>;
}

/// Builds one isolated driver session per test.
pub trait SessionFactory: Send + Sync {
    fn launch(&self) -> Result<Box<dyn Driver>>;
}
