use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::browser::driver::{
    Action, Driver, ElementState, EventKind, EventOutcome, ExpectationId, LoadState, PageId,
    SessionFactory,
};
use crate::browser::query::ElementQuery;
use crate::error::{HarnessError, Result};
use crate::fixture::config::DriverConfig;

/// Request sent to browser_server.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest<'a> {
    NewPage,
    ClosePage {
        page: PageId,
    },
    Goto {
        page: PageId,
        url: &'a str,
        wait_until: LoadState,
        timeout_ms: u64,
    },
    WaitForLoad {
        page: PageId,
        state: LoadState,
        timeout_ms: u64,
    },
    WaitForUrl {
        page: PageId,
        fragment: &'a str,
        timeout_ms: u64,
    },
    CurrentUrl {
        page: PageId,
    },
    Act {
        page: PageId,
        target: &'a ElementQuery,
        action: &'a Action,
        timeout_ms: u64,
    },
    WaitFor {
        page: PageId,
        target: &'a ElementQuery,
        state: ElementState,
        timeout_ms: u64,
    },
    WaitForAttribute {
        page: PageId,
        target: &'a ElementQuery,
        name: &'a str,
        value: &'a str,
        timeout_ms: u64,
    },
    Text {
        page: PageId,
        target: &'a ElementQuery,
        timeout_ms: u64,
    },
    AllTexts {
        page: PageId,
        target: &'a ElementQuery,
    },
    AllAttributes {
        page: PageId,
        target: &'a ElementQuery,
        name: &'a str,
    },
    Count {
        page: PageId,
        target: &'a ElementQuery,
    },
    Visible {
        page: PageId,
        target: &'a ElementQuery,
        timeout_ms: u64,
    },
    Attribute {
        page: PageId,
        target: &'a ElementQuery,
        name: &'a str,
        timeout_ms: u64,
    },
    InputValue {
        page: PageId,
        target: &'a ElementQuery,
        timeout_ms: u64,
    },
    Expect {
        id: ExpectationId,
        page: PageId,
        #[serde(flatten)]
        kind: &'a EventKind,
    },
    Await {
        id: ExpectationId,
        timeout_ms: u64,
    },
    Cancel {
        id: ExpectationId,
    },
    Quit,
}

impl BrowserRequest<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserRequest::NewPage => "new_page",
            BrowserRequest::ClosePage { .. } => "close_page",
            BrowserRequest::Goto { .. } => "goto",
            BrowserRequest::WaitForLoad { .. } => "wait_for_load",
            BrowserRequest::WaitForUrl { .. } => "wait_for_url",
            BrowserRequest::CurrentUrl { .. } => "current_url",
            BrowserRequest::Act { .. } => "act",
            BrowserRequest::WaitFor { .. } => "wait_for",
            BrowserRequest::WaitForAttribute { .. } => "wait_for_attribute",
            BrowserRequest::Text { .. } => "text",
            BrowserRequest::AllTexts { .. } => "all_texts",
            BrowserRequest::AllAttributes { .. } => "all_attributes",
            BrowserRequest::Count { .. } => "count",
            BrowserRequest::Visible { .. } => "visible",
            BrowserRequest::Attribute { .. } => "attribute",
            BrowserRequest::InputValue { .. } => "input_value",
            BrowserRequest::Expect { .. } => "expect",
            BrowserRequest::Await { .. } => "await",
            BrowserRequest::Cancel { .. } => "cancel",
            BrowserRequest::Quit => "quit",
        }
    }

    /// The wait budget carried by the request, if any.
    fn timeout_ms(&self) -> u64 {
        match self {
            BrowserRequest::Goto { timeout_ms, .. }
            | BrowserRequest::WaitForLoad { timeout_ms, .. }
            | BrowserRequest::WaitForUrl { timeout_ms, .. }
            | BrowserRequest::Act { timeout_ms, .. }
            | BrowserRequest::WaitFor { timeout_ms, .. }
            | BrowserRequest::WaitForAttribute { timeout_ms, .. }
            | BrowserRequest::Text { timeout_ms, .. }
            | BrowserRequest::Visible { timeout_ms, .. }
            | BrowserRequest::Attribute { timeout_ms, .. }
            | BrowserRequest::InputValue { timeout_ms, .. }
            | BrowserRequest::Await { timeout_ms, .. } => *timeout_ms,
            _ => 0,
        }
    }
}

/// Response received from browser_server.js over stdout (one JSON line).
#[derive(Debug, Default, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// `"timeout"` when the browser gave up waiting
    #[serde(default)]
    pub error_kind: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub page: Option<PageId>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub texts: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub event: Option<EventOutcome>,
}

impl BrowserResponse {
    /// Turn an `ok: false` response into the matching error.
    pub fn into_result(self, request: &BrowserRequest<'_>) -> Result<BrowserResponse> {
        if self.ok {
            return Ok(self);
        }
        if self.error_kind.as_deref() == Some("timeout") {
            return Err(HarnessError::Timeout {
                command: request.name().into(),
                timeout_ms: request.timeout_ms(),
            });
        }
        Err(HarnessError::Driver {
            command: request.name().into(),
            error: self.error.unwrap_or_else(|| "Unknown error".into()),
        })
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}

/// A browser session backed by a long-lived browser_server.js process.
///
/// The process keeps one Playwright browser context open; commands are sent as
/// NDJSON over stdin and answered one line each on stdout. Each session is its
/// own OS process, so sessions never share pages, cookies or storage.
pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    pages: BTreeSet<PageId>,
    next_expectation: u64,
    closed: bool,
}

impl BrowserSession {
    /// Launch a new browser session by spawning the driver script.
    pub fn launch(config: &DriverConfig) -> Result<Self> {
        let script = config.script.display().to_string();
        let mut command = Command::new(&config.program);
        command.arg(&config.script);
        if !config.headless {
            command.arg("--headed");
        }
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HarnessError::DriverSpawn {
                program: config.program.clone(),
                script: script.clone(),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HarnessError::DriverIo(format!("failed to capture stdin of {}", script)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::DriverIo(format!("failed to capture stdout of {}", script)))?;

        // Forward driver logs so a full stderr pipe never stalls the browser.
        if let Some(stderr) = child.stderr.take() {
            std::thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                    debug!(target: "pageflow::driver", "{}", line.trim_end());
                }
            });
        }

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| HarnessError::DriverIo(format!("failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| HarnessError::Json {
                context: format!("{} ready signal", script),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(HarnessError::Driver {
                command: "launch".into(),
                error: format!("did not receive ready signal from {}", script),
            });
        }

        debug!(script = %script, pid = child.id(), "browser session ready");

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            pages: BTreeSet::new(),
            next_expectation: 1,
            closed: false,
        })
    }

    /// Send a request and read the raw response.
    fn send(&mut self, request: &BrowserRequest<'_>) -> Result<BrowserResponse> {
        if self.closed {
            return Err(HarnessError::DriverIo("session already closed".into()));
        }

        let json = serde_json::to_string(request).map_err(|e| HarnessError::Json {
            context: "BrowserRequest".into(),
            source: e,
        })?;
        trace!(request = %json, "driver <-");

        writeln!(self.stdin, "{}", json)
            .map_err(|e| HarnessError::DriverIo(format!("failed to write to driver stdin: {}", e)))?;
        self.stdin
            .flush()
            .map_err(|e| HarnessError::DriverIo(format!("failed to flush driver stdin: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| HarnessError::DriverIo(format!("failed to read from driver stdout: {}", e)))?;

        if line.trim().is_empty() {
            return Err(HarnessError::DriverIo(
                "empty response from driver (process may have died)".into(),
            ));
        }
        trace!(response = %line.trim(), "driver ->");

        serde_json::from_str(line.trim()).map_err(|e| HarnessError::Json {
            context: format!("{} response", request.name()),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &BrowserRequest<'_>) -> Result<BrowserResponse> {
        self.send(request)?.into_result(request)
    }

    fn missing(command: &str, field: &str) -> HarnessError {
        HarnessError::Driver {
            command: command.into(),
            error: format!("no {} in response", field),
        }
    }
}

impl Driver for BrowserSession {
    fn new_page(&mut self) -> Result<PageId> {
        let response = self.send_ok(&BrowserRequest::NewPage)?;
        let page = response.page.ok_or_else(|| Self::missing("new_page", "page"))?;
        self.pages.insert(page);
        Ok(page)
    }

    fn close_page(&mut self, page: PageId) -> Result<()> {
        self.send_ok(&BrowserRequest::ClosePage { page })?;
        self.pages.remove(&page);
        Ok(())
    }

    fn pages(&self) -> Vec<PageId> {
        self.pages.iter().copied().collect()
    }

    fn goto(&mut self, page: PageId, url: &str, wait_until: LoadState, timeout: Duration) -> Result<()> {
        self.send_ok(&BrowserRequest::Goto {
            page,
            url,
            wait_until,
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn wait_for_load(&mut self, page: PageId, state: LoadState, timeout: Duration) -> Result<()> {
        self.send_ok(&BrowserRequest::WaitForLoad {
            page,
            state,
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn wait_for_url(&mut self, page: PageId, fragment: &str, timeout: Duration) -> Result<()> {
        self.send_ok(&BrowserRequest::WaitForUrl {
            page,
            fragment,
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn current_url(&mut self, page: PageId) -> Result<String> {
        let response = self.send_ok(&BrowserRequest::CurrentUrl { page })?;
        response.url.ok_or_else(|| Self::missing("current_url", "url"))
    }

    fn act(&mut self, page: PageId, target: &ElementQuery, action: &Action, timeout: Duration) -> Result<()> {
        self.send_ok(&BrowserRequest::Act {
            page,
            target,
            action,
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn wait_for(&mut self, page: PageId, target: &ElementQuery, state: ElementState, timeout: Duration) -> Result<()> {
        self.send_ok(&BrowserRequest::WaitFor {
            page,
            target,
            state,
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn wait_for_attribute(
        &mut self,
        page: PageId,
        target: &ElementQuery,
        name: &str,
        value: &str,
        timeout: Duration,
    ) -> Result<()> {
        self.send_ok(&BrowserRequest::WaitForAttribute {
            page,
            target,
            name,
            value,
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn text(&mut self, page: PageId, target: &ElementQuery, timeout: Duration) -> Result<Option<String>> {
        let response = self.send_ok(&BrowserRequest::Text {
            page,
            target,
            timeout_ms: millis(timeout),
        })?;
        Ok(response.text)
    }

    fn all_texts(&mut self, page: PageId, target: &ElementQuery) -> Result<Vec<String>> {
        let response = self.send_ok(&BrowserRequest::AllTexts { page, target })?;
        Ok(response.texts.unwrap_or_default())
    }

    fn all_attributes(&mut self, page: PageId, target: &ElementQuery, name: &str) -> Result<Vec<Option<String>>> {
        let response = self.send_ok(&BrowserRequest::AllAttributes { page, target, name })?;
        Ok(response.values.unwrap_or_default())
    }

    fn count(&mut self, page: PageId, target: &ElementQuery) -> Result<usize> {
        let response = self.send_ok(&BrowserRequest::Count { page, target })?;
        response.count.ok_or_else(|| Self::missing("count", "count"))
    }

    fn is_visible(&mut self, page: PageId, target: &ElementQuery, timeout: Duration) -> Result<bool> {
        let response = self.send_ok(&BrowserRequest::Visible {
            page,
            target,
            timeout_ms: millis(timeout),
        })?;
        response.visible.ok_or_else(|| Self::missing("visible", "visible"))
    }

    fn attribute(&mut self, page: PageId, target: &ElementQuery, name: &str, timeout: Duration) -> Result<Option<String>> {
        let response = self.send_ok(&BrowserRequest::Attribute {
            page,
            target,
            name,
            timeout_ms: millis(timeout),
        })?;
        Ok(response.value)
    }

    fn input_value(&mut self, page: PageId, target: &ElementQuery, timeout: Duration) -> Result<String> {
        let response = self.send_ok(&BrowserRequest::InputValue {
            page,
            target,
            timeout_ms: millis(timeout),
        })?;
        Ok(response.value.unwrap_or_default())
    }

    fn expect_event(&mut self, page: PageId, kind: &EventKind) -> Result<ExpectationId> {
        let id = ExpectationId(self.next_expectation);
        self.next_expectation += 1;
        self.send_ok(&BrowserRequest::Expect { id, page, kind })?;
        Ok(id)
    }

    fn await_event(&mut self, id: ExpectationId, timeout: Duration) -> Result<EventOutcome> {
        let response = self.send_ok(&BrowserRequest::Await {
            id,
            timeout_ms: millis(timeout),
        })?;
        let outcome = response.event.ok_or_else(|| Self::missing("await", "event"))?;
        if let EventOutcome::Page { page, .. } = &outcome {
            self.pages.insert(*page);
        }
        Ok(outcome)
    }

    fn cancel_event(&mut self, id: ExpectationId) -> Result<()> {
        self.send_ok(&BrowserRequest::Cancel { id })?;
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let sent = self.send(&BrowserRequest::Quit);
        self.closed = true;
        self.pages.clear();
        let exited = self.child.wait();
        sent?;
        let status = exited?;
        if !status.success() {
            return Err(HarnessError::DriverIo(format!("browser server exited with {}", status)));
        }
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!(error = %e, "browser session did not shut down cleanly");
        }
    }
}

/// Launches one `BrowserSession` per call.
#[derive(Debug, Clone)]
pub struct NodeSessionFactory {
    config: DriverConfig,
}

impl NodeSessionFactory {
    pub fn new(config: DriverConfig) -> Self {
        NodeSessionFactory { config }
    }

    pub fn script(&self) -> &Path {
        &self.config.script
    }
}

impl SessionFactory for NodeSessionFactory {
    fn launch(&self) -> Result<Box<dyn Driver>> {
        Ok(Box::new(BrowserSession::launch(&self.config)?))
    }
}
