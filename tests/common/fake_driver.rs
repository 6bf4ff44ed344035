use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use pageflow::browser::driver::{
    Action, Driver, ElementState, EventKind, EventOutcome, ExpectationId, LoadState, PageId, SessionFactory,
};
use pageflow::browser::query::ElementQuery;
use pageflow::error::{HarnessError, Result};

// ============================================================================
// Scripted in-memory driver
// ============================================================================

/// Everything a fake session knows. Selectors are matched on
/// `ElementQuery::selector` alone; frames, `nth` and `hasText` are ignored.
#[derive(Debug, Clone, Default)]
pub struct FakeState {
    /// Every command received, in order (`"act 1 click #go"`, `"expect 1 dialog"`, …)
    pub log: Vec<String>,
    pub urls: HashMap<PageId, String>,
    pub open_pages: Vec<PageId>,
    next_page: u32,
    next_expectation: u64,
    pub pending: HashMap<u64, EventKind>,

    /// Selectors that are visible right away
    pub visible: HashSet<String>,
    /// Selectors that turn visible after this many visibility checks
    pub appear_after: HashMap<String, u32>,
    /// Selectors whose actions and waits time out
    pub stalled: HashSet<String>,
    /// Selectors whose visibility checks, actions and waits fail as if the pipe broke
    pub broken: HashSet<String>,
    pub texts: HashMap<String, Vec<String>>,
    /// Texts handed out one per read, ahead of `texts`
    pub text_sequences: HashMap<String, VecDeque<String>>,
    /// URLs a page passes through when the selector is clicked
    pub redirects: HashMap<String, Vec<String>>,
    /// Every URL each page has been on
    pub visited: HashMap<PageId, Vec<String>>,
    pub attributes: HashMap<(String, String), Vec<Option<String>>>,
    pub input_values: HashMap<String, String>,

    /// Outcomes handed out, in order, to awaited non-download events
    pub events: VecDeque<EventOutcome>,
    /// Files "downloaded" by awaited download events: suggested name, bytes
    pub downloads: VecDeque<(String, Vec<u8>)>,

    pub quit: bool,
    /// Error `quit` reports, if any
    pub quit_error: Option<String>,
}

impl FakeState {
    pub fn with_visible(mut self, selector: &str) -> Self {
        self.visible.insert(selector.to_string());
        self
    }

    pub fn with_texts(mut self, selector: &str, texts: &[&str]) -> Self {
        self.texts
            .insert(selector.to_string(), texts.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_text_sequence(mut self, selector: &str, texts: &[&str]) -> Self {
        self.text_sequences
            .insert(selector.to_string(), texts.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_redirects(mut self, selector: &str, urls: &[&str]) -> Self {
        self.redirects
            .insert(selector.to_string(), urls.iter().map(|u| u.to_string()).collect());
        self
    }

    pub fn with_event(mut self, outcome: EventOutcome) -> Self {
        self.events.push_back(outcome);
        self
    }

    pub fn with_download(mut self, suggested: &str, bytes: &[u8]) -> Self {
        self.downloads.push_back((suggested.to_string(), bytes.to_vec()));
        self
    }

    pub fn with_stalled(mut self, selector: &str) -> Self {
        self.stalled.insert(selector.to_string());
        self
    }

    pub fn with_broken(mut self, selector: &str) -> Self {
        self.broken.insert(selector.to_string());
        self
    }

    pub fn with_attribute(mut self, selector: &str, name: &str, values: &[&str]) -> Self {
        self.attributes.insert(
            (selector.to_string(), name.to_string()),
            values.iter().map(|v| Some(v.to_string())).collect(),
        );
        self
    }

    /// Log entries starting with `prefix`.
    pub fn entries(&self, prefix: &str) -> Vec<String> {
        self.log.iter().filter(|l| l.starts_with(prefix)).cloned().collect()
    }

    /// Position of the first log entry starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.log.iter().position(|l| l.starts_with(prefix))
    }
}

fn broken_pipe() -> HarnessError {
    HarnessError::DriverIo("failed to write to driver stdin: broken pipe".into())
}

fn timeout(command: &str) -> HarnessError {
    HarnessError::Timeout {
        command: command.to_string(),
        timeout_ms: 0,
    }
}

pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new(state: FakeState) -> (Self, Arc<Mutex<FakeState>>) {
        let shared = Arc::new(Mutex::new(state));
        (
            FakeDriver {
                state: Arc::clone(&shared),
            },
            shared,
        )
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl Driver for FakeDriver {
    fn new_page(&mut self) -> Result<PageId> {
        let mut s = self.state();
        s.next_page += 1;
        let id = PageId(s.next_page);
        s.open_pages.push(id);
        s.urls.insert(id, "about:blank".to_string());
        s.log.push(format!("new_page {}", id.0));
        Ok(id)
    }

    fn close_page(&mut self, page: PageId) -> Result<()> {
        let mut s = self.state();
        s.open_pages.retain(|p| *p != page);
        s.log.push(format!("close_page {}", page.0));
        Ok(())
    }

    fn pages(&self) -> Vec<PageId> {
        self.state().open_pages.clone()
    }

    fn goto(&mut self, page: PageId, url: &str, _wait_until: LoadState, _timeout: Duration) -> Result<()> {
        let mut s = self.state();
        s.log.push(format!("goto {} {}", page.0, url));
        if s.stalled.contains(url) {
            return Err(timeout("goto"));
        }
        s.urls.insert(page, url.to_string());
        s.visited.entry(page).or_default().push(url.to_string());
        Ok(())
    }

    fn wait_for_load(&mut self, page: PageId, state: LoadState, _timeout: Duration) -> Result<()> {
        self.state().log.push(format!("wait_for_load {} {:?}", page.0, state));
        Ok(())
    }

    fn wait_for_url(&mut self, page: PageId, fragment: &str, _timeout: Duration) -> Result<()> {
        let mut s = self.state();
        s.log.push(format!("wait_for_url {} {}", page.0, fragment));
        let seen = s
            .visited
            .get(&page)
            .is_some_and(|urls| urls.iter().any(|url| url.contains(fragment)));
        if seen { Ok(()) } else { Err(timeout("wait_for_url")) }
    }

    fn current_url(&mut self, page: PageId) -> Result<String> {
        Ok(self.state().urls.get(&page).cloned().unwrap_or_default())
    }

    fn act(&mut self, page: PageId, target: &ElementQuery, action: &Action, _timeout: Duration) -> Result<()> {
        let mut s = self.state();
        s.log.push(format!("act {} {} {}", page.0, action.name(), target.selector));
        if s.broken.contains(&target.selector) {
            return Err(broken_pipe());
        }
        if s.stalled.contains(&target.selector) {
            return Err(timeout("act"));
        }
        match action {
            Action::Fill { value } => {
                s.input_values.insert(target.selector.clone(), value.clone());
            }
            Action::Click { .. } => {
                if let Some(urls) = s.redirects.get(&target.selector).cloned() {
                    if let Some(last) = urls.last() {
                        s.urls.insert(page, last.clone());
                    }
                    s.visited.entry(page).or_default().extend(urls);
                }
            }
            Action::SetInputFiles { files } => {
                let names: Vec<String> = files
                    .iter()
                    .filter_map(|f| f.file_name().map(|n| format!("C:\\fakepath\\{}", n.to_string_lossy())))
                    .collect();
                s.input_values.insert(target.selector.clone(), names.join(", "));
            }
            _ => {}
        }
        Ok(())
    }

    fn wait_for(&mut self, page: PageId, target: &ElementQuery, state: ElementState, _timeout: Duration) -> Result<()> {
        let mut s = self.state();
        s.log.push(format!("wait_for {} {} {}", page.0, state.as_str(), target.selector));
        if s.broken.contains(&target.selector) {
            return Err(broken_pipe());
        }
        if s.stalled.contains(&target.selector) {
            return Err(timeout("wait_for"));
        }
        Ok(())
    }

    fn wait_for_attribute(
        &mut self,
        _page: PageId,
        target: &ElementQuery,
        name: &str,
        value: &str,
        _timeout: Duration,
    ) -> Result<()> {
        let s = self.state();
        let current = s
            .attributes
            .get(&(target.selector.clone(), name.to_string()))
            .and_then(|values| values.first().cloned().flatten());
        if current.as_deref() == Some(value) {
            Ok(())
        } else {
            Err(timeout("wait_for_attribute"))
        }
    }

    fn text(&mut self, _page: PageId, target: &ElementQuery, _timeout: Duration) -> Result<Option<String>> {
        let mut s = self.state();
        if let Some(next) = s.text_sequences.get_mut(&target.selector).and_then(VecDeque::pop_front) {
            return Ok(Some(next));
        }
        let index = target.nth.unwrap_or(0);
        Ok(s.texts.get(&target.selector).and_then(|t| t.get(index).cloned()))
    }

    fn all_texts(&mut self, _page: PageId, target: &ElementQuery) -> Result<Vec<String>> {
        Ok(self.state().texts.get(&target.selector).cloned().unwrap_or_default())
    }

    fn all_attributes(&mut self, _page: PageId, target: &ElementQuery, name: &str) -> Result<Vec<Option<String>>> {
        Ok(self
            .state()
            .attributes
            .get(&(target.selector.clone(), name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn count(&mut self, _page: PageId, target: &ElementQuery) -> Result<usize> {
        Ok(self.state().texts.get(&target.selector).map_or(0, Vec::len))
    }

    fn is_visible(&mut self, page: PageId, target: &ElementQuery, _timeout: Duration) -> Result<bool> {
        let mut s = self.state();
        s.log.push(format!("visible {} {}", page.0, target.selector));
        if s.broken.contains(&target.selector) {
            return Err(broken_pipe());
        }
        if let Some(remaining) = s.appear_after.get_mut(&target.selector) {
            if *remaining == 0 {
                return Ok(true);
            }
            *remaining -= 1;
            return Ok(false);
        }
        Ok(s.visible.contains(&target.selector))
    }

    fn attribute(&mut self, _page: PageId, target: &ElementQuery, name: &str, _timeout: Duration) -> Result<Option<String>> {
        Ok(self
            .state()
            .attributes
            .get(&(target.selector.clone(), name.to_string()))
            .and_then(|values| values.first().cloned().flatten()))
    }

    fn input_value(&mut self, _page: PageId, target: &ElementQuery, _timeout: Duration) -> Result<String> {
        Ok(self.state().input_values.get(&target.selector).cloned().unwrap_or_default())
    }

    fn expect_event(&mut self, page: PageId, kind: &EventKind) -> Result<ExpectationId> {
        let mut s = self.state();
        s.next_expectation += 1;
        let id = s.next_expectation;
        s.pending.insert(id, kind.clone());
        s.log.push(format!("expect {} {}", page.0, kind.name()));
        Ok(ExpectationId(id))
    }

    fn await_event(&mut self, id: ExpectationId, _timeout: Duration) -> Result<EventOutcome> {
        let mut s = self.state();
        s.log.push(format!("await {}", id.0));
        let kind = s.pending.remove(&id.0).ok_or_else(|| timeout("await"))?;
        match kind {
            EventKind::Download { dir, file_name } => {
                let (suggested, bytes) = s.downloads.pop_front().ok_or_else(|| timeout("await"))?;
                let path = dir.join(file_name.unwrap_or_else(|| suggested.clone()));
                std::fs::write(&path, bytes)?;
                Ok(EventOutcome::Download {
                    suggested_filename: suggested,
                    path,
                })
            }
            _ => s.events.pop_front().ok_or_else(|| timeout("await")),
        }
    }

    fn cancel_event(&mut self, id: ExpectationId) -> Result<()> {
        let mut s = self.state();
        s.pending.remove(&id.0);
        s.log.push(format!("cancel {}", id.0));
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        let mut s = self.state();
        s.quit = true;
        s.log.push("quit".to_string());
        match s.quit_error.clone() {
            Some(error) => Err(HarnessError::DriverIo(error)),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Launches a fresh [`FakeDriver`] from a template per session and keeps a
/// handle on every session's state.
pub struct FakeSessionFactory {
    template: FakeState,
    sessions: Mutex<Vec<Arc<Mutex<FakeState>>>>,
}

impl FakeSessionFactory {
    pub fn new(template: FakeState) -> Self {
        FakeSessionFactory {
            template,
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn launched(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn session(&self, index: usize) -> Arc<Mutex<FakeState>> {
        Arc::clone(&self.sessions.lock().unwrap()[index])
    }
}

impl SessionFactory for FakeSessionFactory {
    fn launch(&self) -> Result<Box<dyn Driver>> {
        let (driver, state) = FakeDriver::new(self.template.clone());
        self.sessions.lock().unwrap().push(state);
        Ok(Box::new(driver))
    }
}
