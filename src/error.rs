use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The driver subprocess could not be started
    #[error("failed to spawn {program} {script} (is Node.js installed?): {source}")]
    DriverSpawn {
        program: String,
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// The driver pipe broke or returned nothing
    #[error("browser driver I/O: {0}")]
    DriverIo(String),

    /// The driver answered `ok: false` for a command
    #[error("browser driver rejected `{command}`: {error}")]
    Driver { command: String, error: String },

    /// A driver command gave up waiting
    #[error("`{command}` timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("YAML error ({context}): {source}")]
    Yaml {
        context: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A targeted element never reached the state a page operation needs
    #[error("{operation}: element not ready (expected {expected})")]
    ElementNotReady { operation: String, expected: String },

    /// An exported file never showed up on disk
    #[error("artifact {} did not materialize within {waited_ms}ms", path.display())]
    ArtifactMissing { path: PathBuf, waited_ms: u64 },

    /// Observed content differs from what the test expected
    #[error("{what}: expected {expected:?}, got {actual:?}")]
    ContentMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    /// The convergence checker ran out of corrective actions
    #[error("order did not converge after {actions} corrective actions in {passes} passes: {reason}")]
    ConvergenceExhausted {
        actions: usize,
        passes: usize,
        reason: String,
    },

    /// An artifact exists but could not be parsed
    #[error("unreadable {format} artifact {}: {reason}", path.display())]
    Decode {
        format: String,
        path: PathBuf,
        reason: String,
    },

    #[error("config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("test data `{key}`: {reason}")]
    TestData { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Stable label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::DriverSpawn { .. } => "driver_spawn",
            HarnessError::DriverIo(_) => "driver_io",
            HarnessError::Driver { .. } => "driver",
            HarnessError::Timeout { .. } => "timeout",
            HarnessError::Json { .. } => "json",
            HarnessError::Yaml { .. } => "yaml",
            HarnessError::ElementNotReady { .. } => "element_not_ready",
            HarnessError::ArtifactMissing { .. } => "artifact_missing",
            HarnessError::ContentMismatch { .. } => "content_mismatch",
            HarnessError::ConvergenceExhausted { .. } => "convergence_exhausted",
            HarnessError::Decode { .. } => "decode",
            HarnessError::Config { .. } => "config",
            HarnessError::TestData { .. } => "test_data",
            HarnessError::Io(_) => "io",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::Timeout { .. })
    }

    pub fn mismatch(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        HarnessError::ContentMismatch {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn not_ready(operation: impl Into<String>, expected: impl Into<String>) -> Self {
        HarnessError::ElementNotReady {
            operation: operation.into(),
            expected: expected.into(),
        }
    }
}
