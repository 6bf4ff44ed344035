use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::browser::driver::{Action, EventKind, EventOutcome};
use crate::browser::query::ElementQuery;
use crate::error::{HarnessError, Result};
use crate::export::document::DocumentText;
use crate::export::normalize::fingerprint;
use crate::export::table::Table;
use crate::page::{PageContext, ready};

const FILE_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// xlsx / xls / ods workbooks
    Spreadsheet,
    /// Comma-separated values
    Csv,
    Pdf,
    /// Plain UTF-8 text
    Text,
}

impl ExportFormat {
    /// Infer the format from a file extension; unknown extensions read as text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => ExportFormat::Spreadsheet,
            "csv" => ExportFormat::Csv,
            "pdf" => ExportFormat::Pdf,
            _ => ExportFormat::Text,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "spreadsheet",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "text",
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, ExportFormat::Spreadsheet | ExportFormat::Csv)
    }
}

/// A file the application under test produced, saved on local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub format: ExportFormat,
    /// Name the browser proposed for the download, when there was one
    pub suggested_filename: Option<String>,
    pub size: u64,
    /// Hex SHA-1 of the file contents
    pub sha1: String,
}

impl ExportArtifact {
    /// Describe a file already on disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HarnessError::ArtifactMissing {
                    path: path.to_path_buf(),
                    waited_ms: 0,
                });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(ExportArtifact {
            path: path.to_path_buf(),
            format: ExportFormat::from_path(path),
            suggested_filename: None,
            size: bytes.len() as u64,
            sha1: fingerprint(&bytes),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Parse a tabular artifact: first sheet of a workbook, or a CSV file.
    pub fn read_table(&self) -> Result<Table> {
        match self.format {
            ExportFormat::Spreadsheet => Table::from_xlsx(&self.path),
            ExportFormat::Csv => Table::from_csv(&self.path),
            other => Err(HarnessError::Decode {
                format: other.label().to_string(),
                path: self.path.clone(),
                reason: "not a tabular format".into(),
            }),
        }
    }

    /// Extract the text of a document artifact.
    pub fn read_text(&self) -> Result<DocumentText> {
        match self.format {
            ExportFormat::Pdf => DocumentText::from_pdf(&self.path),
            ExportFormat::Text | ExportFormat::Csv => DocumentText::from_text_file(&self.path),
            ExportFormat::Spreadsheet => Err(HarnessError::Decode {
                format: self.format.label().to_string(),
                path: self.path.clone(),
                reason: "binary workbook has no plain text form".into(),
            }),
        }
    }

    /// Delete the file. A file that is already gone is not an error.
    pub fn discard(self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Wait until `path` exists as a file. An empty file counts as present;
/// content checks decide whether it is wrong.
pub fn wait_for_file(path: &Path, timeout: Duration) -> Result<()> {
    let start = Instant::now();
    loop {
        if fs::metadata(path).is_ok_and(|m| m.is_file()) {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(HarnessError::ArtifactMissing {
                path: path.to_path_buf(),
                waited_ms: timeout.as_millis() as u64,
            });
        }
        thread::sleep(FILE_POLL_INTERVAL);
    }
}

/// Click `trigger`, capture the download it starts, and save it into `dir`.
///
/// The download listener is registered before the click. A trigger that never
/// becomes clickable is [`HarnessError::ElementNotReady`]; a download that never
/// arrives or never lands on disk is [`HarnessError::ArtifactMissing`].
pub fn capture_download(
    ctx: &mut PageContext<'_>,
    operation: &str,
    trigger: &ElementQuery,
    dir: &Path,
    file_name: Option<&str>,
) -> Result<ExportArtifact> {
    fs::create_dir_all(dir)?;
    let wait = ctx.timeouts().download();
    let action_timeout = ctx.timeouts().action();
    let page = ctx.page();
    let expected_path = dir.join(file_name.unwrap_or("<suggested>"));

    let pending = ctx.expect(EventKind::Download {
        dir: dir.to_path_buf(),
        file_name: file_name.map(str::to_string),
    })?;
    let outcome = pending.trigger(wait, |driver| {
        ready(
            operation,
            &format!("{} to be actionable", trigger),
            driver.act(page, trigger, &Action::click(), action_timeout),
        )
    });

    let (suggested, path) = match outcome {
        Ok(EventOutcome::Download {
            suggested_filename,
            path,
        }) => (suggested_filename, path),
        Ok(other) => {
            return Err(HarnessError::Driver {
                command: operation.to_string(),
                error: format!("expected a download, got {:?}", other),
            });
        }
        Err(e) if e.is_timeout() => {
            return Err(HarnessError::ArtifactMissing {
                path: expected_path,
                waited_ms: wait.as_millis() as u64,
            });
        }
        Err(e) => return Err(e),
    };
    debug!(operation, path = %path.display(), "download event received");

    wait_for_file(&path, wait)?;
    let mut artifact = ExportArtifact::from_file(&path)?;
    artifact.suggested_filename = Some(suggested);
    info!(
        operation,
        path = %artifact.path.display(),
        format = artifact.format.label(),
        size = artifact.size,
        "artifact captured"
    );
    Ok(artifact)
}
