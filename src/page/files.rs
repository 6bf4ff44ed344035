use std::path::Path;

use crate::browser::driver::{Action, ElementState};
use crate::browser::query::ElementQuery;
use crate::error::Result;
use crate::export::artifact::{capture_download, ExportArtifact};
use crate::fixture::config::Sites;
use crate::page::PageContext;

const MORE: &str = r#"//a[text()="More"]"#;
const FILE_DOWNLOAD: &str = r#"//a[text()="File Download"]"#;
const FILE_UPLOAD: &str = r#"//a[text()="File Upload"]"#;

const TEXT_BOX: &str = "#textbox";
const CREATE_TEXT: &str = "#createTxt";
const DOWNLOAD_LINK: &str = "#link-to-download";

const FILE_INPUT: &str = r#"//*[@id="input-4"]"#;
const REMOVE: &str = r#"//span[text()="Remove"]"#;
const PREVIEW: &str = r#"div[id^="preview-"]:not([id*="zoom"])"#;

fn open_from_more_menu(ctx: &mut PageContext<'_>, entry: &str, marker: &str) -> Result<()> {
    let url = Sites::join(&ctx.config().sites.automation_demo, "Windows.html");
    ctx.open(&url)?;
    let operation = format!("open {}", entry);
    ctx.click(&operation, &ElementQuery::new(MORE))?;
    ctx.click(&operation, &ElementQuery::new(entry))?;
    ctx.wait_for(&operation, &ElementQuery::new(marker), ElementState::Attached)
}

// ============================================================================
// File download
// ============================================================================

/// Generates a text file from typed input and downloads it.
pub struct FileDownloadPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> FileDownloadPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        FileDownloadPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_from_more_menu(&mut self.ctx, FILE_DOWNLOAD, TEXT_BOX)
    }

    pub fn enter_text(&mut self, data: &str) -> Result<()> {
        let text_box = ElementQuery::new(TEXT_BOX);
        self.ctx.fill("enter download text", &text_box, data)?;
        self.ctx.perform("enter download text", &text_box, &Action::press("Enter"))
    }

    pub fn create_file(&mut self) -> Result<()> {
        let create = ElementQuery::new(CREATE_TEXT);
        self.ctx.expect_visible("create text file", &create)?;
        self.ctx.click("create text file", &create)?;
        self.ctx.expect_visible("create text file", &ElementQuery::new(DOWNLOAD_LINK))
    }

    /// Download the generated file into `dir` under its suggested name.
    pub fn download(&mut self, dir: &Path) -> Result<ExportArtifact> {
        capture_download(&mut self.ctx, "download text file", &ElementQuery::new(DOWNLOAD_LINK), dir, None)
    }
}

// ============================================================================
// File upload
// ============================================================================

pub struct FileUploadPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> FileUploadPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        FileUploadPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_from_more_menu(&mut self.ctx, FILE_UPLOAD, FILE_INPUT)
    }

    pub fn attach(&mut self, file: &Path) -> Result<()> {
        self.ctx.perform(
            "attach file",
            &ElementQuery::new(FILE_INPUT),
            &Action::SetInputFiles {
                files: vec![file.to_path_buf()],
            },
        )
    }

    /// The file input's value (browsers report a fake path plus the name).
    pub fn attached_value(&mut self) -> Result<String> {
        self.ctx.input_value("read attached file", &ElementQuery::new(FILE_INPUT))
    }

    pub fn is_attached(&mut self, file_name: &str) -> Result<bool> {
        Ok(self.attached_value()?.contains(file_name))
    }

    /// Empty the file input without going through the widget.
    pub fn clear(&mut self) -> Result<()> {
        self.ctx.perform(
            "clear file input",
            &ElementQuery::new(FILE_INPUT),
            &Action::SetInputFiles { files: Vec::new() },
        )
    }

    pub fn remove(&mut self) -> Result<()> {
        self.ctx.click("remove attached file", &ElementQuery::new(REMOVE))
    }

    pub fn preview_hidden(&mut self) -> Result<bool> {
        Ok(!self.ctx.is_visible_now(&ElementQuery::new(PREVIEW))?)
    }
}
