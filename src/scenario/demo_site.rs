use std::path::PathBuf;

use crate::error::{HarnessError, Result};
use crate::export::artifact::ExportFormat;
use crate::fixture::Fixtures;
use crate::page::drag_drop::DragItem;
use crate::scenario::context::TestContext;

pub(super) fn alerts(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let alert_message: String = fx.data().get("alerts.alert_message")?;
    let confirm_message: String = fx.data().get("alerts.confirm_message")?;
    let prompt_message: String = fx.data().get("alerts.prompt_message")?;
    let answer: String = fx.data().get("alerts.prompt_answer")?;

    ctx.step("open alerts");
    let mut page = fx.alerts()?;
    page.open()?;

    ctx.step("accept alert");
    let seen = page.accept_alert()?;
    ctx.check_eq("dialog type", "alert", seen.dialog_type.as_str())?;
    ctx.check_eq("alert message", alert_message.as_str(), seen.message.as_str())?;

    ctx.step("dismiss confirm");
    let seen = page.answer_confirm(false)?;
    ctx.check_eq("dialog type", "confirm", seen.dialog_type.as_str())?;
    ctx.check_contains("confirm message", &seen.message, confirm_message.trim_end_matches([' ', '!']))?;
    let result = page.confirm_result()?;
    ctx.check_contains("confirm result", &result, "Cancel")?;

    ctx.step("answer prompt");
    let seen = page.answer_prompt(Some(&answer))?;
    ctx.check_eq("dialog type", "prompt", seen.dialog_type.as_str())?;
    ctx.check_eq("prompt message", prompt_message.as_str(), seen.message.as_str())?;
    let result = page.prompt_result()?;
    ctx.check_contains("prompt result", &result, &answer)?;

    ctx.step("dismiss prompt");
    let seen = page.answer_prompt(None)?;
    ctx.check_eq("prompt message", prompt_message.as_str(), seen.message.as_str())
}

pub(super) fn file_download(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let text: String = fx.data().get("file_download.text")?;
    let dir = fx.downloads_dir()?;

    ctx.step("open file download");
    let mut page = fx.file_download()?;
    page.open()?;

    ctx.step("generate file");
    page.enter_text(&text)?;
    page.create_file()?;

    ctx.step("download file");
    let artifact = page.download(&dir)?;
    ctx.check_eq("downloaded file format", ExportFormat::Text, artifact.format)?;
    let document = artifact.read_text()?;
    ctx.check_eq("downloaded file content", text.trim(), document.raw().trim())?;
    artifact.discard()
}

pub(super) fn file_upload(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let file: PathBuf = fx.data().get("file_upload.file")?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| HarnessError::TestData {
            key: "file_upload.file".into(),
            reason: format!("{} has no file name", file.display()),
        })?;
    if !file.is_file() {
        return Err(HarnessError::TestData {
            key: "file_upload.file".into(),
            reason: format!("{} does not exist", file.display()),
        });
    }

    ctx.step("open file upload");
    let mut page = fx.file_upload()?;
    page.open()?;

    ctx.step("attach file");
    page.attach(&file)?;
    let attached = page.is_attached(&file_name)?;
    ctx.check(format!("{} attached", file_name), attached)?;

    ctx.step("remove file");
    page.remove()?;
    let hidden = page.preview_hidden()?;
    ctx.check("preview removed", hidden)?;

    ctx.step("clear file input");
    page.clear()?;
    let value = page.attached_value()?;
    ctx.check_eq("file input value", "", value.as_str())
}

pub(super) fn drag_and_drop(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    ctx.step("open drag and drop");
    let mut page = fx.drag_and_drop()?;
    page.open()?;

    ctx.step("drag every logo");
    for item in DragItem::ALL {
        page.drag(item)?;
    }

    ctx.step("check drop area");
    for item in DragItem::ALL {
        let dropped = page.is_dropped(item)?;
        ctx.check(format!("{} in drop area", item.id()), dropped)?;
    }
    Ok(())
}
