use crate::error::Result;
use crate::export::validate::{verify_document_contains, verify_row_round_trip, verify_tables_match};
use crate::fixture::Fixtures;
use crate::page::table_export::ProductRow;
use crate::scenario::context::TestContext;

pub(super) fn dynamic_table_export(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let row: ProductRow = fx.data().get("dynamic_table.new_row")?;
    let dir = fx.downloads_dir()?;
    let columns = row.columns();
    let values: Vec<&str> = columns.iter().map(|(_, value)| *value).collect();

    ctx.step("open dynamic table");
    let mut page = fx.dynamic_table()?;
    page.open()?;

    ctx.step("add row");
    page.add_row(&row)?;

    ctx.step("export to Excel");
    let xlsx = page.export_excel(&dir)?;
    let table = xlsx.read_table()?;
    ctx.check_result("added row in Excel export", verify_row_round_trip(&table, &columns))?;

    ctx.step("export to CSV");
    let csv = page.export_csv(&dir)?;
    let table = csv.read_table()?;
    ctx.check_result("added row in CSV export", verify_row_round_trip(&table, &columns))?;

    ctx.step("export to PDF");
    let pdf = page.export_pdf(&dir)?;
    let document = pdf.read_text()?;
    ctx.check_result("added row in PDF export", verify_document_contains(&document, &values))?;

    for artifact in [xlsx, csv, pdf] {
        artifact.discard()?;
    }
    Ok(())
}

pub(super) fn static_table_export(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let validate_excel: bool = fx.data().get_or("static_table.validate_excel", true)?;
    let validate_pdf: bool = fx.data().get_or("static_table.validate_pdf", true)?;
    let expected_text: String = fx.data().get("static_table.expected_pdf_text")?;
    let dir = fx.downloads_dir()?;

    ctx.step("open static table");
    let mut page = fx.static_table()?;
    page.open()?;
    let rendered = page.table()?;
    ctx.check("static table has rows", !rendered.rows.is_empty())?;

    if validate_excel {
        ctx.step("export to Excel");
        let xlsx = page.export_excel(&dir)?;
        let exported = xlsx.read_table()?;
        ctx.check_result("Excel export matches rendered table", verify_tables_match(&rendered, &exported))?;
        xlsx.discard()?;
    }

    if validate_pdf {
        ctx.step("export to PDF");
        let pdf = page.export_pdf(&dir)?;
        let document = pdf.read_text()?;
        ctx.check_result(
            "PDF export contains report text",
            verify_document_contains(&document, &[expected_text.as_str()]),
        )?;
        pdf.discard()?;
    }
    Ok(())
}
