use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::browser::query::ElementQuery;
use crate::error::Result;
use crate::export::artifact::{capture_download, ExportArtifact};
use crate::export::table::Table;
use crate::fixture::config::Sites;
use crate::page::PageContext;

const DYNAMIC_TABLE_LINK: &str = r#"//a[@href="/components/dynamic-table-export"]"#;
const NAME_INPUT: &str = r#"//input[@placeholder="Name"]"#;
const CATEGORY_INPUT: &str = r#"//input[@placeholder="Category"]"#;
const PRICE_INPUT: &str = r#"//input[@placeholder="Price"]"#;
const STOCK_INPUT: &str = r#"//input[@placeholder="Stock"]"#;
const ADD_ROW: &str = r#"//button[text()="➕ Add Row"]"#;
const TABLE_ROW: &str = "tbody tr";

const EXPORT_EXCEL: &str = r#"//button[text()="📊 Export to Excel"]"#;
const EXPORT_CSV: &str = r#"//button[text()="📄 Export to CSV"]"#;
const EXPORT_PDF: &str = r#"//a[text()="📋 Export to PDF"]"#;

const STATIC_TABLE_PATH: &str = "components/static-table-export";
const STATIC_HEADERS: &str = r#"//div[@class="overflow-x-auto"]//thead/tr/th"#;
const STATIC_ROWS: &str = r#"//div[@class="overflow-x-auto"]//tbody/tr"#;

/// One product row of the dynamic table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: String,
}

impl ProductRow {
    /// Column name / value pairs, as the table's headers spell them.
    pub fn columns(&self) -> [(&str, &str); 4] {
        [
            ("name", self.name.as_str()),
            ("category", self.category.as_str()),
            ("price", self.price.as_str()),
            ("stock", self.stock.as_str()),
        ]
    }
}

fn read_rendered_table(ctx: &mut PageContext<'_>, headers: &str, rows: &str) -> Result<Table> {
    let headers = ctx.texts(&ElementQuery::new(headers))?;
    let row_count = ctx.count(&ElementQuery::new(rows))?;
    let mut cells = Vec::with_capacity(row_count);
    for i in 0..row_count {
        cells.push(ctx.texts(&ElementQuery::new(format!("({})[{}]/td", rows, i + 1)))?);
    }
    Ok(Table::new(headers, cells))
}

// ============================================================================
// Dynamic table
// ============================================================================

/// Editable product table with xlsx, csv and pdf export.
pub struct DynamicTablePage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> DynamicTablePage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        DynamicTablePage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        let url = Sites::join(&self.ctx.config().sites.components, "components");
        self.ctx.open(&url)?;
        self.ctx.click("open dynamic table", &ElementQuery::new(DYNAMIC_TABLE_LINK))?;
        self.ctx.expect_visible("open dynamic table", &ElementQuery::new(NAME_INPUT))
    }

    /// Fill the entry form, add the row, and wait for it to render.
    pub fn add_row(&mut self, row: &ProductRow) -> Result<()> {
        let operation = format!("add row {:?}", row.name);
        for (selector, value) in [
            (NAME_INPUT, &row.name),
            (CATEGORY_INPUT, &row.category),
            (PRICE_INPUT, &row.price),
            (STOCK_INPUT, &row.stock),
        ] {
            self.ctx.fill(&operation, &ElementQuery::new(selector), value)?;
        }
        self.ctx.click(&operation, &ElementQuery::new(ADD_ROW))?;
        self.ctx.expect_visible(
            &operation,
            &ElementQuery::new(TABLE_ROW).with_text(row.name.clone()).first(),
        )
    }

    pub fn export_excel(&mut self, dir: &Path) -> Result<ExportArtifact> {
        self.export("export to excel", EXPORT_EXCEL, dir, "exported_table.xlsx")
    }

    pub fn export_csv(&mut self, dir: &Path) -> Result<ExportArtifact> {
        self.export("export to csv", EXPORT_CSV, dir, "exported_table.csv")
    }

    pub fn export_pdf(&mut self, dir: &Path) -> Result<ExportArtifact> {
        self.export("export to pdf", EXPORT_PDF, dir, "exported_table.pdf")
    }

    fn export(&mut self, operation: &str, trigger: &str, dir: &Path, file_name: &str) -> Result<ExportArtifact> {
        capture_download(&mut self.ctx, operation, &ElementQuery::new(trigger), dir, Some(file_name))
    }
}

// ============================================================================
// Static table
// ============================================================================

/// Read-only employee table with xlsx and pdf export.
pub struct StaticTablePage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> StaticTablePage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        StaticTablePage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        let url = Sites::join(&self.ctx.config().sites.components, STATIC_TABLE_PATH);
        self.ctx.open(&url)?;
        self.ctx.wait_for_url("static-table-export")?;
        self.ctx
            .expect_visible("open static table", &ElementQuery::new(STATIC_HEADERS).first())
    }

    /// Headers and rows exactly as rendered.
    pub fn table(&mut self) -> Result<Table> {
        read_rendered_table(&mut self.ctx, STATIC_HEADERS, STATIC_ROWS)
    }

    pub fn export_excel(&mut self, dir: &Path) -> Result<ExportArtifact> {
        capture_download(
            &mut self.ctx,
            "export to excel",
            &ElementQuery::new(EXPORT_EXCEL),
            dir,
            Some("static_employee_data.xlsx"),
        )
    }

    pub fn export_pdf(&mut self, dir: &Path) -> Result<ExportArtifact> {
        capture_download(
            &mut self.ctx,
            "export to pdf",
            &ElementQuery::new(EXPORT_PDF),
            dir,
            Some("employee_data_report.pdf"),
        )
    }
}
