//! Export round-trip validation: capture files the application produces,
//! parse them (xlsx, csv, pdf, text), and compare their content with the
//! values entered or rendered in the UI.

pub mod artifact;
pub mod document;
pub mod normalize;
pub mod table;
pub mod validate;

pub use artifact::{capture_download, ExportArtifact, ExportFormat};
pub use document::DocumentText;
pub use table::Table;
pub use validate::{verify_document_contains, verify_row_round_trip, verify_tables_match};
