pub mod console;
pub mod html;
pub mod junit;
pub mod report_model;

pub use report_model::TestSuiteReport;
