//! Per-test composition: run configuration, shared test data, and the lazy
//! registry that builds sessions, pages and download namespaces on demand.

pub mod config;
pub mod data;
pub mod registry;

pub use config::HarnessConfig;
pub use data::TestDataSet;
pub use registry::{Fixtures, MAIL_PAGE, PRIMARY_PAGE};
