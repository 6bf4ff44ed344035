pub mod driver;
pub mod event;
pub mod query;
pub mod session;
