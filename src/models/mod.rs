//! Data models

mod access;
mod activity_log;
mod aggregation;
mod config_table;
mod delete;
mod list_request;
mod org_unit;
mod pagination;
mod product;
mod runbook;

pub use access::*;
pub use activity_log::*;
pub use aggregation::*;
pub use config_table::*;
pub use delete::*;
pub use list_request::*;
pub use org_unit::*;
pub use pagination::*;
pub use product::*;
pub use runbook::*;
