//! Step definitions for Cucumber scenarios

pub mod common_steps;
pub mod playbook_steps;
pub mod product_steps;
pub mod report_steps;
