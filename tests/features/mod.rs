//! Cucumber scenarios
//!
//! Feature files live next to this module; steps drive the real router with
//! mocked aggregation collaborators.

pub mod step_definitions;
pub mod support;

pub use support::TestWorld;
