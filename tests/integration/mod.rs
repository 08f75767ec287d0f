//! Integration tests for the SEI API
//!
//! These tests verify the behavior of the API endpoints with a real
//! (temporary) database and all middleware.

mod activity_log_tests;
mod api_tests;
mod product_tests;
mod report_tests;
