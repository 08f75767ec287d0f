//! Middleware components
//!
//! This module contains middleware for:
//! - Authentication (JWT)
//! - Authorization (role guards)

pub mod access;
pub mod auth;

pub use access::{require_roles, AccessError};
pub use auth::{auth_middleware, AuthUser, Claims};
