//! Role-based route guards
//!
//! Every protected router attaches a guard with the role set it requires.
//! The guard runs after [`auth_middleware`](super::auth::auth_middleware)
//! and rejects before the handler body executes.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::{models::AccessRole, utils::error::ErrorResponse};

use super::auth::AuthUser;

/// Access error types
#[derive(Debug)]
pub enum AccessError {
    /// User is not authenticated
    NotAuthenticated,
    /// User holds none of the allowed roles
    Denied,
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AccessError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required",
            ),
            AccessError::Denied => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Insufficient role for this operation",
            ),
        };

        (status, Json(ErrorResponse::new(error_type, message))).into_response()
    }
}

/// Reject the request unless the user holds one of `allowed`
pub async fn require_roles(
    allowed: &'static [AccessRole],
    request: Request,
    next: Next,
) -> Result<Response, AccessError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AccessError::NotAuthenticated)?;

    if !auth_user.has_any_role(allowed) {
        tracing::debug!(
            user = %auth_user.id,
            company = %auth_user.company,
            "Rejected request: missing role"
        );
        return Err(AccessError::Denied);
    }

    Ok(next.run(request).await)
}

/// Create a route layer that requires one of the given roles
///
/// Usage:
/// ```ignore
/// Router::new()
///     .route("/list", post(list))
///     .route_layer(require_roles!(models::REPORT_ROLES))
/// ```
#[macro_export]
macro_rules! require_roles {
    ($roles:expr) => {
        axum::middleware::from_fn(
            move |req: axum::extract::Request, next: axum::middleware::Next| {
                $crate::middleware::access::require_roles($roles, req, next)
            },
        )
    };
}
