use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::CurrentUser;
use crate::error::error_body;
use crate::middleware::auth::is_api_request;
use crate::models::Role;

/// Role allow-list attached to a route group at registration time
///
/// Routes without this layer accept any authenticated user.
#[derive(Clone, Copy, Debug)]
pub struct AllowedRoles(pub &'static [Role]);

/// Role-check middleware, layered after `require_auth`
pub async fn require_roles(
    State(AllowedRoles(allowed)): State<AllowedRoles>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    let Some(current) = req.extensions().get::<CurrentUser>() else {
        // Only reachable if the layer ordering is wrong; treat as unauthenticated
        tracing::warn!(path = %path, "Role check without authenticated user");
        return error_body(StatusCode::UNAUTHORIZED, "Please login first");
    };

    if !allowed.contains(&current.role()) {
        tracing::warn!(
            path = %path,
            user_id = %current.0.id,
            role = %current.role(),
            "Role not permitted for this operation"
        );
        return if is_api_request(&path) {
            error_body(StatusCode::FORBIDDEN, "Access denied: role not permitted")
        } else {
            Redirect::to("/access-denied").into_response()
        };
    }

    next.run(req).await
}
