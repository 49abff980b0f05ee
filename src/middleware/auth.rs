use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::{extract_token, jwt::validate_token, CurrentUser};
use crate::error::error_body;
use crate::queries::{session, user};
use crate::routes::AppState;

/// Authentication middleware guarding every protected route
///
/// Per request: extract the credential (Authorization header first, auth
/// cookie as fallback), verify the token signature and expiry, confirm the
/// session is still live in the store, load the user, then insert
/// `CurrentUser` into the request extensions for the handler. Any failure
/// short-circuits with 401 before business logic runs.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    let Some(token) = extract_token(req.headers(), &jar) else {
        tracing::warn!(path = %path, "Missing credential");
        return unauthorized(&path, "Please login first");
    };

    // Signature + expiry; malformed tokens collapse to the same failure
    let Some(claims) = validate_token(&token, &state.config.jwt.secret) else {
        tracing::warn!(path = %path, "Invalid or expired token");
        return unauthorized(&path, "Please login first");
    };

    let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
        tracing::warn!(path = %path, "Token subject is not a user id");
        return unauthorized(&path, "Please login first");
    };

    // Second factor: a verified token that was revoked must still fail
    match session::find_session(&state.pool, user_id, &token).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(user_id = %user_id, "Token not found in session store");
            return unauthorized(&path, "Session ended");
        }
        Err(e) => {
            tracing::error!(error = %e, "Session lookup failed");
            return unauthorized(&path, "Session ended");
        }
    }

    let user = match user::get_user(&state.pool, user_id).await {
        Ok(Some(user)) if user.enabled => user,
        Ok(_) => {
            tracing::warn!(user_id = %user_id, "User missing or disabled");
            return unauthorized(&path, "User is not active");
        }
        Err(e) => {
            tracing::error!(error = %e, "User lookup failed");
            return unauthorized(&path, "User is not active");
        }
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

/// 401 response shaping: structured JSON for API callers, a login redirect
/// for browser paths. Shaping never affects the auth decision itself.
fn unauthorized(path: &str, message: &str) -> Response {
    if is_api_request(path) {
        error_body(StatusCode::UNAUTHORIZED, message)
    } else {
        Redirect::to("/login?error=auth_required").into_response()
    }
}

pub(crate) fn is_api_request(path: &str) -> bool {
    path.starts_with("/api/")
}
