//! Credential plumbing: token issue/verify, password hashing, cookie helpers.

pub mod jwt;
pub mod password;

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::models::{Role, User};

/// Name of the HTTP-only cookie carrying the bearer token for browsers
pub const AUTH_COOKIE_NAME: &str = "AUTH_TOKEN";

/// The authenticated caller, resolved once per request by the auth
/// middleware and carried as a request extension. It lives exactly as long
/// as the request, so it is released on every exit path. Handlers read it
/// via `Extension<CurrentUser>`; credentials never travel through call
/// parameters.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn role(&self) -> Role {
        self.0.role
    }
}

/// Extract the bearer token from a request
///
/// The `Authorization: Bearer <token>` header wins; the auth cookie is the
/// browser fallback.
pub fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    jar.get(AUTH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Build the HTTP-only session cookie set on login
pub fn build_auth_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

/// Build the expired cookie that clears the session on logout
pub fn clear_auth_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(AUTH_COOKIE_NAME);
    cookie.set_path("/");
    cookie
}
