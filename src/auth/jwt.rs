//! JWT token generation and validation

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::{Role, User};

/// JWT claims payload
///
/// Besides the subject, the token carries the role and display name so
/// callers can read them without a store lookup. Liveness (the token not
/// having been revoked) is still the session store's call.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Role at issuance time
    pub role: Role,
    /// Display name
    pub name: String,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    /// Expiration timestamp (seconds)
    pub exp: i64,
}

/// Generate a signed token for a user
pub fn generate_token(user: &User, secret: &str, lifetime_seconds: i64) -> anyhow::Result<String> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role,
        name: user.name.clone(),
        iat: now,
        exp: now.saturating_add(lifetime_seconds),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate and decode a token
///
/// Malformed, tampered and expired tokens all collapse to `None`; the
/// caller only ever sees valid claims or a single failure signal.
pub fn validate_token(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}
