/// Request authentication
///
/// Extracts the bearer token from the `Authorization` header, validates it
/// and produces the [`AuthContext`] that handlers read from request
/// extensions.
///
/// The axum layer itself lives in the API crate so it can render failures
/// with the API's error body; this module only holds the framework-neutral
/// pieces.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use taskboard_shared::auth::jwt::{create_token, Claims};
/// use taskboard_shared::auth::middleware::authenticate;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-development-secret-of-32-bytes!";
/// let token = create_token(&Claims::new("user-42", "taskboard"), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
///
/// let auth = authenticate(&headers, secret, "taskboard")?;
/// assert_eq!(auth.user_id, "user-42");
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, JwtError};

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// User identifier from the token subject
    pub user_id: String,

    /// Email claim, if present
    pub email: Option<String>,
}

impl AuthContext {
    /// True if `user_id` names the authenticated caller
    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("{0}")]
    InvalidToken(String),
}

/// Pulls the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Validates the bearer token in `headers`
pub fn authenticate(headers: &HeaderMap, secret: &str, issuer: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, secret, issuer).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext {
        user_id: claims.sub,
        email: claims.email,
    })
}
