/// Bearer token verification
///
/// Tokens are issued by an external identity provider and signed with HS256
/// using a secret shared with this service. The `sub` claim carries the user
/// identifier that projects are owned by.
///
/// [`create_token`] exists so tests and local tooling can mint tokens; the
/// service itself only ever validates.
///
/// # Checks
///
/// - Signature (HS256)
/// - `exp` and `nbf`
/// - `iss` equals the configured issuer
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-development-secret-of-32-bytes!";
/// let claims = Claims::new("user-42", "taskboard");
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret, "taskboard")?;
/// assert_eq!(validated.sub, "user-42");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default token lifetime for [`Claims::new`]
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token could not be decoded at all
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Issuer did not match
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user identifier
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Email address, when the identity provider includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Claims for `user_id` valid for [`DEFAULT_TOKEN_LIFETIME_HOURS`]
    pub fn new(user_id: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self::with_expiration(user_id, issuer, Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS))
    }

    /// Claims with a custom lifetime
    ///
    /// A negative `expires_in` produces an already-expired token, which is
    /// handy in tests.
    pub fn with_expiration(
        user_id: impl Into<String>,
        issuer: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;
        let not_before = if expires_in < Duration::zero() {
            expiration
        } else {
            now
        };

        Self {
            sub: user_id.into(),
            iss: issuer.into(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: not_before.timestamp(),
            email: None,
        }
    }

    /// Attaches an email claim
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs `claims` with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates `token` and returns its claims
///
/// # Errors
///
/// - [`JwtError::Expired`] if `exp` is in the past
/// - [`JwtError::InvalidIssuer`] if `iss` is not `issuer`
/// - [`JwtError::InvalidFormat`] if the token is not a decodable JWT
/// - [`JwtError::ValidationError`] for any other failure, including a bad
///   signature
pub fn validate_token(token: &str, secret: &str, issuer: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: issuer.to_string(),
        },
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            JwtError::InvalidFormat(e.to_string())
        }
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
