/// JWT validation for bearer tokens
///
/// Hearth does not run a login flow of its own. Callers present an HS256 token
/// signed with a secret shared with the identity provider; the token names the
/// user by email and carries the nickname used as username on first login.
///
/// # Checks
///
/// - **Algorithm**: HS256 only
/// - **Signature**: against the configured secret
/// - **Expiry / not-before**: `exp` and `nbf`
/// - **Issuer**: must equal the configured issuer
///
/// # Example
///
/// ```
/// use hearth_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
///
/// let claims = Claims::new("auth0|123", "alice@x.com", "alice", "hearth");
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret, "hearth")?;
/// assert_eq!(validated.email, "alice@x.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of tokens minted by [`Claims::new`]
pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Issuer did not match
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },

    /// Token lacks a usable identity
    #[error("Token is missing the {0} claim")]
    MissingClaim(&'static str),
}

/// Bearer token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject at the identity provider
    pub sub: String,

    /// Email address; identifies the Hearth account
    pub email: String,

    /// Nickname; becomes the username when the account is provisioned
    #[serde(default)]
    pub nickname: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Claims valid for [`DEFAULT_TOKEN_LIFETIME_HOURS`]
    pub fn new(
        sub: impl Into<String>,
        email: impl Into<String>,
        nickname: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self::with_expiration(
            sub,
            email,
            nickname,
            issuer,
            Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS),
        )
    }

    /// Claims valid for `expires_in`
    pub fn with_expiration(
        sub: impl Into<String>,
        email: impl Into<String>,
        nickname: impl Into<String>,
        issuer: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: sub.into(),
            email: email.into(),
            nickname: nickname.into(),
            iss: issuer.into(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Username to provision with: the nickname, or the email's local part
    /// when the provider sent no nickname
    pub fn username(&self) -> &str {
        let nickname = self.nickname.trim();
        if !nickname.is_empty() {
            return nickname;
        }

        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Signs claims with HS256
///
/// Hearth itself only validates tokens; this is used by tests and local
/// tooling to mint tokens the way the identity provider does.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its claims
///
/// # Errors
///
/// Returns an error if the signature, expiry, not-before or issuer check
/// fails, or if the token carries no email.
pub fn validate_token(token: &str, secret: &str, issuer: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: issuer.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    if token_data.claims.email.trim().is_empty() {
        return Err(JwtError::MissingClaim("email"));
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("auth0|1", "alice@x.com", "alice", "hearth");

        assert_eq!(claims.sub, "auth0|1");
        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims.iss, "hearth");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_LIFETIME_HOURS * 3600);
    }

    #[test]
    fn test_username_falls_back_to_email_local_part() {
        let claims = Claims::new("s", "bob@x.com", "  ", "hearth");
        assert_eq!(claims.username(), "bob");

        let claims = Claims::new("s", "bob@x.com", "bobby", "hearth");
        assert_eq!(claims.username(), "bobby");
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new("auth0|1", "alice@x.com", "alice", "hearth");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET, "hearth").expect("Should validate token");
        assert_eq!(validated.sub, "auth0|1");
        assert_eq!(validated.email, "alice@x.com");
        assert_eq!(validated.nickname, "alice");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new("s", "alice@x.com", "alice", "hearth");
        let token = create_token(&claims, SECRET).unwrap();

        assert!(validate_token(&token, "another-secret-key-at-least-32-bytes", "hearth").is_err());
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let claims = Claims::new("s", "alice@x.com", "alice", "someone-else");
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET, "hearth");
        assert!(matches!(result, Err(JwtError::InvalidIssuer { .. })));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(
            "s",
            "alice@x.com",
            "alice",
            "hearth",
            Duration::seconds(-3600),
        );
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET, "hearth");
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_rejects_blank_email() {
        let claims = Claims::new("s", " ", "alice", "hearth");
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET, "hearth");
        assert!(matches!(result, Err(JwtError::MissingClaim("email"))));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(validate_token("not.a.jwt", SECRET, "hearth").is_err());
    }
}
