/// Request authentication primitives
///
/// The API's auth layer takes the bearer token from the request, validates it
/// with [`super::jwt::validate_token`] and resolves the Hearth account it names,
/// creating it on first login. Handlers receive the result as an
/// [`AuthContext`] request extension.
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use hearth_shared::auth::{jwt::validate_token, middleware::{bearer_token, resolve_account, AuthContext, AuthError}};
/// use sqlx::PgPool;
///
/// async fn authenticate(pool: &PgPool, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
///     let token = bearer_token(headers)?;
///     let claims = validate_token(token, "jwt-secret-at-least-32-bytes-long", "hearth")?;
///     resolve_account(pool, &claims).await
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::jwt::{Claims, JwtError};
use crate::models::user::{CreateUser, User};

/// Authenticated caller, added to request extensions
///
/// ```
/// use axum::Extension;
/// use hearth_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {} ({})", auth.username, auth.email)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Hearth user ID
    pub user_id: Uuid,

    /// Username stored on the account
    pub username: String,

    /// Email from the token
    pub email: String,
}

impl From<User> for AuthContext {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Error type for request authentication
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// No database connection became available in time
    Unavailable,

    /// Account lookup failed
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::Unavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
            _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// # Errors
///
/// `MissingCredentials` without the header, `InvalidFormat` when it is not a
/// non-empty bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Resolves the account for validated claims, provisioning it on first login
pub async fn resolve_account(pool: &PgPool, claims: &Claims) -> Result<AuthContext, AuthError> {
    let data = CreateUser {
        username: claims.username().to_string(),
        email: claims.email.clone(),
    };

    let user = User::provision(pool, data)
        .await
        .map_err(|e| match e {
            sqlx::Error::PoolTimedOut => AuthError::Unavailable,
            e => {
                error!(error = %e, "Failed to resolve account for token");
                AuthError::DatabaseError(format!("Database error: {}", e))
            }
        })?;

    Ok(user.into())
}
