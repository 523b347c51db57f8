/// Authentication and authorization
///
/// # Modules
///
/// - [`jwt`]: HS256 bearer token validation and claims
/// - [`middleware`]: Bearer extraction, account resolution and the
///   per-request [`middleware::AuthContext`]
/// - [`authorization`]: House membership checks
///
/// Sessions and the login redirect belong to the identity provider; Hearth
/// only sees the resulting token.

pub mod authorization;
pub mod jwt;
pub mod middleware;
