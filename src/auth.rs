use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::AppError,
    models::Admin,
    repository::RepositoryState,
};

/// Name of the cookie that carries the session token for browser clients.
pub const AUTH_COOKIE: &str = "admin-token";

/// Claims
///
/// Payload of an admin session token. Signed with HS256 and the configured secret.
/// Lifetime is fixed at issuance; there is no refresh and no revocation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The admin's id.
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// AuthError
///
/// The two ways request validation fails. The display strings are what clients see.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// No bearer header and no session cookie.
    #[error("Unauthorized")]
    MissingToken,
    /// Malformed, expired, or signed with another key.
    #[error("Invalid token")]
    InvalidToken,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// issue_token
///
/// Signs a session token for `admin` that expires after `ttl`.
pub fn issue_token(
    admin: &Admin,
    secret: &str,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>), AppError> {
    let issued_at = Utc::now();
    let expires_at = issued_at + ttl;

    let claims = Claims {
        sub: admin.id,
        username: admin.username.clone(),
        role: admin.role.clone(),
        iat: issued_at.timestamp().max(0) as usize,
        exp: expires_at.timestamp().max(0) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign session token: {e}")))?;

    Ok((token, expires_at))
}

/// verify_token
///
/// Checks signature and expiry. Every failure collapses into `InvalidToken`.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = ?e.kind(), "rejected session token");
        AuthError::InvalidToken
    })
}

/// extract_token
///
/// Reads the token from `Authorization: Bearer ...`, falling back to the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == AUTH_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// validate_request
///
/// The request-level contract: the verified claims, or why the request is rejected.
pub fn validate_request(headers: &HeaderMap, secret: &str) -> Result<Claims, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::MissingToken)?;
    verify_token(&token, secret)
}

/// Builds the `Set-Cookie` value for a fresh session.
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{AUTH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that expires the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", Duration::zero(), secure)
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

/// A malformed hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// AuthAdmin
///
/// The resolved identity of an authenticated admin request.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

/// AuthAdmin extractor
///
/// 1. Validates the bearer/cookie token against the configured secret.
/// 2. Loads the admin row so that deactivated or removed accounts lose access even
///    while their token is still within its lifetime; the role comes from the row.
///
/// Rejects with `AppError::Unauthorized` ("Unauthorized" or "Invalid token").
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let claims = validate_request(&parts.headers, &config.jwt_secret)?;

        let admin = repo
            .find_admin_by_id(claims.sub)
            .await?
            .filter(|admin| admin.is_active)
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthAdmin {
            id: admin.id,
            username: admin.username,
            role: admin.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("admin-token=xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; admin-token=xyz; lang=id"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let headers = HeaderMap::new();
        assert_eq!(
            validate_request(&headers, "secret").unwrap_err(),
            AuthError::MissingToken
        );
    }

    #[test]
    fn round_trip_and_wrong_secret() {
        let admin = Admin {
            id: Uuid::from_u128(7),
            username: "AdminN0lder".to_string(),
            role: "admin".to_string(),
            is_active: true,
            ..Admin::default()
        };
        let (token, expires_at) = issue_token(&admin, "secret", Duration::hours(24)).unwrap();
        assert!(expires_at > Utc::now());

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.username, "AdminN0lder");

        assert_eq!(
            verify_token(&token, "other-secret").unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(verify_token("not-a-jwt", "secret").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn expired_token_is_invalid() {
        let admin = Admin {
            id: Uuid::from_u128(7),
            ..Admin::default()
        };
        let (token, _) = issue_token(&admin, "secret", Duration::hours(-2)).unwrap();
        assert_eq!(verify_token(&token, "secret").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn session_cookie_shape() {
        let cookie = session_cookie("tok", Duration::hours(1), true);
        assert!(cookie.starts_with("admin-token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }
}
