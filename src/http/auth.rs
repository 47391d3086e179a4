//! Admin bearer-token verification.
//!
//! A thin collaborator, not part of the persistence core: decodes an HS256
//! JWT from the `Authorization` header and requires `role == "admin"`.
//! Missing/garbled/expired tokens are 401; a valid non-admin token is 403.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};

use super::{error_response, AppState};

/// Claims carried by an admin token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Subject (user id).
    #[serde(default)]
    pub sub: String,
    /// Role claim; must be `admin` for admin routes.
    #[serde(default)]
    pub role: String,
    /// Expiration time (seconds since epoch).
    pub exp: i64,
}

/// Authorization failures, each with its user-visible message.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No token, authorization denied")]
    Missing,

    #[error("Token expired, please login again")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Access denied. Admins only.")]
    Forbidden,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Verifies HS256 bearer tokens against a shared secret.
pub struct AdminAuth {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AdminAuth {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Check an `Authorization` header value and return the verified claims.
    pub fn verify_admin(&self, header: Option<&str>) -> Result<AdminClaims, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::Missing)?;

        let data: TokenData<AdminClaims> = decode(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })?;

        if data.claims.role != "admin" {
            return Err(AuthError::Forbidden);
        }
        Ok(data.claims)
    }
}

/// Route layer guarding admin-only endpoints.
pub(crate) async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.auth.verify_admin(header) {
        Ok(_claims) => next.run(request).await,
        Err(e) => error_response(e.status(), e.to_string()),
    }
}
