//! Admin authentication configuration.

use serde::Deserialize;

/// Bearer-token verification configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for verifying admin JWTs. Required at startup.
    pub jwt_secret: String,
}
