/// Refresh Token Management
///
/// Refresh tokens are signed JWTs (secret: `refresh_token_secret`) carrying
/// only the account email. The store keeps their SHA-256 digest, never the
/// token itself, and holds at most one per account: writing a new digest on
/// login is what revokes the previous session.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header};
use sha2::{Digest, Sha256};

use crate::auth::claims::RefreshClaims;
use crate::auth::jwt::strict_validation;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Generate a refresh token for `email`
pub fn generate_refresh_token(email: &str, config: &JwtSettings) -> Result<String, AppError> {
    let claims = RefreshClaims::new(
        email.to_string(),
        config.refresh_token_expiry,
        config.issuer.clone(),
    );

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Refresh token generation failed: {}", e)))
}

/// Validate a refresh token's signature, issuer and expiry
pub fn validate_refresh_token(token: &str, config: &JwtSettings) -> Result<RefreshClaims, AuthError> {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
        &strict_validation(&config.issuer),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Refresh token rejected: {}", e);
        AuthError::Forbidden
    })
}

/// SHA-256 hex digest under which a refresh token is stored
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
