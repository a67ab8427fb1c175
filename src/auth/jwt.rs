/// Access Token Generation and Validation
///
/// HS256 tokens signed with the access-token secret. Validation checks the
/// signature, the issuer, and `exp` with no leeway.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{AccessClaims, UserInfo};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Generate an access token carrying `user_info`
///
/// `expiry_seconds` is passed explicitly because login and refresh mint
/// access tokens with different lifetimes.
///
/// # Errors
/// Returns error if token encoding fails
pub fn generate_access_token(
    user_info: UserInfo,
    expiry_seconds: i64,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = AccessClaims::new(user_info, expiry_seconds, config.issuer.clone());

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_token_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate and extract claims from an access token
///
/// # Errors
/// `AuthError::TokenInvalid` if the token is malformed, tampered with,
/// issued by someone else, or expired
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<AccessClaims, AuthError> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.access_token_secret.as_bytes()),
        &strict_validation(&config.issuer),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Access token rejected: {}", e);
        AuthError::TokenInvalid
    })
}

pub(crate) fn strict_validation(issuer: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.leeway = 0;
    validation
}
