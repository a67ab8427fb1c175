/// JWT Claims structures
///
/// Access tokens carry the identity the gate needs (email, name, roles);
/// refresh tokens carry only the email. Both carry a random `jti` so that two
/// tokens minted in the same second are still distinct.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

const JTI_LENGTH: usize = 32;

/// Identity bundle nested under `UserInfo` in access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
    pub roles: Vec<i32>,
}

/// Claims of a short-lived access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    #[serde(rename = "UserInfo")]
    pub user_info: UserInfo,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

impl AccessClaims {
    pub fn new(user_info: UserInfo, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user_info,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
            jti: new_jti(),
        }
    }

    /// True if any of `allowed` is among the carried role codes.
    pub fn has_any_role(&self, allowed: &[i32]) -> bool {
        self.user_info.roles.iter().any(|code| allowed.contains(code))
    }
}

/// Claims of a long-lived refresh token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

impl RefreshClaims {
    pub fn new(email: String, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            email,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
            jti: new_jti(),
        }
    }
}

fn new_jti() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(JTI_LENGTH)
        .map(char::from)
        .collect()
}
