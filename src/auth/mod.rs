/// Authentication module
///
/// Password hashing, access/refresh token issuing and verification.

mod claims;
mod jwt;
mod password;
mod refresh_token;

pub use claims::{AccessClaims, RefreshClaims, UserInfo};
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::hash_token;
pub use refresh_token::validate_refresh_token;
