/// Middleware module
///
/// Role-based access control for protected routes.

mod role_guard;

pub use role_guard::{bearer_token, RequireRoles};
