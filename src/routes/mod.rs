mod auth;
mod health_check;
mod users;

pub use auth::{login, logout, refresh, register, removal_cookie, session_cookie, SESSION_COOKIE};
pub use health_check::health_check;
pub use users::{delete_user, get_user, grant_role, list_users, who_am_i};
