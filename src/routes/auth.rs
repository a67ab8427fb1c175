/// Authentication Routes
///
/// Registration, login, refresh and logout. The refresh token travels only in
/// the `jwt` cookie (HTTP-only, secure, `SameSite=None`, one day); the access
/// token travels in the response body.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::session::{LogoutOutcome, SessionManager};
use crate::validators::validate_registration;

pub const SESSION_COOKIE: &str = "jwt";

/// Registration request; missing fields are reported by validation.
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "password")]
    pub pwd: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "password")]
    pub pwd: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: String,
}

/// Body of a successful login or refresh
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub roles: Vec<i32>,
    pub access_token: String,
}

/// Session cookie carrying `value`, valid for `max_age_seconds`.
pub fn session_cookie(value: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Cookie instructing the client to drop the session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .finish();
    cookie.make_removal();
    cookie
}

fn session_token(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// POST /api/register
///
/// # Errors
/// - 400: first failing field (name, email, password)
/// - 409: email already registered
/// - 500: account could not be created
pub async fn register(
    form: web::Json<RegisterRequest>,
    session: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let input = validate_registration(&form.name, &form.email, &form.pwd)?;
    let id = session.register(input).await?;

    Ok(HttpResponse::Ok().json(RegisterResponse {
        success: format!("New user {} created!", id),
    }))
}

/// POST /api/login
///
/// # Errors
/// - 400: email or password missing
/// - 401: unknown email or wrong password (same response for both)
/// - 500: session could not be stored
pub async fn login(
    form: web::Json<LoginRequest>,
    session: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let outcome = session.login(form.email.trim(), &form.pwd).await?;
    let cookie = session_cookie(
        outcome.refresh_token,
        session.jwt_settings().refresh_token_expiry,
    );

    Ok(HttpResponse::Ok().cookie(cookie).json(TokenResponse {
        roles: outcome.roles,
        access_token: outcome.access_token,
    }))
}

/// GET /api/refresh
///
/// # Errors
/// - 401: no session cookie
/// - 403: cookie does not hold the account's current, valid refresh token
pub async fn refresh(
    req: HttpRequest,
    session: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req);
    let outcome = session.refresh(token.as_deref()).await?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        roles: outcome.roles,
        access_token: outcome.access_token,
    }))
}

/// POST /api/logout
///
/// Always 204. The cookie is cleared whenever one was presented.
pub async fn logout(req: HttpRequest, session: web::Data<SessionManager>) -> HttpResponse {
    let token = session_token(&req);

    match session.logout(token.as_deref()).await {
        LogoutOutcome::NoSession => HttpResponse::NoContent().finish(),
        LogoutOutcome::UnknownSession | LogoutOutcome::Revoked => {
            HttpResponse::NoContent().cookie(removal_cookie()).finish()
        }
    }
}
