/// User administration routes
///
/// Mounted behind `RequireRoles`; handlers can read the verified
/// `AccessClaims` from request extensions.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::{AccountView, Role};
use crate::auth::AccessClaims;
use crate::error::AppError;
use crate::store::CredentialStore;

#[derive(Serialize)]
pub struct WhoAmIResponse {
    pub email: String,
    pub name: String,
    pub roles: Vec<i32>,
}

/// GET /users
pub async fn list_users(
    store: web::Data<dyn CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let accounts = store.list().await?;
    let views: Vec<AccountView> = accounts.iter().map(AccountView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

/// GET /users/{id}
pub async fn get_user(
    path: web::Path<Uuid>,
    store: web::Data<dyn CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let account = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User ID {} not found", id)))?;

    Ok(HttpResponse::Ok().json(AccountView::from(&account)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    path: web::Path<Uuid>,
    store: web::Data<dyn CredentialStore>,
    claims: web::ReqData<AccessClaims>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !store.delete(id).await? {
        return Err(AppError::NotFound(format!("User ID {} not found", id)));
    }

    tracing::info!(
        account_id = %id,
        deleted_by = %claims.user_info.email,
        "Account deleted"
    );
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Deserialize)]
pub struct GrantRoleRequest {
    pub role: Role,
}

/// POST /users/{id}/roles
///
/// Takes effect in the account's next refreshed access token.
pub async fn grant_role(
    path: web::Path<Uuid>,
    body: web::Json<GrantRoleRequest>,
    store: web::Data<dyn CredentialStore>,
    claims: web::ReqData<AccessClaims>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let role = body.into_inner().role;
    if !store.grant_role(id, role).await? {
        return Err(AppError::NotFound(format!("User ID {} not found", id)));
    }

    tracing::info!(
        account_id = %id,
        role = ?role,
        granted_by = %claims.user_info.email,
        "Role granted"
    );
    Ok(HttpResponse::NoContent().finish())
}

/// GET /users/me
pub async fn who_am_i(claims: web::ReqData<AccessClaims>) -> HttpResponse {
    let claims = claims.into_inner();
    HttpResponse::Ok().json(WhoAmIResponse {
        email: claims.user_info.email,
        name: claims.user_info.name,
        roles: claims.user_info.roles,
    })
}
