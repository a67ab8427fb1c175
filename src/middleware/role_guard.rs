/// Access Control Gate
///
/// Verifies the access token from the `Authorization: Bearer` header and
/// admits the request only if the token carries at least one allowed role.
/// The verified `AccessClaims` are placed in request extensions for handlers
/// (`web::ReqData<AccessClaims>`).

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::account::Role;
use crate::auth::{validate_access_token, AccessClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Gate factory: `RequireRoles::new(jwt, &[Role::Admin])`
pub struct RequireRoles {
    jwt_config: JwtSettings,
    allowed: Rc<Vec<i32>>,
}

impl RequireRoles {
    pub fn new(jwt_config: JwtSettings, allowed: &[Role]) -> Self {
        Self {
            jwt_config,
            allowed: Rc::new(allowed.iter().map(|role| role.code()).collect()),
        }
    }
}

fn authorize(
    token: Option<&str>,
    jwt_config: &JwtSettings,
    allowed: &[i32],
) -> Result<AccessClaims, AuthError> {
    let token = token.ok_or(AuthError::MissingToken)?;
    let claims = validate_access_token(token, jwt_config)?;
    if !claims.has_any_role(allowed) {
        return Err(AuthError::Forbidden);
    }
    Ok(claims)
}

/// Token part of an `Authorization: Bearer <token>` header, if well formed.
pub fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl<S, B> Transform<S, ServiceRequest> for RequireRoles
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRolesService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireRolesService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireRolesService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
    allowed: Rc<Vec<i32>>,
}

impl<S, B> Service<ServiceRequest> for RequireRolesService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = bearer_token(&req);

        match authorize(token.as_deref(), &self.jwt_config, &self.allowed) {
            Ok(claims) => {
                tracing::debug!(
                    email = %claims.user_info.email,
                    path = %req.path(),
                    "Access granted"
                );
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Access denied");
                Box::pin(async move { Err(AppError::Auth(e).into()) })
            }
        }
    }
}
