use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::http::header;
use actix_web::{error, middleware::Logger, web, App, HttpResponse, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::account::Role;
use crate::configuration::{HashingSettings, JwtSettings};
use crate::logger::RequestLogger;
use crate::middleware::RequireRoles;
use crate::routes::{
    delete_user, get_user, grant_role, health_check, list_users, login, logout, refresh, register,
    who_am_i,
};
use crate::session::SessionManager;
use crate::store::CredentialStore;

const ANY_ROLE: &[Role] = &[Role::User, Role::Editor, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Credentialed CORS for the configured browser origins; any other origin is refused.
fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn CredentialStore>,
    jwt_config: JwtSettings,
    hashing: HashingSettings,
    allowed_origins: Vec<String>,
) -> Result<Server, std::io::Error> {
    let session = SessionManager::new(store.clone(), jwt_config.clone(), hashing)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let session = web::Data::new(session);
    let store: web::Data<dyn CredentialStore> = web::Data::from(store);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .wrap(RequestLogger)
            .app_data(session.clone())
            .app_data(store.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::debug!(error = %err, "Rejected request body");
                error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest()
                        .json(serde_json::json!({ "error": "Invalid request body" })),
                )
                .into()
            }))
            .route("/health_check", web::get().to(health_check))
            // Public session endpoints
            .service(
                web::scope("/api")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::get().to(refresh))
                    .route("/logout", web::post().to(logout)),
            )
            // Protected resources (access token + role check)
            .service(
                web::scope("/users")
                    .service(
                        web::resource("/me")
                            .wrap(RequireRoles::new(jwt_config.clone(), ANY_ROLE))
                            .route(web::get().to(who_am_i)),
                    )
                    .service(
                        web::resource("")
                            .wrap(RequireRoles::new(jwt_config.clone(), ADMIN_ONLY))
                            .route(web::get().to(list_users)),
                    )
                    .service(
                        web::resource("/{id}")
                            .wrap(RequireRoles::new(jwt_config.clone(), ADMIN_ONLY))
                            .route(web::get().to(get_user))
                            .route(web::delete().to(delete_user)),
                    )
                    .service(
                        web::resource("/{id}/roles")
                            .wrap(RequireRoles::new(jwt_config.clone(), ADMIN_ONLY))
                            .route(web::post().to(grant_role)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
