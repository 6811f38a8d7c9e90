use actix_web::{web, HttpResponse, Responder};

use crate::error::ApiError;

pub mod community;
pub mod members;
pub mod membership;
pub mod pages;
pub mod uploads;

/// Mounts the JSON API under `/api`. Extractor failures are reported as
/// validation errors in the usual envelope.
pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| ApiError::validation(format!("Invalid JSON body: {}", err)).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::validation(format!("Invalid query: {}", err)).into()),
    )
    .service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            // Upload paths must be registered ahead of the `/{id}` item routes.
            .configure(uploads::config_uploads)
            .configure(membership::config_membership)
            .configure(members::config_members)
            .configure(community::config_community),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}
