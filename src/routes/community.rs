use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::{ApiError, Envelope};
use crate::helper::record_helpers;
use crate::helper::upload_helpers::MediaStore;
use crate::middleware::AdminAccess;
use crate::models::community::{
    AdoptAGate, AdoptARoad, CarSticker, ContactMessage, Event, GalleryItem, NewsArticle,
};
use crate::models::CrudResource;
use crate::DbPool;

pub fn config_community(cfg: &mut web::ServiceConfig) {
    crud::<Event>(cfg, "/events");
    crud::<GalleryItem>(cfg, "/gallery");
    crud::<NewsArticle>(cfg, "/news");
    crud::<CarSticker>(cfg, "/car-stickers");
    crud::<AdoptARoad>(cfg, "/adopt-a-road");
    crud::<AdoptAGate>(cfg, "/adopt-a-gate");
    crud::<ContactMessage>(cfg, "/contact");
}

/// Collection routes at `path`, item routes at `path/{id}`.
fn crud<R: CrudResource>(cfg: &mut web::ServiceConfig, path: &str) {
    let item = format!("{}/{{id}}", path);
    cfg.route(path, web::get().to(list::<R>))
        .route(path, web::post().to(create::<R>))
        .route(&item, web::get().to(get::<R>))
        .route(&item, web::patch().to(update::<R>))
        .route(&item, web::delete().to(delete::<R>));
}

async fn list<R: CrudResource>(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    query: web::Query<R::Filter>,
) -> Result<HttpResponse, ApiError> {
    if !R::PUBLIC_READ {
        AdminAccess::verify(&req)?;
    }
    let records: Vec<R> = record_helpers::list(&pool, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(records)))
}

async fn get<R: CrudResource>(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    if !R::PUBLIC_READ {
        AdminAccess::verify(&req)?;
    }
    let record: R = record_helpers::get(&pool, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(record)))
}

async fn create<R: CrudResource>(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    draft: web::Json<R::Draft>,
) -> Result<HttpResponse, ApiError> {
    if !R::PUBLIC_CREATE {
        AdminAccess::verify(&req)?;
    }
    let record: R = record_helpers::create(&pool, draft.into_inner()).await?;
    Ok(HttpResponse::Created().json(Envelope::ok(record)))
}

async fn update<R: CrudResource>(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    id: web::Path<String>,
    patch: web::Json<R::Patch>,
) -> Result<HttpResponse, ApiError> {
    let record: R = record_helpers::update(&pool, id.into_inner(), patch.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(record)))
}

async fn delete<R: CrudResource>(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    media: web::Data<MediaStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    record_helpers::delete_with_attachment::<R>(&pool, &media, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
