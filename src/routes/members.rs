use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::{ApiError, Envelope};
use crate::helper::member_helpers::{self, MemberFilter, MemberPatch, NewMember};
use crate::helper::record_helpers::{self, with_conn};
use crate::helper::upload_helpers::MediaStore;
use crate::middleware::AdminAccess;
use crate::models::db_operations::records_db_operations;
use crate::models::Member;
use crate::DbPool;

pub fn config_members(cfg: &mut web::ServiceConfig) {
    cfg.route("/members/admin-create", web::post().to(create_member))
        .route("/members/list", web::get().to(list_members))
        .route("/members/{id}", web::get().to(get_member))
        .route("/members/{id}", web::patch().to(update_member))
        .route("/members/{id}", web::delete().to(delete_member));
}

async fn create_member(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    draft: web::Json<NewMember>,
) -> Result<HttpResponse, ApiError> {
    let draft = draft.into_inner();
    let member = with_conn(&pool, move |conn| member_helpers::create_member(conn, draft)).await?;
    Ok(HttpResponse::Created().json(Envelope::ok(member)))
}

async fn list_members(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    query: web::Query<MemberFilter>,
) -> Result<HttpResponse, ApiError> {
    let filters = query.into_inner().into_columns();
    let members: Vec<Member> = with_conn(&pool, move |conn| {
        Ok(records_db_operations::list_records(conn, &filters)?)
    })
    .await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(members)))
}

async fn get_member(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let member: Member = record_helpers::get(&pool, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(member)))
}

async fn update_member(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    id: web::Path<String>,
    patch: web::Json<MemberPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let patch = patch.into_inner();
    let member = with_conn(&pool, move |conn| member_helpers::update_member(conn, &id, patch)).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(member)))
}

async fn delete_member(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    media: web::Data<MediaStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    record_helpers::delete_with_attachment::<Member>(&pool, &media, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
