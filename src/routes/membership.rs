use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::error::{ApiError, Envelope};
use crate::helper::membership_helpers::{self, ApplicationReview, MemberSideEffect};
use crate::helper::record_helpers::{self, with_conn};
use crate::helper::upload_helpers::MediaStore;
use crate::middleware::AdminAccess;
use crate::models::community::StatusFilter;
use crate::models::db_operations::records_db_operations;
use crate::models::enums::ApplicationStatus;
use crate::models::{ColumnSet, MembershipApplication};
use crate::DbPool;

pub fn config_membership(cfg: &mut web::ServiceConfig) {
    cfg.route("/membership", web::post().to(submit_application))
        .route("/membership", web::get().to(list_applications))
        .route("/membership/{id}", web::get().to(get_application))
        .route("/membership/{id}", web::patch().to(review_application));
}

async fn submit_application(
    pool: web::Data<DbPool>,
    media: web::Data<MediaStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let application = membership_helpers::submit_application(&pool, &media, payload).await?;
    Ok(HttpResponse::Created().json(Envelope::ok(application)))
}

async fn list_applications(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    query: web::Query<StatusFilter<ApplicationStatus>>,
) -> Result<HttpResponse, ApiError> {
    let mut filter = ColumnSet::new();
    filter.patch("status", query.into_inner().status);
    let filters = filter.into_columns();

    let applications: Vec<MembershipApplication> = with_conn(&pool, move |conn| {
        Ok(records_db_operations::list_records(conn, &filters)?)
    })
    .await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(applications)))
}

async fn get_application(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let application: MembershipApplication = record_helpers::get(&pool, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(application)))
}

/// The response carries the application only; a failed member creation has
/// already been logged by the review helper.
async fn review_application(
    _admin: AdminAccess,
    pool: web::Data<DbPool>,
    id: web::Path<String>,
    review: web::Json<ApplicationReview>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let review = review.into_inner();
    let outcome = with_conn(&pool, move |conn| {
        membership_helpers::review_application(conn, &id, review)
    })
    .await?;

    if let MemberSideEffect::Created(member) = &outcome.member {
        log::info!(
            "Member {} created from application {}.",
            member.membership_number,
            outcome.application.id
        );
    }
    Ok(HttpResponse::Ok().json(Envelope::ok(outcome.application)))
}
