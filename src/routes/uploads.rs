use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::helper::form_helpers::read_multipart;
use crate::helper::upload_helpers::{Bucket, MediaStore, MAX_UPLOAD_BYTES};
use crate::middleware::AdminAccess;

pub fn config_uploads(cfg: &mut web::ServiceConfig) {
    cfg.route("/membership/upload-image", web::post().to(upload_membership_document))
        .route("/members/upload-image", web::post().to(upload_member_photo))
        .route("/events/upload", web::post().to(upload_event_image))
        .route("/gallery/upload", web::post().to(upload_gallery_image))
        .route("/news/upload", web::post().to(upload_news_image));
}

/// Stores the `file` part (and optional `folder`) and answers with `{url, path}`.
async fn store_upload(media: &MediaStore, bucket: Bucket, payload: Multipart) -> Result<HttpResponse, ApiError> {
    let mut form = read_multipart(payload, "file", MAX_UPLOAD_BYTES).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| ApiError::validation("No file was uploaded."))?;
    let folder = form.text("folder");

    let stored = media.store(bucket, folder.as_deref(), file).await?;
    Ok(HttpResponse::Ok().json(stored))
}

/// Applicants attach documents before submitting, so this one is public.
async fn upload_membership_document(
    media: web::Data<MediaStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    store_upload(&media, Bucket::MembershipDocuments, payload).await
}

async fn upload_member_photo(
    _admin: AdminAccess,
    media: web::Data<MediaStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    store_upload(&media, Bucket::MemberPhotos, payload).await
}

async fn upload_event_image(
    _admin: AdminAccess,
    media: web::Data<MediaStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    store_upload(&media, Bucket::EventImages, payload).await
}

async fn upload_gallery_image(
    _admin: AdminAccess,
    media: web::Data<MediaStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    store_upload(&media, Bucket::GalleryImages, payload).await
}

async fn upload_news_image(
    _admin: AdminAccess,
    media: web::Data<MediaStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    store_upload(&media, Bucket::NewsImages, payload).await
}
