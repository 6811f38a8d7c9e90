use actix_web::web;
use rusqlite::Connection;

use crate::error::ApiError;
use crate::helper::upload_helpers::MediaStore;
use crate::models::db_operations::records_db_operations;
use crate::models::db_operations::DbError;
use crate::models::{CrudResource, Resource};
use crate::DbPool;

/// Runs `f` on a pooled connection off the async executor.
pub async fn with_conn<T, F>(pool: &web::Data<DbPool>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    web::block(move || {
        let mut conn = pool.get().map_err(DbError::from)?;
        f(&mut *conn)
    })
    .await?
}

pub async fn list<R: CrudResource>(pool: &web::Data<DbPool>, filter: R::Filter) -> Result<Vec<R>, ApiError> {
    let filters = R::filter_columns(filter);
    with_conn(pool, move |conn| Ok(records_db_operations::list_records::<R>(conn, &filters)?)).await
}

pub async fn get<R: Resource>(pool: &web::Data<DbPool>, id: String) -> Result<R, ApiError> {
    with_conn(pool, move |conn| Ok(records_db_operations::fetch_record::<R>(conn, &id)?)).await
}

pub async fn create<R: CrudResource>(pool: &web::Data<DbPool>, draft: R::Draft) -> Result<R, ApiError> {
    let columns = R::draft_columns(draft)?;
    let created: R = with_conn(pool, move |conn| Ok(records_db_operations::insert_record::<R>(conn, columns)?)).await?;
    log::info!("{} created.", R::LABEL);
    Ok(created)
}

pub async fn update<R: CrudResource>(pool: &web::Data<DbPool>, id: String, patch: R::Patch) -> Result<R, ApiError> {
    let changes = R::patch_columns(patch)?;
    with_conn(pool, move |conn| {
        records_db_operations::update_record::<R>(conn, &id, changes)?
            .ok_or_else(|| ApiError::NotFound(format!("{} not found.", R::LABEL)))
    })
    .await
}

/// Deletes the row, then removes its stored object unless another row still
/// points at it. The file removal never fails the delete.
pub async fn delete_with_attachment<R: Resource>(
    pool: &web::Data<DbPool>,
    media: &MediaStore,
    id: String,
) -> Result<(), ApiError> {
    let (removed, shared): (R, bool) = with_conn(pool, move |conn| {
        let removed = records_db_operations::delete_record::<R>(conn, &id)?
            .ok_or_else(|| ApiError::NotFound(format!("{} not found.", R::LABEL)))?;
        let shared = match removed.attachment_url() {
            Some(url) => records_db_operations::object_url_referenced(conn, url)?,
            None => false,
        };
        Ok((removed, shared))
    })
    .await?;

    if shared {
        log::info!(
            "Keeping {:?}, it is still referenced by another record.",
            removed.attachment_url()
        );
    } else {
        media.discard(removed.attachment_url()).await;
    }
    log::info!("{} deleted.", R::LABEL);
    Ok(())
}
