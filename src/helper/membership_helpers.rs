use actix_multipart::Multipart;
use actix_web::web;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use crate::error::ApiError;
use crate::helper::form_helpers::{is_truthy, normalize_optional, read_multipart, MultipartForm};
use crate::helper::member_helpers::{self, NewMember};
use crate::helper::record_helpers::with_conn;
use crate::helper::sanitization_helpers::strip_all_html;
use crate::helper::upload_helpers::{Bucket, MediaStore, MAX_UPLOAD_BYTES};
use crate::models::db_operations::{records_db_operations, DbError};
use crate::models::enums::{ApplicationStatus, Gender, MembershipType, UnknownVariant, Zone};
use crate::models::{Child, ColumnSet, Columns, Member, MembershipApplication};
use crate::DbPool;

/// Optional text inputs of the application form and the columns they fill.
const OPTIONAL_FIELDS: &[(&str, &str)] = &[
    ("nameBangla", "name_bangla"),
    ("dateOfBirth", "date_of_birth"),
    ("bloodGroup", "blood_group"),
    ("spouseName", "spouse_name"),
    ("fatherName", "father_name"),
    ("motherName", "mother_name"),
    ("profession", "profession"),
    ("email", "email"),
    ("mobile", "mobile"),
    ("officeTel", "office_tel"),
    ("residenceTel", "residence_tel"),
    ("address", "address"),
    ("organization", "organization"),
    ("designation", "designation"),
    ("propertyOwner", "property_owner"),
    ("propertySchedule", "property_schedule"),
    ("relationship", "relationship"),
    ("proposerName", "proposer_name"),
    ("proposerMembershipNo", "proposer_membership_no"),
    ("seconderName", "seconder_name"),
    ("seconderMembershipNo", "seconder_membership_no"),
];

/// Parses the JSON-encoded children list. Absent stays absent; anything
/// unparseable becomes an empty list.
pub fn parse_children(raw: Option<String>) -> Option<Vec<Child>> {
    let raw = normalize_optional(raw)?;
    match serde_json::from_str::<Vec<Child>>(&raw) {
        Ok(children) => Some(children),
        Err(e) => {
            log::warn!("Malformed children list in membership form, storing an empty list: {}", e);
            Some(Vec::new())
        }
    }
}

fn required_basics(form: &MultipartForm) -> Result<(String, MembershipType), ApiError> {
    let name = form
        .text("name")
        .map(|n| strip_all_html(&n))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("'name' is required."))?;
    let membership_type = form
        .text("membershipType")
        .ok_or_else(|| ApiError::validation("'membershipType' is required."))?
        .parse()
        .map_err(|e: UnknownVariant| ApiError::validation(e.to_string()))?;
    if !is_truthy(form.raw("declaration")) {
        return Err(ApiError::validation("The declaration must be accepted."));
    }
    Ok((name, membership_type))
}

/// Builds the insert for a submitted form. `photo_url` is the already stored photo, if any.
pub fn application_columns(form: &MultipartForm, photo_url: Option<String>) -> Result<Columns, ApiError> {
    let (name, membership_type) = required_basics(form)?;

    let mut cols = ColumnSet::new();
    cols.set("name", name);
    cols.set("membership_type", membership_type);
    for &(field, column) in OPTIONAL_FIELDS {
        cols.optional(column, form.text(field).map(|v| strip_all_html(&v)));
    }
    cols.set(
        "gender",
        form.text("gender").and_then(|g| Gender::from_display(&g)),
    );

    let children = match parse_children(form.text("children")) {
        Some(list) => Some(serde_json::to_string(&list).map_err(DbError::from)?),
        None => None,
    };
    cols.set("children", children);
    cols.optional("photo_url", photo_url);
    cols.set("status", ApplicationStatus::Pending);
    Ok(cols.into_columns())
}

/// Intake: validates the form, stores an image photo, and inserts a pending application.
pub async fn submit_application(
    pool: &web::Data<DbPool>,
    media: &MediaStore,
    payload: Multipart,
) -> Result<MembershipApplication, ApiError> {
    let mut form = read_multipart(payload, "photo", MAX_UPLOAD_BYTES).await?;

    // Reject before anything reaches storage.
    required_basics(&form)?;

    let uploaded = match form.take_file("photo") {
        Some(file) if file.is_image() => {
            Some(media.store(Bucket::MemberPhotos, Some("applications"), file).await?.url)
        }
        Some(file) => {
            log::info!(
                "Skipping non-image photo on membership form (type {:?}).",
                file.content_type
            );
            None
        }
        None => None,
    };
    let photo_url = uploaded.or_else(|| form.text("photoUrl"));

    let columns = application_columns(&form, photo_url)?;
    let application: MembershipApplication = with_conn(pool, move |conn| {
        Ok(records_db_operations::insert_record(conn, columns)?)
    })
    .await?;
    log::info!("Membership application {} received.", application.id);
    Ok(application)
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationReview {
    pub membership_number: Option<String>,
    pub zone: Option<Zone>,
    pub status: Option<ApplicationStatus>,
    pub approved_date: Option<DateTime<Utc>>,
}

/// What happened to the member record an approval may create.
#[derive(Debug)]
pub enum MemberSideEffect {
    NotRequested,
    Created(Member),
    Failed(String),
}

#[derive(Debug)]
pub struct ReviewOutcome {
    pub application: MembershipApplication,
    pub member: MemberSideEffect,
}

fn member_from_application(
    conn: &Connection,
    application_id: &str,
    membership_number: String,
    zone: Zone,
) -> Result<Member, ApiError> {
    let application: MembershipApplication = records_db_operations::fetch_record(conn, application_id)?;
    member_helpers::create_member(
        conn,
        NewMember {
            membership_number: Some(membership_number),
            membership_type: Some(application.membership_type),
            zone: Some(zone),
            name: Some(application.name),
            email: application.email,
            mobile: application.mobile,
            property_schedule: application.property_schedule,
            photo_url: application.photo_url,
            membership_date: None,
            status: None,
            application_id: Some(application.id),
        },
    )
}

/// Applies an admin review. Approving with a membership number and a zone also
/// creates the member; that second write is reported, never propagated.
pub fn review_application(
    conn: &Connection,
    id: &str,
    review: ApplicationReview,
) -> Result<ReviewOutcome, ApiError> {
    let membership_number = normalize_optional(review.membership_number);
    let approving = review.status == Some(ApplicationStatus::Approved);

    let mut cols = ColumnSet::new();
    cols.patch("membership_number", membership_number.clone());
    cols.patch("zone", review.zone);
    cols.patch("status", review.status);
    match review.status {
        Some(ApplicationStatus::Approved) => {
            cols.set("approved_date", review.approved_date.unwrap_or_else(Utc::now));
        }
        // The date only describes an approval that is still in force.
        Some(_) => cols.set("approved_date", None::<DateTime<Utc>>),
        None => {}
    }

    let application = records_db_operations::update_record::<MembershipApplication>(conn, id, cols.into_patch()?)?
        .ok_or_else(|| ApiError::NotFound("Membership application not found.".to_string()))?;
    log::info!("Membership application {} is now {}.", application.id, application.status);

    let member = match (approving, membership_number, review.zone) {
        (true, Some(number), Some(zone)) => match member_from_application(conn, &application.id, number, zone) {
            Ok(member) => MemberSideEffect::Created(member),
            Err(e) => {
                log::error!(
                    "Application {} was approved but the member record could not be created: {}",
                    application.id,
                    e
                );
                MemberSideEffect::Failed(e.to_string())
            }
        },
        _ => MemberSideEffect::NotRequested,
    };

    Ok(ReviewOutcome { application, member })
}
