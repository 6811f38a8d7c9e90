use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use crate::error::ApiError;
use crate::helper::form_helpers::normalize_optional;
use crate::helper::sanitization_helpers::strip_all_html;
use crate::models::db_operations::{members_db_operations, records_db_operations};
use crate::models::enums::{MemberStatus, MembershipType, Zone};
use crate::models::{ColumnSet, Columns, Member};

#[derive(Debug, Default, Deserialize)]
pub struct NewMember {
    pub membership_number: Option<String>,
    pub membership_type: Option<MembershipType>,
    pub zone: Option<Zone>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub property_schedule: Option<String>,
    pub photo_url: Option<String>,
    pub membership_date: Option<NaiveDate>,
    pub status: Option<MemberStatus>,
    pub application_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemberPatch {
    pub membership_number: Option<String>,
    pub membership_type: Option<MembershipType>,
    pub zone: Option<Zone>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub property_schedule: Option<String>,
    pub photo_url: Option<String>,
    pub membership_date: Option<NaiveDate>,
    pub status: Option<MemberStatus>,
}

/// Server-side filters accepted by the member list.
#[derive(Debug, Default, Deserialize)]
pub struct MemberFilter {
    pub status: Option<MemberStatus>,
    pub zone: Option<Zone>,
    pub membership_type: Option<MembershipType>,
}

impl MemberFilter {
    pub fn into_columns(self) -> Columns {
        let mut cols = ColumnSet::new();
        cols.patch("status", self.status);
        cols.patch("zone", self.zone);
        cols.patch("membership_type", self.membership_type);
        cols.into_columns()
    }
}

fn ensure_number_free(conn: &Connection, number: &str, excluding: Option<&str>) -> Result<(), ApiError> {
    if members_db_operations::membership_number_in_use(conn, number, excluding)? {
        return Err(ApiError::Conflict(format!(
            "Membership number '{}' is already in use.",
            number
        )));
    }
    Ok(())
}

/// Creates a member. The membership number must be unused; date and status
/// default to today and active.
pub fn create_member(conn: &Connection, draft: NewMember) -> Result<Member, ApiError> {
    let number = normalize_optional(draft.membership_number)
        .ok_or_else(|| ApiError::validation("'membership_number' is required."))?;
    let membership_type = draft
        .membership_type
        .ok_or_else(|| ApiError::validation("'membership_type' is required."))?;

    let mut cols = ColumnSet::new();
    cols.required("name", draft.name.map(|n| strip_all_html(&n)))?;
    cols.set("membership_type", membership_type);
    cols.set("zone", draft.zone);
    cols.optional("email", draft.email);
    cols.optional("mobile", draft.mobile);
    cols.optional("property_schedule", draft.property_schedule);
    cols.optional("photo_url", draft.photo_url);
    cols.set(
        "membership_date",
        draft.membership_date.unwrap_or_else(|| Utc::now().date_naive()),
    );
    cols.set("status", draft.status.unwrap_or_default());
    cols.optional("application_id", draft.application_id);

    ensure_number_free(conn, &number, None)?;
    cols.set("membership_number", number);

    let member: Member = records_db_operations::insert_record(conn, cols.into_columns())?;
    log::info!("Member {} created.", member.membership_number);
    Ok(member)
}

pub fn update_member(conn: &Connection, id: &str, patch: MemberPatch) -> Result<Member, ApiError> {
    let mut cols = ColumnSet::new();
    if let Some(number) = patch.membership_number {
        let number = normalize_optional(Some(number))
            .ok_or_else(|| ApiError::validation("'membership_number' cannot be blank."))?;
        ensure_number_free(conn, &number, Some(id))?;
        cols.set("membership_number", number);
    }
    cols.patch("membership_type", patch.membership_type);
    cols.patch("zone", patch.zone);
    cols.patch_required("name", patch.name.map(|n| strip_all_html(&n)))?;
    cols.patch_optional("email", patch.email);
    cols.patch_optional("mobile", patch.mobile);
    cols.patch_optional("property_schedule", patch.property_schedule);
    cols.patch_optional("photo_url", patch.photo_url);
    cols.patch("membership_date", patch.membership_date);
    cols.patch("status", patch.status);

    records_db_operations::update_record::<Member>(conn, id, cols.into_patch()?)?
        .ok_or_else(|| ApiError::NotFound("Member not found.".to_string()))
}
