use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::helper::form_helpers::normalize_optional;

pub mod community;
pub mod db_operations;
pub mod enums;

use enums::{ApplicationStatus, Gender, MemberStatus, MembershipType, Zone};

/// Column name / bound value pairs for a single INSERT or UPDATE.
pub type Columns = Vec<(&'static str, Box<dyn ToSql + Send>)>;

/// A row type backed by one table.
pub trait Resource: Serialize + Sized + Send + 'static {
    const TABLE: &'static str;
    /// Human name used in error messages, e.g. "Car sticker".
    const LABEL: &'static str;
    const ORDER_BY: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Stored object owned by the row, removed best-effort on delete.
    fn attachment_url(&self) -> Option<&str> {
        None
    }
}

/// Entities served by the uniform collection/item routes.
pub trait CrudResource: Resource {
    const PUBLIC_READ: bool;
    const PUBLIC_CREATE: bool;

    type Draft: DeserializeOwned + 'static;
    type Patch: DeserializeOwned + 'static;
    type Filter: DeserializeOwned + 'static;

    fn draft_columns(draft: Self::Draft) -> Result<Columns, ApiError>;
    fn patch_columns(patch: Self::Patch) -> Result<Columns, ApiError>;
    fn filter_columns(filter: Self::Filter) -> Columns;
}

/// Accumulates validated columns for an insert or a partial update.
#[derive(Default)]
pub struct ColumnSet {
    columns: Columns,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: ToSql + Send + 'static>(&mut self, name: &'static str, value: T) {
        self.columns.push((name, Box::new(value)));
    }

    /// Sets a mandatory text column, rejecting absent or blank input.
    pub fn required(&mut self, name: &'static str, value: Option<String>) -> Result<(), ApiError> {
        match normalize_optional(value) {
            Some(v) => {
                self.set(name, v);
                Ok(())
            }
            None => Err(ApiError::validation(format!("'{}' is required.", name))),
        }
    }

    /// Sets an optional text column; blank input is stored as NULL.
    pub fn optional(&mut self, name: &'static str, value: Option<String>) {
        self.set(name, normalize_optional(value));
    }

    /// Partial-update form of [`ColumnSet::required`]: absent means untouched.
    pub fn patch_required(&mut self, name: &'static str, value: Option<String>) -> Result<(), ApiError> {
        match value {
            Some(v) => self.required(name, Some(v)),
            None => Ok(()),
        }
    }

    /// Partial-update form of [`ColumnSet::optional`]: absent means untouched.
    pub fn patch_optional(&mut self, name: &'static str, value: Option<String>) {
        if let Some(v) = value {
            self.optional(name, Some(v));
        }
    }

    pub fn patch<T: ToSql + Send + 'static>(&mut self, name: &'static str, value: Option<T>) {
        if let Some(v) = value {
            self.set(name, v);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(c, _)| *c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_columns(self) -> Columns {
        self.columns
    }

    /// Like [`ColumnSet::into_columns`] but refuses an update that changes nothing.
    pub fn into_patch(self) -> Result<Columns, ApiError> {
        if self.columns.is_empty() {
            return Err(ApiError::validation("No updatable fields were supplied."));
        }
        Ok(self.columns)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "dateOfBirth")]
    pub date_of_birth: Option<String>,
}

pub(crate) fn children_from_column(raw: Option<String>) -> rusqlite::Result<Option<Vec<Child>>> {
    match raw {
        Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        }),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipApplication {
    pub id: String,
    pub membership_type: MembershipType,
    pub name: String,
    pub name_bangla: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub blood_group: Option<String>,
    pub spouse_name: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub profession: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub office_tel: Option<String>,
    pub residence_tel: Option<String>,
    pub address: Option<String>,
    pub organization: Option<String>,
    pub designation: Option<String>,
    pub property_owner: Option<String>,
    pub property_schedule: Option<String>,
    pub relationship: Option<String>,
    pub proposer_name: Option<String>,
    pub proposer_membership_no: Option<String>,
    pub seconder_name: Option<String>,
    pub seconder_membership_no: Option<String>,
    pub children: Option<Vec<Child>>,
    pub photo_url: Option<String>,
    pub membership_number: Option<String>,
    pub zone: Option<Zone>,
    pub status: ApplicationStatus,
    pub approved_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for MembershipApplication {
    const TABLE: &'static str = "membership_applications";
    const LABEL: &'static str = "Membership application";
    const ORDER_BY: &'static str = "created_at DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(MembershipApplication {
            id: row.get("id")?,
            membership_type: row.get("membership_type")?,
            name: row.get("name")?,
            name_bangla: row.get("name_bangla")?,
            gender: row.get("gender")?,
            date_of_birth: row.get("date_of_birth")?,
            blood_group: row.get("blood_group")?,
            spouse_name: row.get("spouse_name")?,
            father_name: row.get("father_name")?,
            mother_name: row.get("mother_name")?,
            profession: row.get("profession")?,
            email: row.get("email")?,
            mobile: row.get("mobile")?,
            office_tel: row.get("office_tel")?,
            residence_tel: row.get("residence_tel")?,
            address: row.get("address")?,
            organization: row.get("organization")?,
            designation: row.get("designation")?,
            property_owner: row.get("property_owner")?,
            property_schedule: row.get("property_schedule")?,
            relationship: row.get("relationship")?,
            proposer_name: row.get("proposer_name")?,
            proposer_membership_no: row.get("proposer_membership_no")?,
            seconder_name: row.get("seconder_name")?,
            seconder_membership_no: row.get("seconder_membership_no")?,
            children: children_from_column(row.get("children")?)?,
            photo_url: row.get("photo_url")?,
            membership_number: row.get("membership_number")?,
            zone: row.get("zone")?,
            status: row.get("status")?,
            approved_date: row.get("approved_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn attachment_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub id: String,
    pub membership_number: String,
    pub membership_type: MembershipType,
    pub zone: Option<Zone>,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub property_schedule: Option<String>,
    pub photo_url: Option<String>,
    pub membership_date: NaiveDate,
    pub status: MemberStatus,
    pub application_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Member {
    const TABLE: &'static str = "members";
    const LABEL: &'static str = "Member";
    const ORDER_BY: &'static str = "created_at DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Member {
            id: row.get("id")?,
            membership_number: row.get("membership_number")?,
            membership_type: row.get("membership_type")?,
            zone: row.get("zone")?,
            name: row.get("name")?,
            email: row.get("email")?,
            mobile: row.get("mobile")?,
            property_schedule: row.get("property_schedule")?,
            photo_url: row.get("photo_url")?,
            membership_date: row.get("membership_date")?,
            status: row.get("status")?,
            application_id: row.get("application_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn attachment_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub url: String,
    pub path: String,
}
