//! Community records that share the uniform collection/item routes.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::enums::{
    AdoptionStatus, EventStatus, GalleryCategory, MessageStatus, NewsCategory, NewsStatus,
    StickerStatus,
};
use super::{ColumnSet, Columns, CrudResource, Resource};
use crate::error::ApiError;
use crate::helper::sanitization_helpers::{is_valid_email, strip_all_html};

/// Equality filter on a `status` column.
#[derive(Debug, Deserialize)]
pub struct StatusFilter<S> {
    pub status: Option<S>,
}

fn status_filter<S: rusqlite::types::ToSql + Send + 'static>(filter: StatusFilter<S>) -> Columns {
    let mut cols = ColumnSet::new();
    cols.patch("status", filter.status);
    cols.into_columns()
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| strip_all_html(&v))
}

// ------------------------------------------------------------------
// Events
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<EventStatus>,
}

impl Resource for Event {
    const TABLE: &'static str = "events";
    const LABEL: &'static str = "Event";
    const ORDER_BY: &'static str = "event_date ASC, created_at ASC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Event {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            event_date: row.get("event_date")?,
            location: row.get("location")?,
            image_url: row.get("image_url")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn attachment_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

impl CrudResource for Event {
    const PUBLIC_READ: bool = true;
    const PUBLIC_CREATE: bool = false;

    type Draft = NewEvent;
    type Patch = EventPatch;
    type Filter = StatusFilter<EventStatus>;

    fn draft_columns(draft: NewEvent) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.required("title", clean(draft.title))?;
        let date = draft
            .event_date
            .ok_or_else(|| ApiError::validation("'event_date' is required."))?;
        cols.set("event_date", date);
        cols.optional("description", clean(draft.description));
        cols.optional("location", clean(draft.location));
        cols.optional("image_url", draft.image_url);
        cols.set("status", draft.status.unwrap_or(EventStatus::Upcoming));
        Ok(cols.into_columns())
    }

    fn patch_columns(patch: EventPatch) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.patch_required("title", clean(patch.title))?;
        cols.patch("event_date", patch.event_date);
        cols.patch_optional("description", clean(patch.description));
        cols.patch_optional("location", clean(patch.location));
        cols.patch_optional("image_url", patch.image_url);
        cols.patch("status", patch.status);
        cols.into_patch()
    }

    fn filter_columns(filter: Self::Filter) -> Columns {
        status_filter(filter)
    }
}

// ------------------------------------------------------------------
// Gallery
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub category: GalleryCategory,
    pub taken_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewGalleryItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<GalleryCategory>,
    pub taken_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<GalleryCategory>,
    pub taken_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryFilter {
    pub category: Option<GalleryCategory>,
}

impl Resource for GalleryItem {
    const TABLE: &'static str = "gallery";
    const LABEL: &'static str = "Gallery item";
    const ORDER_BY: &'static str = "taken_date DESC, created_at DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GalleryItem {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            image_url: row.get("image_url")?,
            category: row.get("category")?,
            taken_date: row.get("taken_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn attachment_url(&self) -> Option<&str> {
        Some(&self.image_url)
    }
}

impl CrudResource for GalleryItem {
    const PUBLIC_READ: bool = true;
    const PUBLIC_CREATE: bool = false;

    type Draft = NewGalleryItem;
    type Patch = GalleryItemPatch;
    type Filter = GalleryFilter;

    fn draft_columns(draft: NewGalleryItem) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.required("title", clean(draft.title))?;
        cols.required("image_url", draft.image_url)?;
        cols.optional("description", clean(draft.description));
        cols.set("category", draft.category.unwrap_or(GalleryCategory::Other));
        cols.set("taken_date", draft.taken_date);
        Ok(cols.into_columns())
    }

    fn patch_columns(patch: GalleryItemPatch) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.patch_required("title", clean(patch.title))?;
        cols.patch_required("image_url", patch.image_url)?;
        cols.patch_optional("description", clean(patch.description));
        cols.patch("category", patch.category);
        cols.patch("taken_date", patch.taken_date);
        cols.into_patch()
    }

    fn filter_columns(filter: GalleryFilter) -> Columns {
        let mut cols = ColumnSet::new();
        cols.patch("category", filter.category);
        cols.into_columns()
    }
}

// ------------------------------------------------------------------
// News
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub category: NewsCategory,
    pub status: NewsStatus,
    pub published_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewNewsArticle {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<NewsCategory>,
    pub status: Option<NewsStatus>,
    pub published_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct NewsArticlePatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<NewsCategory>,
    pub status: Option<NewsStatus>,
    pub published_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct NewsFilter {
    pub status: Option<NewsStatus>,
    pub category: Option<NewsCategory>,
}

impl Resource for NewsArticle {
    const TABLE: &'static str = "news";
    const LABEL: &'static str = "News article";
    const ORDER_BY: &'static str = "published_date DESC, created_at DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(NewsArticle {
            id: row.get("id")?,
            title: row.get("title")?,
            summary: row.get("summary")?,
            content: row.get("content")?,
            image_url: row.get("image_url")?,
            category: row.get("category")?,
            status: row.get("status")?,
            published_date: row.get("published_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn attachment_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

impl CrudResource for NewsArticle {
    const PUBLIC_READ: bool = true;
    const PUBLIC_CREATE: bool = false;

    type Draft = NewNewsArticle;
    type Patch = NewsArticlePatch;
    type Filter = NewsFilter;

    fn draft_columns(draft: NewNewsArticle) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.required("title", clean(draft.title))?;
        cols.required("content", clean(draft.content))?;
        cols.optional("summary", clean(draft.summary));
        cols.optional("image_url", draft.image_url);
        cols.set("category", draft.category.unwrap_or(NewsCategory::General));
        let status = draft.status.unwrap_or(NewsStatus::Draft);
        cols.set("status", status);
        // Publishing without a date stamps today.
        let published = match (status, draft.published_date) {
            (_, Some(date)) => Some(date),
            (NewsStatus::Published, None) => Some(Utc::now().date_naive()),
            _ => None,
        };
        cols.set("published_date", published);
        Ok(cols.into_columns())
    }

    fn patch_columns(patch: NewsArticlePatch) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.patch_required("title", clean(patch.title))?;
        cols.patch_required("content", clean(patch.content))?;
        cols.patch_optional("summary", clean(patch.summary));
        cols.patch_optional("image_url", patch.image_url);
        cols.patch("category", patch.category);
        cols.patch("status", patch.status);
        cols.patch("published_date", patch.published_date);
        cols.into_patch()
    }

    fn filter_columns(filter: NewsFilter) -> Columns {
        let mut cols = ColumnSet::new();
        cols.patch("status", filter.status);
        cols.patch("category", filter.category);
        cols.into_columns()
    }
}

// ------------------------------------------------------------------
// Car stickers
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarSticker {
    pub id: String,
    pub car_number: String,
    pub owner_name: String,
    pub phone: String,
    pub house_number: String,
    pub road_number: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub sticker_number: Option<String>,
    pub status: StickerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewCarSticker {
    pub car_number: Option<String>,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub house_number: Option<String>,
    pub road_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CarStickerPatch {
    pub car_number: Option<String>,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub house_number: Option<String>,
    pub road_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub sticker_number: Option<String>,
    pub status: Option<StickerStatus>,
}

impl Resource for CarSticker {
    const TABLE: &'static str = "car_stickers";
    const LABEL: &'static str = "Car sticker";
    const ORDER_BY: &'static str = "created_at DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CarSticker {
            id: row.get("id")?,
            car_number: row.get("car_number")?,
            owner_name: row.get("owner_name")?,
            phone: row.get("phone")?,
            house_number: row.get("house_number")?,
            road_number: row.get("road_number")?,
            issue_date: row.get("issue_date")?,
            expiry_date: row.get("expiry_date")?,
            sticker_number: row.get("sticker_number")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl CrudResource for CarSticker {
    const PUBLIC_READ: bool = false;
    const PUBLIC_CREATE: bool = true;

    type Draft = NewCarSticker;
    type Patch = CarStickerPatch;
    type Filter = StatusFilter<StickerStatus>;

    fn draft_columns(draft: NewCarSticker) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.required("car_number", draft.car_number.map(|v| v.to_uppercase()))?;
        cols.required("owner_name", clean(draft.owner_name))?;
        cols.required("phone", draft.phone)?;
        cols.required("house_number", draft.house_number)?;
        cols.required("road_number", draft.road_number)?;
        cols.set("issue_date", draft.issue_date);
        cols.set("expiry_date", draft.expiry_date);
        cols.set("status", StickerStatus::Pending);
        Ok(cols.into_columns())
    }

    fn patch_columns(patch: CarStickerPatch) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.patch_required("car_number", patch.car_number.map(|v| v.to_uppercase()))?;
        cols.patch_required("owner_name", clean(patch.owner_name))?;
        cols.patch_required("phone", patch.phone)?;
        cols.patch_required("house_number", patch.house_number)?;
        cols.patch_required("road_number", patch.road_number)?;
        cols.patch("issue_date", patch.issue_date);
        cols.patch("expiry_date", patch.expiry_date);
        cols.patch_optional("sticker_number", patch.sticker_number);
        cols.patch("status", patch.status);
        cols.into_patch()
    }

    fn filter_columns(filter: Self::Filter) -> Columns {
        status_filter(filter)
    }
}

// ------------------------------------------------------------------
// Adopt a road / adopt a gate
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdoptARoad {
    pub id: String,
    pub road_number: String,
    pub adopter_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub house_number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: AdoptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdoptAGate {
    pub id: String,
    pub gate_number: String,
    pub adopter_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub house_number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: AdoptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form body shared by road and gate adoptions; `site` is the road or gate number.
#[derive(Debug, Deserialize)]
pub struct NewAdoption {
    #[serde(alias = "road_number", alias = "gate_number")]
    pub site: Option<String>,
    pub adopter_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub house_number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdoptionPatch {
    #[serde(alias = "road_number", alias = "gate_number")]
    pub site: Option<String>,
    pub adopter_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub house_number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: Option<AdoptionStatus>,
}

fn checked_email(email: Option<String>) -> Result<Option<String>, ApiError> {
    match crate::helper::form_helpers::normalize_optional(email) {
        Some(e) if !is_valid_email(&e) => {
            Err(ApiError::validation(format!("'{}' is not a valid email address.", e)))
        }
        other => Ok(other),
    }
}

fn adoption_draft(site_column: &'static str, draft: NewAdoption) -> Result<Columns, ApiError> {
    let mut cols = ColumnSet::new();
    cols.required(site_column, draft.site)?;
    cols.required("adopter_name", clean(draft.adopter_name))?;
    cols.required("phone", draft.phone)?;
    cols.set("email", checked_email(draft.email)?);
    cols.optional("house_number", draft.house_number);
    cols.set("start_date", draft.start_date);
    cols.optional("notes", clean(draft.notes));
    cols.set("status", AdoptionStatus::Pending);
    Ok(cols.into_columns())
}

fn adoption_patch(site_column: &'static str, patch: AdoptionPatch) -> Result<Columns, ApiError> {
    let mut cols = ColumnSet::new();
    cols.patch_required(site_column, patch.site)?;
    cols.patch_required("adopter_name", clean(patch.adopter_name))?;
    cols.patch_required("phone", patch.phone)?;
    if patch.email.is_some() {
        cols.set("email", checked_email(patch.email)?);
    }
    cols.patch_optional("house_number", patch.house_number);
    cols.patch("start_date", patch.start_date);
    cols.patch_optional("notes", clean(patch.notes));
    cols.patch("status", patch.status);
    cols.into_patch()
}

impl Resource for AdoptARoad {
    const TABLE: &'static str = "adopt_a_road";
    const LABEL: &'static str = "Road adoption";
    const ORDER_BY: &'static str = "created_at DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AdoptARoad {
            id: row.get("id")?,
            road_number: row.get("road_number")?,
            adopter_name: row.get("adopter_name")?,
            phone: row.get("phone")?,
            email: row.get("email")?,
            house_number: row.get("house_number")?,
            start_date: row.get("start_date")?,
            notes: row.get("notes")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl CrudResource for AdoptARoad {
    const PUBLIC_READ: bool = false;
    const PUBLIC_CREATE: bool = true;

    type Draft = NewAdoption;
    type Patch = AdoptionPatch;
    type Filter = StatusFilter<AdoptionStatus>;

    fn draft_columns(draft: NewAdoption) -> Result<Columns, ApiError> {
        adoption_draft("road_number", draft)
    }

    fn patch_columns(patch: AdoptionPatch) -> Result<Columns, ApiError> {
        adoption_patch("road_number", patch)
    }

    fn filter_columns(filter: Self::Filter) -> Columns {
        status_filter(filter)
    }
}

impl Resource for AdoptAGate {
    const TABLE: &'static str = "adopt_a_gate";
    const LABEL: &'static str = "Gate adoption";
    const ORDER_BY: &'static str = "created_at DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AdoptAGate {
            id: row.get("id")?,
            gate_number: row.get("gate_number")?,
            adopter_name: row.get("adopter_name")?,
            phone: row.get("phone")?,
            email: row.get("email")?,
            house_number: row.get("house_number")?,
            start_date: row.get("start_date")?,
            notes: row.get("notes")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl CrudResource for AdoptAGate {
    const PUBLIC_READ: bool = false;
    const PUBLIC_CREATE: bool = true;

    type Draft = NewAdoption;
    type Patch = AdoptionPatch;
    type Filter = StatusFilter<AdoptionStatus>;

    fn draft_columns(draft: NewAdoption) -> Result<Columns, ApiError> {
        adoption_draft("gate_number", draft)
    }

    fn patch_columns(patch: AdoptionPatch) -> Result<Columns, ApiError> {
        adoption_patch("gate_number", patch)
    }

    fn filter_columns(filter: Self::Filter) -> Columns {
        status_filter(filter)
    }
}

// ------------------------------------------------------------------
// Contact messages
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewContactMessage {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// Admins only move messages through their inbox states.
#[derive(Debug, Deserialize)]
pub struct ContactMessagePatch {
    pub status: Option<MessageStatus>,
}

impl Resource for ContactMessage {
    const TABLE: &'static str = "contact_messages";
    const LABEL: &'static str = "Contact message";
    const ORDER_BY: &'static str = "created_at DESC";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ContactMessage {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            subject: row.get("subject")?,
            message: row.get("message")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl CrudResource for ContactMessage {
    const PUBLIC_READ: bool = false;
    const PUBLIC_CREATE: bool = true;

    type Draft = NewContactMessage;
    type Patch = ContactMessagePatch;
    type Filter = StatusFilter<MessageStatus>;

    fn draft_columns(draft: NewContactMessage) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.required("name", clean(draft.name))?;
        match checked_email(draft.email)? {
            Some(email) => cols.set("email", email),
            None => return Err(ApiError::validation("'email' is required.")),
        }
        cols.optional("phone", draft.phone);
        cols.optional("subject", clean(draft.subject));
        cols.required("message", clean(draft.message))?;
        cols.set("status", MessageStatus::New);
        Ok(cols.into_columns())
    }

    fn patch_columns(patch: ContactMessagePatch) -> Result<Columns, ApiError> {
        let mut cols = ColumnSet::new();
        cols.patch("status", patch.status);
        cols.into_patch()
    }

    fn filter_columns(filter: Self::Filter) -> Columns {
        status_filter(filter)
    }
}
