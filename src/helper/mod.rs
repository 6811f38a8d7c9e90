pub mod form_helpers;
pub mod listing_helpers;
pub mod member_helpers;
pub mod membership_helpers;
pub mod page_helpers;
pub mod record_helpers;
pub mod sanitization_helpers;
pub mod upload_helpers;
