//! Search and sort over lists already fetched from the store.

use std::cmp::Ordering;

use crate::models::community::ContactMessage;
use crate::models::{Member, MembershipApplication};

/// Records that can be matched by a free-text query.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for MembershipApplication {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.mobile.as_deref());
        fields.extend(self.membership_number.as_deref());
        fields
    }
}

impl Searchable for Member {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.membership_number.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.mobile.as_deref());
        fields
    }
}

impl Searchable for ContactMessage {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str(), self.message.as_str()];
        fields.extend(self.subject.as_deref());
        fields
    }
}

/// Keeps the items whose fields contain `query`, ignoring case.
/// A blank query keeps everything.
pub fn search<T: Searchable>(items: Vec<T>, query: Option<&str>) -> Vec<T> {
    let needle = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return items,
    };
    items
        .into_iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationSort {
    #[default]
    Newest,
    Oldest,
    Name,
    Status,
}

impl ApplicationSort {
    pub const KEYS: &'static [&'static str] = &["newest", "oldest", "name", "status"];

    /// Unknown keys fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("oldest") => ApplicationSort::Oldest,
            Some("name") => ApplicationSort::Name,
            Some("status") => ApplicationSort::Status,
            _ => ApplicationSort::Newest,
        }
    }

    pub fn apply(self, items: &mut [MembershipApplication]) {
        match self {
            ApplicationSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ApplicationSort::Oldest => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ApplicationSort::Name => items.sort_by(|a, b| by_name(&a.name, &b.name)),
            ApplicationSort::Status => items.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberSort {
    #[default]
    Newest,
    Name,
    MembershipNumber,
    Zone,
}

impl MemberSort {
    pub const KEYS: &'static [&'static str] = &["newest", "name", "membership_number", "zone"];

    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("name") => MemberSort::Name,
            Some("membership_number") => MemberSort::MembershipNumber,
            Some("zone") => MemberSort::Zone,
            _ => MemberSort::Newest,
        }
    }

    pub fn apply(self, items: &mut [Member]) {
        match self {
            MemberSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            MemberSort::Name => items.sort_by(|a, b| by_name(&a.name, &b.name)),
            MemberSort::MembershipNumber => {
                items.sort_by(|a, b| a.membership_number.cmp(&b.membership_number))
            }
            // Members without a zone go last.
            MemberSort::Zone => items.sort_by(|a, b| match (a.zone, b.zone) {
                (Some(x), Some(y)) => x.as_str().cmp(y.as_str()),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageSort {
    #[default]
    Newest,
    Oldest,
    Name,
}

impl MessageSort {
    pub const KEYS: &'static [&'static str] = &["newest", "oldest", "name"];

    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("oldest") => MessageSort::Oldest,
            Some("name") => MessageSort::Name,
            _ => MessageSort::Newest,
        }
    }

    pub fn apply(self, items: &mut [ContactMessage]) {
        match self {
            MessageSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            MessageSort::Oldest => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            MessageSort::Name => items.sort_by(|a, b| by_name(&a.name, &b.name)),
        }
    }
}
