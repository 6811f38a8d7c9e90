use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}; expected one of: {expected}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Declares a closed, string-backed enumeration stored as TEXT.
///
/// Every variant gets exactly one wire name, used by serde, the database and
/// `FromStr` (which ignores ASCII case so form posts like `Life` resolve).
macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident ($kind:literal) { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: wanted.to_string(),
                        expected: $name::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", "),
                    })
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: UnknownVariant| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

closed_enum!(MembershipType ("membership type") {
    Life => "life",
    Affiliate => "affiliate",
    Associate => "associate",
    Corporate => "corporate",
});

closed_enum!(ApplicationStatus ("application status") {
    Pending => "pending",
    UnderReview => "under_review",
    Approved => "approved",
    Rejected => "rejected",
});

closed_enum!(MemberStatus ("member status") {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
});

closed_enum!(
    /// The six administrative partitions of the society.
    Zone ("zone") {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        E => "E",
        F => "F",
    }
);

closed_enum!(Gender ("gender") {
    Male => "M",
    Female => "F",
});

closed_enum!(EventStatus ("event status") {
    Upcoming => "upcoming",
    Ongoing => "ongoing",
    Completed => "completed",
    Cancelled => "cancelled",
});

closed_enum!(GalleryCategory ("gallery category") {
    Events => "events",
    Community => "community",
    Facilities => "facilities",
    Other => "other",
});

closed_enum!(NewsCategory ("news category") {
    Announcement => "announcement",
    Notice => "notice",
    Update => "update",
    General => "general",
});

closed_enum!(NewsStatus ("news status") {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

closed_enum!(StickerStatus ("car sticker status") {
    Pending => "pending",
    Active => "active",
    Expired => "expired",
    Cancelled => "cancelled",
});

closed_enum!(AdoptionStatus ("adoption status") {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
});

closed_enum!(MessageStatus ("message status") {
    New => "new",
    Read => "read",
    Replied => "replied",
    Archived => "archived",
});

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Pending
    }
}

impl Default for MemberStatus {
    fn default() -> Self {
        MemberStatus::Active
    }
}

impl Gender {
    /// Maps the form's display value. Anything else is stored as null.
    pub fn from_display(value: &str) -> Option<Gender> {
        match value.trim() {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Gray,
    Yellow,
    Blue,
    Green,
    Red,
    Purple,
}

impl BadgeColor {
    pub fn css_class(&self) -> &'static str {
        match self {
            BadgeColor::Gray => "badge badge-gray",
            BadgeColor::Yellow => "badge badge-yellow",
            BadgeColor::Blue => "badge badge-blue",
            BadgeColor::Green => "badge badge-green",
            BadgeColor::Red => "badge badge-red",
            BadgeColor::Purple => "badge badge-purple",
        }
    }
}

/// Display label and colour for values shown as badges in the admin views.
pub trait Badge {
    fn label(&self) -> &'static str;
    fn color(&self) -> BadgeColor;
}

impl Badge for ApplicationStatus {
    fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::UnderReview => "Under review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    fn color(&self) -> BadgeColor {
        match self {
            ApplicationStatus::Pending => BadgeColor::Yellow,
            ApplicationStatus::UnderReview => BadgeColor::Blue,
            ApplicationStatus::Approved => BadgeColor::Green,
            ApplicationStatus::Rejected => BadgeColor::Red,
        }
    }
}

impl Badge for MemberStatus {
    fn label(&self) -> &'static str {
        match self {
            MemberStatus::Active => "Active",
            MemberStatus::Inactive => "Inactive",
            MemberStatus::Suspended => "Suspended",
        }
    }

    fn color(&self) -> BadgeColor {
        match self {
            MemberStatus::Active => BadgeColor::Green,
            MemberStatus::Inactive => BadgeColor::Gray,
            MemberStatus::Suspended => BadgeColor::Red,
        }
    }
}

impl Badge for MembershipType {
    fn label(&self) -> &'static str {
        match self {
            MembershipType::Life => "Life",
            MembershipType::Affiliate => "Affiliate",
            MembershipType::Associate => "Associate",
            MembershipType::Corporate => "Corporate",
        }
    }

    fn color(&self) -> BadgeColor {
        match self {
            MembershipType::Life => BadgeColor::Purple,
            MembershipType::Affiliate => BadgeColor::Blue,
            MembershipType::Associate => BadgeColor::Gray,
            MembershipType::Corporate => BadgeColor::Yellow,
        }
    }
}

impl Badge for MessageStatus {
    fn label(&self) -> &'static str {
        match self {
            MessageStatus::New => "New",
            MessageStatus::Read => "Read",
            MessageStatus::Replied => "Replied",
            MessageStatus::Archived => "Archived",
        }
    }

    fn color(&self) -> BadgeColor {
        match self {
            MessageStatus::New => BadgeColor::Blue,
            MessageStatus::Read => BadgeColor::Gray,
            MessageStatus::Replied => BadgeColor::Green,
            MessageStatus::Archived => BadgeColor::Purple,
        }
    }
}
