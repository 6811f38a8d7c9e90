use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

const TABLES: &[(&str, &str)] = &[
    (
        "membership_applications",
        "CREATE TABLE IF NOT EXISTS membership_applications (
            id TEXT PRIMARY KEY,
            membership_type TEXT NOT NULL CHECK(membership_type IN ('life', 'affiliate', 'associate', 'corporate')),
            name TEXT NOT NULL,
            name_bangla TEXT,
            gender TEXT CHECK(gender IN ('M', 'F')),
            date_of_birth TEXT,
            blood_group TEXT,
            spouse_name TEXT,
            father_name TEXT,
            mother_name TEXT,
            profession TEXT,
            email TEXT,
            mobile TEXT,
            office_tel TEXT,
            residence_tel TEXT,
            address TEXT,
            organization TEXT,
            designation TEXT,
            property_owner TEXT,
            property_schedule TEXT,
            relationship TEXT,
            proposer_name TEXT,
            proposer_membership_no TEXT,
            seconder_name TEXT,
            seconder_membership_no TEXT,
            children TEXT,
            photo_url TEXT,
            membership_number TEXT,
            zone TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            approved_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "members",
        "CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            membership_number TEXT NOT NULL UNIQUE,
            membership_type TEXT NOT NULL,
            zone TEXT,
            name TEXT NOT NULL,
            email TEXT,
            mobile TEXT,
            property_schedule TEXT,
            photo_url TEXT,
            membership_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            application_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (application_id) REFERENCES membership_applications(id) ON DELETE SET NULL
        )",
    ),
    (
        "events",
        "CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            event_date TEXT NOT NULL,
            location TEXT,
            image_url TEXT,
            status TEXT NOT NULL DEFAULT 'upcoming',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "gallery",
        "CREATE TABLE IF NOT EXISTS gallery (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            image_url TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'other',
            taken_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "news",
        "CREATE TABLE IF NOT EXISTS news (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            summary TEXT,
            content TEXT NOT NULL,
            image_url TEXT,
            category TEXT NOT NULL DEFAULT 'general',
            status TEXT NOT NULL DEFAULT 'draft',
            published_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "car_stickers",
        "CREATE TABLE IF NOT EXISTS car_stickers (
            id TEXT PRIMARY KEY,
            car_number TEXT NOT NULL,
            owner_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            house_number TEXT NOT NULL,
            road_number TEXT NOT NULL,
            issue_date TEXT,
            expiry_date TEXT,
            sticker_number TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "adopt_a_road",
        "CREATE TABLE IF NOT EXISTS adopt_a_road (
            id TEXT PRIMARY KEY,
            road_number TEXT NOT NULL,
            adopter_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT,
            house_number TEXT,
            start_date TEXT,
            notes TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "adopt_a_gate",
        "CREATE TABLE IF NOT EXISTS adopt_a_gate (
            id TEXT PRIMARY KEY,
            gate_number TEXT NOT NULL,
            adopter_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT,
            house_number TEXT,
            start_date TEXT,
            notes TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "contact_messages",
        "CREATE TABLE IF NOT EXISTS contact_messages (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            subject TEXT,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_applications_status ON membership_applications(status)",
    "CREATE INDEX IF NOT EXISTS idx_members_status ON members(status)",
    "CREATE INDEX IF NOT EXISTS idx_members_zone ON members(zone)",
    "CREATE INDEX IF NOT EXISTS idx_events_date ON events(event_date)",
    "CREATE INDEX IF NOT EXISTS idx_car_stickers_status ON car_stickers(status)",
];

/// Creates every table and index. Safe to run against an existing database.
pub fn setup_society_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;
    for (name, ddl) in TABLES {
        log::debug!("Ensuring table '{}'", name);
        tx.execute(ddl, [])?;
    }
    for ddl in INDEXES {
        tx.execute(ddl, [])?;
    }
    tx.commit()?;
    Ok(())
}

pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|(name, _)| *name)
}
