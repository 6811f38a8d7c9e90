use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use super::DbError;
use crate::models::{Columns, Resource};

fn bound(columns: &Columns) -> Vec<&dyn ToSql> {
    columns
        .iter()
        .map(|(_, value)| &**value as &dyn ToSql)
        .collect()
}

fn where_clause(filters: &Columns) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let predicates: Vec<String> = filters
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
        .collect();
    format!(" WHERE {}", predicates.join(" AND "))
}

/// Inserts a row, letting the store assign the id and both timestamps,
/// and returns the row as persisted.
pub fn insert_record<R: Resource>(conn: &Connection, mut columns: Columns) -> Result<R, DbError> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    columns.push(("id", Box::new(id.clone())));
    columns.push(("created_at", Box::new(now)));
    columns.push(("updated_at", Box::new(now)));

    let names: Vec<&str> = columns.iter().map(|(c, _)| *c).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        R::TABLE,
        names.join(", "),
        placeholders.join(", ")
    );
    conn.execute(&sql, bound(&columns).as_slice())?;

    read_record::<R>(conn, &id)?
        .ok_or_else(|| DbError::NotFound(format!("{} {} vanished after insert.", R::LABEL, id)))
}

pub fn read_record<R: Resource>(conn: &Connection, id: &str) -> Result<Option<R>, DbError> {
    let sql = format!("SELECT * FROM {} WHERE id = ?1", R::TABLE);
    Ok(conn.query_row(&sql, [id], |row| R::from_row(row)).optional()?)
}

/// Like [`read_record`] but a missing row is an error.
pub fn fetch_record<R: Resource>(conn: &Connection, id: &str) -> Result<R, DbError> {
    read_record::<R>(conn, id)?.ok_or_else(|| DbError::NotFound(format!("{} not found.", R::LABEL)))
}

/// Returns every row matching all equality filters, in the resource's fixed order.
pub fn list_records<R: Resource>(conn: &Connection, filters: &Columns) -> Result<Vec<R>, DbError> {
    let sql = format!(
        "SELECT * FROM {}{} ORDER BY {}",
        R::TABLE,
        where_clause(filters),
        R::ORDER_BY
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(bound(filters).as_slice(), |row| R::from_row(row))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

pub fn count_records<R: Resource>(conn: &Connection, filters: &Columns) -> Result<i64, DbError> {
    let sql = format!("SELECT COUNT(*) FROM {}{}", R::TABLE, where_clause(filters));
    Ok(conn.query_row(&sql, bound(filters).as_slice(), |row| row.get(0))?)
}

/// Applies a partial update. Returns `None` when no row has this id.
pub fn update_record<R: Resource>(
    conn: &Connection,
    id: &str,
    mut changes: Columns,
) -> Result<Option<R>, DbError> {
    changes.push(("updated_at", Box::new(Utc::now())));

    let assignments: Vec<String> = changes
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        R::TABLE,
        assignments.join(", "),
        changes.len() + 1
    );

    let mut params = bound(&changes);
    params.push(&id);
    if conn.execute(&sql, params.as_slice())? == 0 {
        return Ok(None);
    }
    read_record::<R>(conn, id)
}

/// Deletes a row and hands it back so the caller can clean up its stored files.
pub fn delete_record<R: Resource>(conn: &Connection, id: &str) -> Result<Option<R>, DbError> {
    let existing = match read_record::<R>(conn, id)? {
        Some(record) => record,
        None => return Ok(None),
    };
    let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
    conn.execute(&sql, [id])?;
    Ok(Some(existing))
}

/// Every stored-object URL referenced by any row, for orphan detection.
pub fn referenced_object_urls(conn: &Connection) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT photo_url FROM membership_applications WHERE photo_url IS NOT NULL
         UNION SELECT photo_url FROM members WHERE photo_url IS NOT NULL
         UNION SELECT image_url FROM events WHERE image_url IS NOT NULL
         UNION SELECT image_url FROM gallery
         UNION SELECT image_url FROM news WHERE image_url IS NOT NULL",
    )?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut urls = Vec::new();
    for url in rows {
        urls.push(url?);
    }
    Ok(urls)
}

/// Whether any row still references the stored object at `url`.
pub fn object_url_referenced(conn: &Connection, url: &str) -> Result<bool, DbError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM membership_applications WHERE photo_url = ?1)
             OR EXISTS(SELECT 1 FROM members WHERE photo_url = ?1)
             OR EXISTS(SELECT 1 FROM events WHERE image_url = ?1)
             OR EXISTS(SELECT 1 FROM gallery WHERE image_url = ?1)
             OR EXISTS(SELECT 1 FROM news WHERE image_url = ?1)",
        [url],
        |row| row.get(0),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::community::{CarSticker, ContactMessage};
    use crate::models::enums::{MessageStatus, StickerStatus};
    use crate::models::ColumnSet;
    use crate::setup::db_setup;

    fn memory_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::setup_society_db(&mut conn).unwrap();
        conn
    }

    fn sticker_columns(car: &str) -> Columns {
        let mut cols = ColumnSet::new();
        cols.set("car_number", car.to_string());
        cols.set("owner_name", "A. Rahman".to_string());
        cols.set("phone", "01700000000".to_string());
        cols.set("house_number", "12".to_string());
        cols.set("road_number", "7".to_string());
        cols.set("status", StickerStatus::Pending);
        cols.into_columns()
    }

    #[test]
    fn insert_then_read_returns_the_same_row() {
        let conn = memory_db();
        let created: CarSticker = insert_record(&conn, sticker_columns("DHA-1234")).unwrap();
        let fetched: CarSticker = fetch_record(&conn, &created.id).unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.status, StickerStatus::Pending);
    }

    #[test]
    fn filters_are_equality_predicates() {
        let conn = memory_db();
        let first: CarSticker = insert_record(&conn, sticker_columns("DHA-1")).unwrap();
        insert_record::<CarSticker>(&conn, sticker_columns("DHA-2")).unwrap();

        let mut change = ColumnSet::new();
        change.set("status", StickerStatus::Active);
        update_record::<CarSticker>(&conn, &first.id, change.into_columns()).unwrap();

        let mut filter = ColumnSet::new();
        filter.set("status", StickerStatus::Active);
        let active: Vec<CarSticker> = list_records(&conn, &filter.into_columns()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].car_number, "DHA-1");
        assert_eq!(list_records::<CarSticker>(&conn, &Vec::new()).unwrap().len(), 2);
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let conn = memory_db();
        let mut change = ColumnSet::new();
        change.set("status", MessageStatus::Read);
        let updated = update_record::<ContactMessage>(&conn, "no-such-id", change.into_columns()).unwrap();
        assert!(updated.is_none());
        assert!(delete_record::<ContactMessage>(&conn, "no-such-id").unwrap().is_none());
        assert!(matches!(
            fetch_record::<ContactMessage>(&conn, "no-such-id"),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn shared_object_urls_are_detected() {
        let conn = memory_db();
        let url = "http://localhost:8080/media/member-photos/applications/1-aa.png";
        assert!(!object_url_referenced(&conn, url).unwrap());

        let mut cols = ColumnSet::new();
        cols.set("name", "Test Applicant".to_string());
        cols.set("membership_type", crate::models::enums::MembershipType::Life);
        cols.set("photo_url", url.to_string());
        cols.set("status", crate::models::enums::ApplicationStatus::Pending);
        insert_record::<crate::models::MembershipApplication>(&conn, cols.into_columns()).unwrap();
        assert!(object_url_referenced(&conn, url).unwrap());
    }

    #[test]
    fn delete_returns_the_removed_row() {
        let conn = memory_db();
        let created: CarSticker = insert_record(&conn, sticker_columns("DHA-9")).unwrap();
        let removed = delete_record::<CarSticker>(&conn, &created.id).unwrap();
        assert_eq!(removed.map(|s| s.id), Some(created.id.clone()));
        assert_eq!(count_records::<CarSticker>(&conn, &Vec::new()).unwrap(), 0);
    }
}
