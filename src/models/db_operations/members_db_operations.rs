use rusqlite::{params, Connection};

use super::DbError;

/// Whether another member already holds `membership_number`.
/// `excluding` skips the row being edited.
pub fn membership_number_in_use(
    conn: &Connection,
    membership_number: &str,
    excluding: Option<&str>,
) -> Result<bool, DbError> {
    let taken = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM members WHERE membership_number = ?1 AND id IS NOT ?2)",
        params![membership_number, excluding],
        |row| row.get(0),
    )?;
    Ok(taken)
}

pub fn count_members_with_number(conn: &Connection, membership_number: &str) -> Result<i64, DbError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM members WHERE membership_number = ?1",
        [membership_number],
        |row| row.get(0),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup;

    fn seed_member(conn: &Connection, id: &str, number: &str) {
        conn.execute(
            "INSERT INTO members (id, membership_number, membership_type, name, membership_date, status, created_at, updated_at)
             VALUES (?1, ?2, 'life', 'Test', '2024-01-01', 'active', '2024-01-01 00:00:00+00:00', '2024-01-01 00:00:00+00:00')",
            params![id, number],
        )
        .unwrap();
    }

    #[test]
    fn number_check_ignores_the_row_being_edited() {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::setup_society_db(&mut conn).unwrap();
        seed_member(&conn, "m-1", "L-100");

        assert!(membership_number_in_use(&conn, "L-100", None).unwrap());
        assert!(!membership_number_in_use(&conn, "L-100", Some("m-1")).unwrap());
        assert!(membership_number_in_use(&conn, "L-100", Some("m-2")).unwrap());
        assert!(!membership_number_in_use(&conn, "L-101", None).unwrap());
        assert_eq!(count_members_with_number(&conn, "L-100").unwrap(), 1);
    }
}
