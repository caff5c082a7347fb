//! Observer profile and honor-list operations

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Observer profile row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverProfile {
    pub id: String,
    pub handle: String,
    pub submission_count: u32,
    pub validation_count: u32,
    /// Granted honor IDs in grant order
    pub honors: Vec<i64>,
    pub registered_at: String,
    pub updated_at: String,
}

impl ObserverProfile {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            handle: row.get("handle")?,
            submission_count: row.get("submission_count")?,
            validation_count: row.get("validation_count")?,
            honors: vec![], // Loaded separately
            registered_at: row.get("registered_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Get observer profile by identity
pub fn get_observer(conn: &Connection, id: &str) -> Result<Option<ObserverProfile>, RegistryError> {
    let mut stmt = conn.prepare("SELECT * FROM observers WHERE id = ?")?;
    let mut rows = stmt.query(params![id])?;

    if let Some(row) = rows.next()? {
        let mut profile = ObserverProfile::from_row(row)
            .map_err(|e| RegistryError::Database(format!("Row parse failed: {}", e)))?;
        profile.honors = honor_ids(conn, id)?;
        Ok(Some(profile))
    } else {
        Ok(None)
    }
}

/// Check whether a profile exists for this identity
pub fn exists(conn: &Connection, id: &str) -> Result<bool, RegistryError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM observers WHERE id = ?",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Create a profile with zeroed counters
pub fn insert_observer(
    conn: &Connection,
    id: &str,
    handle: &str,
    now: &str,
) -> Result<(), RegistryError> {
    conn.execute(
        "INSERT INTO observers (id, handle, registered_at, updated_at) VALUES (?, ?, ?, ?)",
        params![id, handle, now, now],
    )?;
    Ok(())
}

/// Update the handle of an existing profile. Counters and honors are kept.
pub fn update_handle(
    conn: &Connection,
    id: &str,
    handle: &str,
    now: &str,
) -> Result<(), RegistryError> {
    conn.execute(
        "UPDATE observers SET handle = ?, updated_at = ? WHERE id = ?",
        params![handle, now, id],
    )?;
    Ok(())
}

/// Increment the submission counter
pub fn increment_submissions(conn: &Connection, id: &str) -> Result<(), RegistryError> {
    conn.execute(
        "UPDATE observers SET submission_count = submission_count + 1 WHERE id = ?",
        params![id],
    )?;
    Ok(())
}

/// Increment the validation counter
pub fn increment_validations(conn: &Connection, id: &str) -> Result<(), RegistryError> {
    conn.execute(
        "UPDATE observers SET validation_count = validation_count + 1 WHERE id = ?",
        params![id],
    )?;
    Ok(())
}

/// Granted honor IDs for an observer, in grant order
pub fn honor_ids(conn: &Connection, id: &str) -> Result<Vec<i64>, RegistryError> {
    let mut stmt =
        conn.prepare("SELECT honor_id FROM observer_honors WHERE observer_id = ? ORDER BY idx")?;
    let honors: Vec<i64> = stmt
        .query_map(params![id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(honors)
}

/// Honor ID held at a dense list position, if any
pub fn honor_at(conn: &Connection, id: &str, idx: u32) -> Result<Option<i64>, RegistryError> {
    let mut stmt =
        conn.prepare("SELECT honor_id FROM observer_honors WHERE observer_id = ? AND idx = ?")?;
    let mut rows = stmt.query(params![id, idx])?;

    if let Some(row) = rows.next()? {
        Ok(Some(row.get(0)?))
    } else {
        Ok(None)
    }
}

/// Append an honor to the observer's list and return its position.
///
/// The UNIQUE (observer_id, honor_id) constraint makes a double grant a hard
/// database error; callers check held honors first.
pub fn grant_honor(
    conn: &Connection,
    id: &str,
    honor_id: i64,
    now: &str,
) -> Result<u32, RegistryError> {
    let idx: u32 = conn.query_row(
        "SELECT COUNT(*) FROM observer_honors WHERE observer_id = ?",
        params![id],
        |row| row.get(0),
    )?;
    conn.execute(
        "INSERT INTO observer_honors (observer_id, idx, honor_id, granted_at) VALUES (?, ?, ?, ?)",
        params![id, idx, honor_id, now],
    )?;
    Ok(idx)
}
