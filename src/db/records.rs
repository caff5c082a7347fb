//! Observation record and validation-mark operations

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Observation record row. Immutable after creation except
/// `confirmation_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub id: i64,
    pub submitter: String,
    pub target: String,
    pub category: String,
    pub right_ascension: String,
    pub declination: String,
    pub site: String,
    pub sky_quality: String,
    pub weather: String,
    pub equipment: String,
    pub notes: String,
    pub related_record: Option<i64>,
    pub confirmation_count: u32,
    /// Global operation sequence at creation time
    pub sequence: i64,
    pub created_at: String,
}

impl ObservationRecord {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            submitter: row.get("submitter")?,
            target: row.get("target")?,
            category: row.get("category")?,
            right_ascension: row.get("right_ascension")?,
            declination: row.get("declination")?,
            site: row.get("site")?,
            sky_quality: row.get("sky_quality")?,
            weather: row.get("weather")?,
            equipment: row.get("equipment")?,
            notes: row.get("notes")?,
            related_record: row.get("related_record")?,
            confirmation_count: row.get("confirmation_count")?,
            sequence: row.get("sequence")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Input for submitting an observation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservationInput {
    pub target: String,
    pub category: String,
    #[serde(default)]
    pub right_ascension: String,
    #[serde(default)]
    pub declination: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub sky_quality: String,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub related_record: Option<i64>,
}

/// Store a new record with confirmation count 0
pub fn insert_record(
    conn: &Connection,
    id: i64,
    submitter: &str,
    input: &ObservationInput,
    sequence: i64,
    now: &str,
) -> Result<(), RegistryError> {
    conn.execute(
        "INSERT INTO records (
            id, submitter, target, category, right_ascension, declination,
            site, sky_quality, weather, equipment, notes, related_record,
            sequence, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            submitter,
            input.target,
            input.category,
            input.right_ascension,
            input.declination,
            input.site,
            input.sky_quality,
            input.weather,
            input.equipment,
            input.notes,
            input.related_record,
            sequence,
            now
        ],
    )?;
    Ok(())
}

/// Get a record by ID
pub fn get_record(conn: &Connection, id: i64) -> Result<Option<ObservationRecord>, RegistryError> {
    let mut stmt = conn.prepare("SELECT * FROM records WHERE id = ?")?;
    let mut rows = stmt.query(params![id])?;

    if let Some(row) = rows.next()? {
        let record = ObservationRecord::from_row(row)
            .map_err(|e| RegistryError::Database(format!("Row parse failed: {}", e)))?;
        Ok(Some(record))
    } else {
        Ok(None)
    }
}

/// Increment a record's confirmation count and return the new value
pub fn increment_confirmations(conn: &Connection, id: i64) -> Result<u32, RegistryError> {
    conn.execute(
        "UPDATE records SET confirmation_count = confirmation_count + 1 WHERE id = ?",
        params![id],
    )?;
    let count: u32 = conn.query_row(
        "SELECT confirmation_count FROM records WHERE id = ?",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Check for a validation mark
pub fn has_validation(
    conn: &Connection,
    record_id: i64,
    validator: &str,
) -> Result<bool, RegistryError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM validations WHERE record_id = ? AND validator = ?",
        params![record_id, validator],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Create a validation mark. At most one per (record, validator); callers
/// check first so the rejection carries the right code.
pub fn insert_validation(
    conn: &Connection,
    record_id: i64,
    validator: &str,
    now: &str,
) -> Result<(), RegistryError> {
    conn.execute(
        "INSERT INTO validations (record_id, validator, created_at) VALUES (?, ?, ?)",
        params![record_id, validator, now],
    )?;
    Ok(())
}
