//! Honor catalog operations

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Honor type definition from the admin-curated catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HonorType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub criteria: String,
    pub rarity: String,
    pub created_at: String,
}

impl HonorType {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            criteria: row.get("criteria")?,
            rarity: row.get("rarity")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Store a new honor type definition
pub fn insert_honor_type(
    conn: &Connection,
    id: i64,
    name: &str,
    description: &str,
    criteria: &str,
    rarity: &str,
    now: &str,
) -> Result<(), RegistryError> {
    conn.execute(
        "INSERT INTO honor_types (id, name, description, criteria, rarity, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![id, name, description, criteria, rarity, now],
    )?;
    Ok(())
}

/// Get an honor type by ID
pub fn get_honor_type(conn: &Connection, id: i64) -> Result<Option<HonorType>, RegistryError> {
    let mut stmt = conn.prepare("SELECT * FROM honor_types WHERE id = ?")?;
    let mut rows = stmt.query(params![id])?;

    if let Some(row) = rows.next()? {
        let honor_type = HonorType::from_row(row)
            .map_err(|e| RegistryError::Database(format!("Row parse failed: {}", e)))?;
        Ok(Some(honor_type))
    } else {
        Ok(None)
    }
}
