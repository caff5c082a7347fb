//! SQLite database module for registry state
//!
//! All registry state lives in one SQLite database; every lookup is a point
//! lookup by primary key.
//!
//! ## Tables
//!
//! - `observers` - profiles (handle, activity counters)
//! - `observer_honors` - per-observer honor list (dense index)
//! - `records` - observation records plus confirmation counts
//! - `validations` - one mark per (record, validator)
//! - `honor_types` - admin-curated honor catalog
//! - `category_stats` - per-(observer, category) submission counters
//! - `counters` - global sequential ID counters

pub mod honors;
pub mod observers;
pub mod records;
pub mod schema;
pub mod stats;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, Transaction};
use tracing::{debug, info};

use crate::error::RegistryError;

/// SQLite database for registry state.
///
/// The mutex serializes all access: one operation executes to completion
/// before the next begins, matching the one-op-at-a-time discipline of the
/// environment that drives the registry.
pub struct RegistryDb {
    conn: Mutex<Connection>,
}

impl RegistryDb {
    /// Open or create the registry database
    pub fn open(storage_dir: &Path) -> Result<Self, RegistryError> {
        std::fs::create_dir_all(storage_dir)?;
        let db_path = storage_dir.join("registry.db");
        info!("Opening registry database at {:?}", db_path);

        let conn = Connection::open(&db_path)
            .map_err(|e| RegistryError::Database(format!("Failed to open SQLite: {}", e)))?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| RegistryError::Database(format!("Failed to set PRAGMA: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.with_conn(schema::init_schema)?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, RegistryError> {
        debug!("Opening in-memory registry database");

        let conn = Connection::open_in_memory()
            .map_err(|e| RegistryError::Database(format!("Failed to open in-memory SQLite: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.with_conn(schema::init_schema)?;

        Ok(db)
    }

    /// Execute a read operation
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&Connection) -> Result<T, RegistryError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RegistryError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a mutating operation inside a transaction.
    ///
    /// The transaction commits only if the closure succeeds; on any error
    /// every write of the call is rolled back, counter bumps included.
    pub fn with_txn<F, T>(&self, f: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&Transaction) -> Result<T, RegistryError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RegistryError::Internal(format!("Lock poisoned: {}", e)))?;

        let tx = conn
            .transaction()
            .map_err(|e| RegistryError::Database(format!("Failed to begin transaction: {}", e)))?;

        match f(&tx) {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| RegistryError::Database(format!("Commit failed: {}", e)))?;
                Ok(value)
            }
            // Dropping the transaction rolls it back
            Err(e) => Err(e),
        }
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats, RegistryError> {
        self.with_conn(|conn| {
            let count = |sql: &str| -> Result<i64, RegistryError> {
                conn.query_row(sql, [], |row| row.get(0))
                    .map_err(RegistryError::from)
            };

            Ok(DbStats {
                observers: count("SELECT COUNT(*) FROM observers")?,
                records: count("SELECT COUNT(*) FROM records")?,
                validations: count("SELECT COUNT(*) FROM validations")?,
                honor_types: count("SELECT COUNT(*) FROM honor_types")?,
            })
        })
    }
}

/// Increment a named counter and return the new value
pub fn bump_counter(conn: &Connection, name: &str) -> Result<i64, RegistryError> {
    let updated = conn.execute(
        "UPDATE counters SET value = value + 1 WHERE name = ?",
        params![name],
    )?;
    if updated == 0 {
        return Err(RegistryError::Internal(format!("Unknown counter: {}", name)));
    }
    let value: i64 = conn.query_row(
        "SELECT value FROM counters WHERE name = ?",
        params![name],
        |row| row.get(0),
    )?;
    Ok(value)
}

/// Read a named counter without incrementing it
pub fn counter_value(conn: &Connection, name: &str) -> Result<i64, RegistryError> {
    let value: i64 = conn.query_row(
        "SELECT value FROM counters WHERE name = ?",
        params![name],
        |row| row.get(0),
    )?;
    Ok(value)
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub observers: i64,
    pub records: i64,
    pub validations: i64,
    pub honor_types: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_seeded() {
        let db = RegistryDb::open_in_memory().unwrap();
        db.with_conn(|conn| {
            assert_eq!(counter_value(conn, "record_id")?, 0);
            assert_eq!(counter_value(conn, "honor_type_id")?, 0);
            assert_eq!(counter_value(conn, "op_seq")?, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_bump_counter_is_sequential() {
        let db = RegistryDb::open_in_memory().unwrap();
        db.with_txn(|tx| {
            assert_eq!(bump_counter(tx, "record_id")?, 1);
            assert_eq!(bump_counter(tx, "record_id")?, 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_unknown_counter_is_an_error() {
        let db = RegistryDb::open_in_memory().unwrap();
        let result = db.with_txn(|tx| bump_counter(tx, "no_such_counter"));
        assert!(result.is_err());
    }

    #[test]
    fn test_failed_txn_rolls_back_counter() {
        let db = RegistryDb::open_in_memory().unwrap();
        let result: Result<(), RegistryError> = db.with_txn(|tx| {
            bump_counter(tx, "record_id")?;
            Err(RegistryError::Internal("abort".into()))
        });
        assert!(result.is_err());

        db.with_conn(|conn| {
            assert_eq!(counter_value(conn, "record_id")?, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_reopen_preserves_schema_and_counters() {
        let dir = tempfile::tempdir().unwrap();

        {
            let db = RegistryDb::open(dir.path()).unwrap();
            db.with_txn(|tx| {
                bump_counter(tx, "record_id")?;
                Ok(())
            })
            .unwrap();
        }

        let db = RegistryDb::open(dir.path()).unwrap();
        db.with_conn(|conn| {
            assert_eq!(counter_value(conn, "record_id")?, 1);
            Ok(())
        })
        .unwrap();
    }
}
