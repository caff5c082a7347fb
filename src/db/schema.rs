//! Database schema definitions

use rusqlite::Connection;
use tracing::info;

use crate::error::RegistryError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<(), RegistryError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new registry schema v{}", SCHEMA_VERSION);
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating schema from v{} to v{}",
            current_version, SCHEMA_VERSION
        );
        migrate_schema(conn, current_version)?;
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32, RegistryError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|e| RegistryError::Database(format!("Failed to create schema_version table: {}", e)))?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), RegistryError> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| RegistryError::Database(format!("Failed to clear schema_version: {}", e)))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])
        .map_err(|e| RegistryError::Database(format!("Failed to set schema_version: {}", e)))?;
    Ok(())
}

/// Create all tables
fn create_tables(conn: &Connection) -> Result<(), RegistryError> {
    conn.execute_batch(REGISTRY_SCHEMA)
        .map_err(|e| RegistryError::Database(format!("Failed to create registry tables: {}", e)))?;

    conn.execute_batch(COUNTER_SEED)
        .map_err(|e| RegistryError::Database(format!("Failed to seed counters: {}", e)))?;

    conn.execute_batch(INDEXES_SCHEMA)
        .map_err(|e| RegistryError::Database(format!("Failed to create indexes: {}", e)))?;

    Ok(())
}

/// Migrate schema from older version
fn migrate_schema(conn: &Connection, from_version: i32) -> Result<(), RegistryError> {
    // Add migration steps here as schema evolves
    match from_version {
        _ => {}
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

/// Registry tables
const REGISTRY_SCHEMA: &str = r#"
-- Observer profiles, keyed by principal identity.
-- Counters are monotonic; profiles are never deleted.
CREATE TABLE IF NOT EXISTS observers (
    id TEXT PRIMARY KEY NOT NULL,
    handle TEXT NOT NULL,
    submission_count INTEGER NOT NULL DEFAULT 0,
    validation_count INTEGER NOT NULL DEFAULT 0,
    registered_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Per-observer honor list. idx is the dense 0-based position used by
-- fetch-honor-by-index; an honor is held at most once per observer.
CREATE TABLE IF NOT EXISTS observer_honors (
    observer_id TEXT NOT NULL,
    idx INTEGER NOT NULL,
    honor_id INTEGER NOT NULL,
    granted_at TEXT NOT NULL,
    PRIMARY KEY (observer_id, idx),
    UNIQUE (observer_id, honor_id)
);

-- Observation records. Immutable after creation except confirmation_count.
-- IDs come from the record_id counter, never SQLite rowid autoincrement,
-- so allocation shares the transaction with the insert.
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY NOT NULL,
    submitter TEXT NOT NULL,
    target TEXT NOT NULL,
    category TEXT NOT NULL,
    right_ascension TEXT NOT NULL,
    declination TEXT NOT NULL,
    site TEXT NOT NULL,
    sky_quality TEXT NOT NULL,
    weather TEXT NOT NULL,
    equipment TEXT NOT NULL,
    notes TEXT NOT NULL,
    related_record INTEGER,
    confirmation_count INTEGER NOT NULL DEFAULT 0,
    sequence INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

-- Validation marks, insert-only, at most one per (record, validator).
CREATE TABLE IF NOT EXISTS validations (
    record_id INTEGER NOT NULL,
    validator TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (record_id, validator)
);

-- Admin-curated honor catalog. Immutable once created.
CREATE TABLE IF NOT EXISTS honor_types (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    criteria TEXT NOT NULL,
    rarity TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Per-(observer, category) submission counters.
CREATE TABLE IF NOT EXISTS category_stats (
    observer_id TEXT NOT NULL,
    category TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (observer_id, category)
);

-- Global sequential counters. Bumped only inside the transaction of the
-- write they number, so a failed call never advances them.
CREATE TABLE IF NOT EXISTS counters (
    name TEXT PRIMARY KEY NOT NULL,
    value INTEGER NOT NULL
);
"#;

/// Counter rows expected by the registry
const COUNTER_SEED: &str = r#"
INSERT OR IGNORE INTO counters (name, value) VALUES
    ('record_id', 0),
    ('honor_type_id', 0),
    ('op_seq', 0);
"#;

/// Indexes
const INDEXES_SCHEMA: &str = r#"
CREATE INDEX IF NOT EXISTS idx_records_submitter ON records(submitter);
CREATE INDEX IF NOT EXISTS idx_validations_validator ON validations(validator);
"#;
