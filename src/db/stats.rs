//! Per-(observer, category) submission counters

use rusqlite::{params, Connection};

use crate::error::RegistryError;

/// Create the counter at 1 on first submission, else increment
pub fn increment_category(
    conn: &Connection,
    observer_id: &str,
    category: &str,
) -> Result<(), RegistryError> {
    conn.execute(
        "INSERT INTO category_stats (observer_id, category, count) VALUES (?, ?, 1)
         ON CONFLICT (observer_id, category) DO UPDATE SET count = count + 1",
        params![observer_id, category],
    )?;
    Ok(())
}

/// Submission count for (observer, category); 0 if absent
pub fn category_count(
    conn: &Connection,
    observer_id: &str,
    category: &str,
) -> Result<u32, RegistryError> {
    let count: u32 = conn
        .query_row(
            "SELECT count FROM category_stats WHERE observer_id = ? AND category = ?",
            params![observer_id, category],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(count)
}
