//! Schedule record operations.
//!
//! Every write is a single upsert statement; there are no multi-statement
//! transactions spanning records. Concurrent writers are not supported --
//! the processor's external busy flag is the only serialization mechanism.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::models::ScheduleRecord;

const COLS: &str = "media_id, media_type, next_check, unique_id";

/// Fetch the full record for a (media id, media type) key.
pub fn get_record(
    conn: &Connection,
    media_id: i64,
    media_type: &str,
) -> Result<Option<ScheduleRecord>> {
    let q = format!("SELECT {COLS} FROM processed_items WHERE media_id = ?1 AND media_type = ?2");
    let result = conn.query_row(
        &q,
        rusqlite::params![media_id, media_type],
        ScheduleRecord::from_row,
    );
    match result {
        Ok(r) => Ok(Some(r)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Return whether a record exists for the key.
pub fn exists(conn: &Connection, media_id: i64, media_type: &str) -> Result<bool> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM processed_items WHERE media_id = ?1 AND media_type = ?2",
            rusqlite::params![media_id, media_type],
            |row| row.get(0),
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Set (or clear) the next-check date for the key, creating the record if
/// it does not exist yet.
pub fn set_next_check(
    conn: &Connection,
    media_id: i64,
    media_type: &str,
    next_check: Option<DateTime<Utc>>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO processed_items (media_id, media_type, next_check)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(media_id, media_type) DO UPDATE SET
            next_check = excluded.next_check",
        rusqlite::params![media_id, media_type, next_check.map(|dt| dt.to_rfc3339())],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Get the next-check date for the key, if any.
pub fn get_next_check(
    conn: &Connection,
    media_id: i64,
    media_type: &str,
) -> Result<Option<DateTime<Utc>>> {
    Ok(get_record(conn, media_id, media_type)?.and_then(|r| r.next_check))
}

/// Set (or clear) the cached external identifier for the key, creating
/// the record if it does not exist yet.
pub fn set_unique_id(
    conn: &Connection,
    media_id: i64,
    media_type: &str,
    unique_id: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO processed_items (media_id, media_type, unique_id)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(media_id, media_type) DO UPDATE SET
            unique_id = excluded.unique_id",
        rusqlite::params![media_id, media_type, unique_id],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Get the cached external identifier for the key, if any.
pub fn get_unique_id(
    conn: &Connection,
    media_id: i64,
    media_type: &str,
) -> Result<Option<String>> {
    Ok(get_record(conn, media_id, media_type)?.and_then(|r| r.unique_id))
}

/// Return whether the item is due for an automatic re-check at `now`:
/// true when no record exists, or when its next-check date is unset or in
/// the past.
pub fn should_check(
    conn: &Connection,
    media_id: i64,
    media_type: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM processed_items
             WHERE media_id = ?1 AND media_type = ?2 AND next_check > ?3",
            rusqlite::params![media_id, media_type, now.to_rfc3339()],
            |row| row.get(0),
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n == 0)
}

/// List records whose next-check date is unset or has passed, ordered by
/// next-check date ascending (unset first).
pub fn list_due(conn: &Connection, now: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduleRecord>> {
    let q = format!(
        "SELECT {COLS} FROM processed_items
         WHERE next_check IS NULL OR next_check <= ?1
         ORDER BY next_check ASC LIMIT ?2"
    );
    let mut stmt = conn
        .prepare(&q)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params![now.to_rfc3339(), limit],
            ScheduleRecord::from_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
