//! Typed row models for the persistence layer.

use chrono::{DateTime, Utc};
use rusqlite::Row;

/// Durable per-item processing state.
///
/// Keyed by (media id, media type). Created the first time an item is
/// observed, updated in place afterwards; normal operation never deletes
/// a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRecord {
    /// Library-internal identifier of the media item.
    pub media_id: i64,
    /// Media type discriminator ("movie", "tvshow", "episode", "set", ...).
    pub media_type: String,
    /// When the item next becomes eligible for an automatic re-check.
    pub next_check: Option<DateTime<Utc>>,
    /// Cached external identifier (movie-set collection id, TV show
    /// season identity).
    pub unique_id: Option<String>,
}

impl ScheduleRecord {
    /// Build a record from a row selected with the canonical column order
    /// `media_id, media_type, next_check, unique_id`.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let next_check: Option<String> = row.get(2)?;
        Ok(ScheduleRecord {
            media_id: row.get(0)?,
            media_type: row.get(1)?,
            next_check: next_check
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            unique_id: row.get(3)?,
        })
    }
}
