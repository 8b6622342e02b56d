//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// V1: initial schema.
///
/// One row per (media id, media type): the next date an item becomes
/// eligible for an automatic re-check, plus a cached external identifier
/// (movie-set collection id, TV show season identity). The jittered
/// next-check date is computed once and persisted so an item does not get
/// multiple attempts to pass the random delay.
const V1_INITIAL: &str = r#"
CREATE TABLE processed_items (
    media_id   INTEGER NOT NULL,
    media_type TEXT NOT NULL,
    next_check TEXT,
    unique_id  TEXT,
    PRIMARY KEY (media_id, media_type)
);

CREATE INDEX idx_processed_items_next_check ON processed_items(next_check);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

/// Run all pending migrations on the given connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .map_err(|e| Error::database(e.to_string()))?;

    for (version, sql) in MIGRATIONS {
        let applied: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get::<_, i64>(0).map(|n| n > 0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if applied {
            continue;
        }

        conn.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration v{version} failed: {e}")))?;
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![version, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    }

    Ok(())
}
