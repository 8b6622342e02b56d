//! r2d2-backed sqlite pool for the schedule store.
//!
//! The store holds one table and is effectively single-writer (the
//! processor's busy flag is the only serialization), so the pool stays
//! small. WAL keeps concurrent readers from blocking the writer and a
//! busy timeout covers the rare overlap.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::{Error, Result};
use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const POOL_SIZE: u32 = 2;
const BUSY_TIMEOUT_MS: u32 = 5000;

fn configure(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};",
    ))
}

/// Open (or create) the schedule database at a filesystem path and run
/// pending migrations.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(configure);
    build(manager)
}

/// In-memory pool for tests.
///
/// Each call gets a uniquely named shared-cache database: connections
/// within one pool see the same data, parallel tests do not.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:artforge_schedule_{n}?mode=memory&cache=shared");

    let manager = SqliteConnectionManager::file(uri).with_init(configure);
    build(manager)
}

fn build(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .map_err(|e| Error::database(format!("failed to build sqlite pool: {e}")))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("no connection to run migrations: {e}")))?;
    migrations::run_migrations(&conn)?;

    Ok(pool)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("failed to get connection from pool: {e}")))
}
