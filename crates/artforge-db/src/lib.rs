//! artforge-db: durable keyed storage for artwork processing state.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, typed models, and query modules for the per-item
//! schedule records the artwork processor keeps between runs.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;

pub use error::{Error, Result};
pub use models::ScheduleRecord;
pub use pool::{get_conn, init_memory_pool, init_pool, DbPool, PooledConnection};
