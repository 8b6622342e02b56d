//! Scheduling: durable next-check state plus jittered delay computation.
//!
//! The store is a thin facade over the pooled sqlite database; delays are
//! whole days with uniform jitter from an injected random source so tests
//! can seed it.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;

use artforge_db::{get_conn, queries::schedule, DbPool};

use crate::media::{MediaItem, MediaType};

/// Days after which a premiere no longer counts as fresh.
pub const FRESHNESS_WINDOW_DAYS: i64 = 365;

/// Durable per-item schedule state keyed by (media id, media type).
pub struct ScheduleStore {
    pool: DbPool,
}

impl ScheduleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (or create) the store at a filesystem path.
    pub fn open(path: &str) -> Result<Self> {
        let pool = artforge_db::init_pool(path)
            .with_context(|| format!("failed to open schedule database: {path}"))?;
        Ok(Self::new(pool))
    }

    /// Whether the item is due for an automatic re-check at `now`.
    pub fn should_check(
        &self,
        media_type: MediaType,
        media_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        Ok(schedule::should_check(
            &conn,
            media_id,
            media_type.as_str(),
            now,
        )?)
    }

    /// Persist the next-check date, creating the record on first contact.
    pub fn set_next_check(
        &self,
        media_type: MediaType,
        media_id: i64,
        next_check: DateTime<Utc>,
    ) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        schedule::set_next_check(&conn, media_id, media_type.as_str(), Some(next_check))?;
        Ok(())
    }

    /// Cached external identifier for the key, if any.
    pub fn cached_unique_id(&self, media_type: MediaType, media_id: i64) -> Result<Option<String>> {
        let conn = get_conn(&self.pool)?;
        Ok(schedule::get_unique_id(
            &conn,
            media_id,
            media_type.as_str(),
        )?)
    }

    /// Cache (or clear) the external identifier for the key.
    pub fn cache_unique_id(
        &self,
        media_type: MediaType,
        media_id: i64,
        unique_id: Option<&str>,
    ) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        schedule::set_unique_id(&conn, media_id, media_type.as_str(), unique_id)?;
        Ok(())
    }

    /// Whether the item has ever been seen by the processor.
    pub fn seen_before(&self, media_type: MediaType, media_id: i64) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        Ok(schedule::exists(&conn, media_id, media_type.as_str())?)
    }
}

/// Uniform whole-day jitter in `[base - range, base + range]`.
fn plus_some<R: Rng>(rng: &mut R, base: i64, range: i64) -> i64 {
    rng.gen_range(base - range..=base + range)
}

/// Delay before retrying an item that could not be identified.
pub fn identification_retry_delay<R: Rng>(rng: &mut R) -> Duration {
    Duration::days(plus_some(rng, 15, 5))
}

/// Delay until the next automatic check of a successfully processed item.
///
/// Filesystem-only runs re-check soon since they are cheap; items with
/// nothing missing wait the longest; recently premiered movies and shows
/// re-check sooner because new artwork keeps appearing for them.
pub fn compute_delay<R: Rng>(
    rng: &mut R,
    item: &MediaItem,
    only_filesystem: bool,
    nothing_missing: bool,
    fresh_cutoff: NaiveDate,
) -> Duration {
    let days = if only_filesystem {
        plus_some(rng, 5, 3)
    } else if nothing_missing {
        plus_some(rng, 120, 25)
    } else if item.premiered().is_some_and(|p| p > fresh_cutoff) {
        plus_some(rng, 30, 10)
    } else {
        plus_some(rng, 60, 15)
    };
    Duration::days(days)
}

/// The cutoff before which a premiere no longer counts as fresh.
pub fn freshness_cutoff(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::days(FRESHNESS_WINDOW_DAYS)).date_naive()
}
