//! Read/write contract against the host media library.
//!
//! The processor never talks to library storage directly; hosts implement
//! this trait over whatever API they expose (JSON-RPC, database, test
//! stubs).

use async_trait::async_trait;

use crate::media::{ArtMap, MediaItem, MediaType, SetMovie};

/// One season of a show as the library reports it.
#[derive(Debug, Clone)]
pub struct SeasonDetails {
    /// Season number within the show.
    pub number: u32,
    /// Library-internal season id, the write target for season art.
    pub season_id: i64,
    /// Art currently assigned at the season level.
    pub art: ArtMap,
}

#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Full details for one item, `None` when the id is unknown.
    async fn get_item(&self, media_type: MediaType, id: i64)
        -> anyhow::Result<Option<MediaItem>>;

    /// Seasons of a show, ascending by number.
    async fn get_seasons(&self, show_id: i64) -> anyhow::Result<Vec<SeasonDetails>>;

    /// All episodes of a show.
    async fn get_episodes(&self, show_id: i64) -> anyhow::Result<Vec<MediaItem>>;

    /// Constituent movies of a movie set.
    async fn get_set_movies(&self, set_id: i64) -> anyhow::Result<Vec<SetMovie>>;

    /// Apply an art diff to one item. Only ever called with a non-empty
    /// map; must be idempotent. Empty URL values clear the slot.
    async fn update_art(
        &self,
        media_type: MediaType,
        id: i64,
        changes: &ArtMap,
    ) -> anyhow::Result<()>;
}
