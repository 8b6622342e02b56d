//! Trait definition and types for remote artwork providers.
//!
//! This module defines the [`ArtworkProvider`] trait that all remote artwork
//! backends must implement, along with the shared data types returned by
//! provider queries.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::art::CandidateImage;
use crate::media::{MediaItem, MediaType};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// A single result returned from a movie-set search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSearchResult {
    /// Provider-specific identifier for the set (e.g. TMDB collection ID).
    pub id: String,
    /// Display name of the set.
    pub name: String,
    /// Short synopsis / overview text.
    pub overview: Option<String>,
}

/// Async trait that all remote artwork providers must implement.
///
/// Each provider wraps a single external API and exposes a uniform interface
/// for fetching artwork candidates keyed by exact art type. Providers are
/// expected to be cheaply shareable behind an `Arc` so they can be reused
/// across runs.
#[async_trait]
pub trait ArtworkProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"themoviedb.org"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has been configured with valid
    /// credentials and is ready to serve requests.
    fn is_available(&self) -> bool;

    /// Whether this provider serves artwork for the given media type.
    fn supports(&self, media_type: MediaType) -> bool;

    /// Fetch artwork candidates for an item, keyed by exact art type.
    ///
    /// Show-level queries include per-season keys (`season.N.poster`) for
    /// the seasons listed on the item. The item must carry the external id
    /// this provider understands.
    async fn get_images(
        &self,
        item: &MediaItem,
    ) -> anyhow::Result<HashMap<String, Vec<CandidateImage>>>;

    /// Search for movie sets matching `name`.
    ///
    /// Only meaningful for providers that model collections; the default
    /// implementation returns no results.
    async fn search_set(&self, _name: &str) -> anyhow::Result<Vec<SetSearchResult>> {
        Ok(Vec::new())
    }
}
