//! Media item model as seen by the artwork processor.
//!
//! These types mirror what the host library reports for an item: a shared
//! base field set plus a [`MediaKind`] variant carrying type-specific data.
//! Per-run derived state (gathered candidates, selected art) is kept by the
//! processor, not here.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Map of exact art type (e.g. `fanart2`, `season.1.poster`) to URL.
/// An empty URL means the slot is assigned but unset.
pub type ArtMap = HashMap<String, String>;

/// The media types the processor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    TvShow,
    Episode,
    Season,
    MovieSet,
}

impl MediaType {
    /// Stable string form, used as the persistence discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::TvShow => "tvshow",
            MediaType::Episode => "episode",
            MediaType::Season => "season",
            MediaType::MovieSet => "set",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movie belonging to a set, as reported by the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMovie {
    /// Library-internal movie id.
    pub id: i64,
    /// Display label.
    pub label: String,
    /// Path of the movie's primary file.
    pub file: String,
}

/// Type-specific fields of a media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MediaKind {
    Movie {
        /// Release date, used for freshness-based scheduling.
        premiered: Option<NaiveDate>,
    },
    TvShow {
        /// Premiere date of the show.
        premiered: Option<NaiveDate>,
        /// Season number -> library-internal season id.
        seasons: BTreeMap<u32, i64>,
    },
    Episode,
    Season {
        /// Season number within the parent show.
        number: u32,
    },
    MovieSet {
        /// Constituent movies, used to derive a set folder path.
        movies: Vec<SetMovie>,
    },
}

/// A single item from the host library, plus the identification state the
/// processor resolves for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Library-internal id.
    pub id: i64,
    /// Display label.
    pub label: String,
    /// Path of the item's primary file, when it has one.
    pub file: Option<String>,
    /// Currently assigned art. Empty URL values mean "unset".
    pub art: ArtMap,
    /// Raw external id map keyed by id authority (e.g. "unknown", "tmdb").
    pub unique_ids: HashMap<String, String>,
    /// The resolved external id used for provider lookups.
    pub unique_id: Option<String>,
    /// Base art types excluded for this run (e.g. fanart for episodes of
    /// shows without episode backdrops).
    pub skip: Vec<String>,
    /// Type-specific fields.
    pub kind: MediaKind,
}

impl MediaItem {
    /// Create an item with empty art and no external ids.
    pub fn new(id: i64, label: impl Into<String>, kind: MediaKind) -> Self {
        MediaItem {
            id,
            label: label.into(),
            file: None,
            art: ArtMap::new(),
            unique_ids: HashMap::new(),
            unique_id: None,
            skip: Vec::new(),
            kind,
        }
    }

    /// The media type implied by this item's kind.
    pub fn media_type(&self) -> MediaType {
        match self.kind {
            MediaKind::Movie { .. } => MediaType::Movie,
            MediaKind::TvShow { .. } => MediaType::TvShow,
            MediaKind::Episode => MediaType::Episode,
            MediaKind::Season { .. } => MediaType::Season,
            MediaKind::MovieSet { .. } => MediaType::MovieSet,
        }
    }

    /// Release date for movies and shows; `None` for other kinds.
    pub fn premiered(&self) -> Option<NaiveDate> {
        match &self.kind {
            MediaKind::Movie { premiered } | MediaKind::TvShow { premiered, .. } => *premiered,
            _ => None,
        }
    }

    /// Exact art types currently holding a non-empty URL.
    pub fn existing_art_keys(&self) -> Vec<String> {
        self.art
            .iter()
            .filter(|(_, url)| !url.is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }
}
