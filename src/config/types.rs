use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub language: LanguageConfig,

    #[serde(default)]
    pub artwork: ArtworkConfig,

    #[serde(default)]
    pub episodes: EpisodeConfig,

    #[serde(default)]
    pub movie_sets: MovieSetConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LanguageConfig {
    /// Force an artwork language instead of following the host UI language
    #[serde(default, rename = "override")]
    pub override_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtworkConfig {
    /// Preferred maximum width; larger candidates score as if shrunk to fit
    #[serde(default = "default_preferred_width")]
    pub preferred_width: u32,

    /// Preferred maximum height
    #[serde(default = "default_preferred_height")]
    pub preferred_height: u32,

    /// Candidates rated below this are never selected automatically
    #[serde(default)]
    pub minimum_rating: f64,

    /// Minimum width for automatically selected fanart-family images
    #[serde(default)]
    pub minimum_size: u32,

    /// Prefer fanart without baked-in titles
    #[serde(default)]
    pub titlefree_fanart: bool,

    /// Prefer posters without baked-in titles
    #[serde(default)]
    pub titlefree_poster: bool,

    /// Skip remote providers entirely and use filesystem art only
    #[serde(default)]
    pub only_filesystem: bool,
}

fn default_preferred_width() -> u32 {
    1920
}

fn default_preferred_height() -> u32 {
    1080
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            preferred_width: default_preferred_width(),
            preferred_height: default_preferred_height(),
            minimum_rating: 0.0,
            minimum_size: 0,
            titlefree_fanart: false,
            titlefree_poster: false,
            only_filesystem: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EpisodeConfig {
    /// External ids of shows whose episodes get artwork during a show run
    #[serde(default)]
    pub auto_fanart_shows: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MovieSetConfig {
    /// Look for set artwork in the parent folder shared by the set's movies
    #[serde(default)]
    pub artwork_from_parent: bool,

    /// Central directory holding `<set name>-<arttype>.<ext>` files
    #[serde(default)]
    pub central_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub api_key: String,
}

fn default_true() -> bool {
    true
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path of the schedule-state SQLite file
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "./artforge.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}
