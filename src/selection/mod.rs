//! The selection engine: candidate ranking, auto-selection policy,
//! missing-slot filling, diff-based reconciliation, and the merge step
//! that prepares candidates for human review.
//!
//! Everything in this module is pure: no I/O, no shared state. The
//! orchestrator feeds it gathered candidates and applies the results.

mod diff;
mod fill;
mod rank;
mod review;

pub use diff::{diff, renumber_all, renumber_base};
pub use fill::{accepts, fill_missing};
pub use rank::rank;
pub use review::tag_for_review;

use crate::config::Config;

/// Per-run policy inputs for candidate scoring and filtering.
#[derive(Debug, Clone)]
pub struct SelectionContext {
    /// Active UI language (override applied), ISO-639-1.
    pub language: String,
    /// Ordered language fallback list. Includes `None` so language-free
    /// art always qualifies.
    pub languages: Vec<Option<String>>,
    /// Preferred maximum dimensions; larger images are scored as if
    /// shrunk to fit.
    pub preferred_size: (u32, u32),
    /// Candidates rated below this are never auto-selected.
    pub minimum_rating: f64,
    /// Fanart-family candidates narrower than this are never
    /// auto-selected.
    pub minimum_size: u32,
    /// Deprioritize fanart with baked-in titles.
    pub titlefree_fanart: bool,
    /// Deprioritize posters with baked-in titles.
    pub titlefree_poster: bool,
}

impl SelectionContext {
    /// Build the context for a run: the fallback list is the active
    /// language, then English when the active language differs, then
    /// `None` (language-free art), then the configured override when not
    /// already present. The override also becomes the active language
    /// for ranking.
    pub fn new(active_language: &str, config: &Config) -> Self {
        let mut languages: Vec<Option<String>> = vec![Some(active_language.to_string())];
        if active_language != "en" {
            languages.push(Some("en".to_string()));
        }
        languages.push(None);

        let mut language = active_language.to_string();
        if let Some(over) = config
            .language
            .override_language
            .as_deref()
            .filter(|s| !s.is_empty())
        {
            language = over.to_string();
            if !languages.iter().any(|l| l.as_deref() == Some(over)) {
                languages.push(Some(over.to_string()));
            }
        }

        SelectionContext {
            language,
            languages,
            preferred_size: (
                config.artwork.preferred_width,
                config.artwork.preferred_height,
            ),
            minimum_rating: config.artwork.minimum_rating,
            minimum_size: config.artwork.minimum_size,
            titlefree_fanart: config.artwork.titlefree_fanart,
            titlefree_poster: config.artwork.titlefree_poster,
        }
    }
}
