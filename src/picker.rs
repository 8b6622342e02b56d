//! Interactive selection contract.
//!
//! The processor prepares the merged candidate pool; something with a UI
//! implements this trait to let a human choose. Rendering is entirely the
//! host's concern.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::art::CandidateImage;
use crate::media::MediaItem;
use crate::providers::SetSearchResult;

/// What the user picked for one art type.
#[derive(Debug, Clone)]
pub enum PickedSelection {
    /// Single-select types: the chosen URL.
    Single(String),
    /// Multiselect types: URLs to add and existing URLs to drop. The
    /// remaining existing URLs survive and get renumbered together with
    /// the additions.
    Multi {
        add: Vec<String>,
        remove: Vec<String>,
    },
}

/// Outcome of presenting the candidate pool.
#[derive(Debug, Clone)]
pub enum PickOutcome {
    /// The user dismissed the dialog; nothing changes.
    Cancelled,
    /// The user asked to re-identify the item instead of picking art.
    Identify,
    Picked {
        art_type: String,
        selection: PickedSelection,
    },
}

#[async_trait]
pub trait ArtworkPicker: Send + Sync {
    /// Present the merged pool for one item and collect a choice.
    async fn pick(
        &self,
        item: &MediaItem,
        available: &HashMap<String, Vec<CandidateImage>>,
    ) -> anyhow::Result<PickOutcome>;

    /// Ask for a search name during movie-set identification; `None`
    /// cancels the sub-flow.
    async fn prompt_set_name(&self, current: &str) -> anyhow::Result<Option<String>>;

    /// Let the user choose among collection search results.
    async fn select_set(
        &self,
        results: &[SetSearchResult],
    ) -> anyhow::Result<Option<SetSearchResult>>;
}
