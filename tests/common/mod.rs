//! Shared stub collaborators for processor integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use artforge::art::CandidateImage;
use artforge::gatherer::{GatheredArt, Gatherer, ProviderError};
use artforge::library::{MediaLibrary, SeasonDetails};
use artforge::media::{ArtMap, MediaItem, MediaKind, MediaType, SetMovie};
use artforge::picker::{ArtworkPicker, PickOutcome};
use artforge::providers::{ArtworkProvider, SetSearchResult};
use artforge::selection::SelectionContext;

/// Library stub: serves canned items and records every art write.
#[derive(Default)]
pub struct StubLibrary {
    pub items: Mutex<HashMap<(MediaType, i64), MediaItem>>,
    pub seasons: Mutex<HashMap<i64, Vec<SeasonDetails>>>,
    pub episodes: Mutex<HashMap<i64, Vec<MediaItem>>>,
    pub updates: Mutex<Vec<(MediaType, i64, ArtMap)>>,
}

impl StubLibrary {
    pub fn updates_for(&self, media_type: MediaType, id: i64) -> Vec<ArtMap> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(mt, i, _)| *mt == media_type && *i == id)
            .map(|(_, _, art)| art.clone())
            .collect()
    }

    /// All writes for one id folded into a single map, later writes
    /// overriding earlier ones.
    pub fn merged_art(&self, media_type: MediaType, id: i64) -> ArtMap {
        let mut merged = ArtMap::new();
        for art in self.updates_for(media_type, id) {
            merged.extend(art);
        }
        merged
    }
}

#[async_trait]
impl MediaLibrary for StubLibrary {
    async fn get_item(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> anyhow::Result<Option<MediaItem>> {
        Ok(self.items.lock().unwrap().get(&(media_type, id)).cloned())
    }

    async fn get_seasons(&self, show_id: i64) -> anyhow::Result<Vec<SeasonDetails>> {
        Ok(self
            .seasons
            .lock()
            .unwrap()
            .get(&show_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_episodes(&self, show_id: i64) -> anyhow::Result<Vec<MediaItem>> {
        Ok(self
            .episodes
            .lock()
            .unwrap()
            .get(&show_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_set_movies(&self, _set_id: i64) -> anyhow::Result<Vec<SetMovie>> {
        Ok(Vec::new())
    }

    async fn update_art(
        &self,
        media_type: MediaType,
        id: i64,
        changes: &ArtMap,
    ) -> anyhow::Result<()> {
        assert!(!changes.is_empty(), "update_art called with an empty diff");
        self.updates
            .lock()
            .unwrap()
            .push((media_type, id, changes.clone()));
        Ok(())
    }
}

/// Gatherer stub: canned candidates per item id, optional provider error,
/// and an optional cancellation trigger after N served items.
pub struct StubGatherer {
    pub candidates: HashMap<i64, HashMap<String, Vec<CandidateImage>>>,
    pub forced: HashMap<i64, HashMap<String, Vec<CandidateImage>>>,
    pub error: Option<ProviderError>,
    pub services_hit: bool,
    pub served: AtomicUsize,
    pub cancel_after: Option<(usize, watch::Sender<bool>)>,
}

impl StubGatherer {
    pub fn new() -> Self {
        StubGatherer {
            candidates: HashMap::new(),
            forced: HashMap::new(),
            error: None,
            services_hit: true,
            served: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    pub fn with_candidates(
        mut self,
        item_id: i64,
        art_type: &str,
        candidates: Vec<CandidateImage>,
    ) -> Self {
        self.candidates
            .entry(item_id)
            .or_default()
            .insert(art_type.to_string(), candidates);
        self
    }

    pub fn with_forced(
        mut self,
        item_id: i64,
        art_type: &str,
        candidates: Vec<CandidateImage>,
    ) -> Self {
        self.forced
            .entry(item_id)
            .or_default()
            .insert(art_type.to_string(), candidates);
        self
    }

    /// Request cancellation once `count` items have been gathered for.
    pub fn cancelling_after(mut self, count: usize, tx: watch::Sender<bool>) -> Self {
        self.cancel_after = Some((count, tx));
        self
    }
}

#[async_trait]
impl Gatherer for StubGatherer {
    async fn gather(&self, item: &MediaItem, _ctx: &SelectionContext) -> GatheredArt {
        let served = self.served.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, tx)) = &self.cancel_after {
            if served >= *after {
                let _ = tx.send(true);
            }
        }

        GatheredArt {
            forced: self.forced.get(&item.id).cloned().unwrap_or_default(),
            available: self.candidates.get(&item.id).cloned().unwrap_or_default(),
            services_hit: self.services_hit,
            error: self.error.clone(),
        }
    }
}

/// Provider stub that only answers collection searches.
pub struct StubSetProvider {
    pub results: Vec<SetSearchResult>,
}

impl StubSetProvider {
    pub fn with_result(id: &str, name: &str) -> Self {
        StubSetProvider {
            results: vec![SetSearchResult {
                id: id.to_string(),
                name: name.to_string(),
                overview: None,
            }],
        }
    }
}

#[async_trait]
impl ArtworkProvider for StubSetProvider {
    fn name(&self) -> &'static str {
        "stub collections"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn supports(&self, media_type: MediaType) -> bool {
        media_type == MediaType::MovieSet
    }

    async fn get_images(
        &self,
        _item: &MediaItem,
    ) -> anyhow::Result<HashMap<String, Vec<CandidateImage>>> {
        Ok(HashMap::new())
    }

    async fn search_set(&self, _name: &str) -> anyhow::Result<Vec<SetSearchResult>> {
        Ok(self.results.clone())
    }
}

/// Picker stub that replays a scripted sequence of outcomes.
pub struct StubPicker {
    pub outcomes: Mutex<Vec<PickOutcome>>,
    pub set_name: Option<String>,
}

impl StubPicker {
    pub fn with_outcomes(outcomes: Vec<PickOutcome>) -> Self {
        StubPicker {
            outcomes: Mutex::new(outcomes),
            set_name: None,
        }
    }
}

#[async_trait]
impl ArtworkPicker for StubPicker {
    async fn pick(
        &self,
        _item: &MediaItem,
        _available: &HashMap<String, Vec<CandidateImage>>,
    ) -> anyhow::Result<PickOutcome> {
        let mut outcomes = self.outcomes.lock().unwrap();
        anyhow::ensure!(
            !outcomes.is_empty(),
            "picker called more often than scripted"
        );
        Ok(outcomes.remove(0))
    }

    async fn prompt_set_name(&self, current: &str) -> anyhow::Result<Option<String>> {
        Ok(Some(
            self.set_name.clone().unwrap_or_else(|| current.to_string()),
        ))
    }

    async fn select_set(
        &self,
        results: &[SetSearchResult],
    ) -> anyhow::Result<Option<SetSearchResult>> {
        Ok(results.first().cloned())
    }
}

pub fn movie(id: i64, label: &str) -> MediaItem {
    let mut item = MediaItem::new(id, label, MediaKind::Movie { premiered: None });
    item.unique_ids
        .insert("imdb".to_string(), format!("tt{id:07}"));
    item
}

pub fn remote_candidate(url: &str) -> CandidateImage {
    CandidateImage::new(url, "themoviedb.org")
        .with_rating(7.0)
        .with_size(1920, 1080)
}
