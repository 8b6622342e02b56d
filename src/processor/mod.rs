//! The run controller: drives batch and single-item artwork runs end to
//! end. Identification, fetch, reconcile (automatic or interactive),
//! write-back, rescheduling, progress, and cancellation all live here;
//! the actual selection math is delegated to `crate::selection`.

pub mod identify;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::art::{base_type, natural_cmp, split_season_key, CandidateImage, PROTECTED_TYPES};
use crate::art::policy::missing_art_types;
use crate::config::Config;
use crate::gatherer::{GatheredArt, Gatherer};
use crate::library::MediaLibrary;
use crate::media::{ArtMap, MediaItem, MediaKind, MediaType};
use crate::notify::{LogNotifier, LogProgress, Notifier, ProgressReporter};
use crate::picker::{ArtworkPicker, PickOutcome, PickedSelection};
use crate::providers::ArtworkProvider;
use crate::schedule::{
    compute_delay, freshness_cutoff, identification_retry_delay, ScheduleStore,
};
use crate::selection::{diff, fill_missing, renumber_all, renumber_base, tag_for_review,
    SelectionContext};

/// Politeness wait after an item whose fetch contacted remote services.
/// Doubles as the cancellation poll interval.
const THROTTLE_TIME: Duration = Duration::from_millis(150);

/// Advisory precondition checked before a run starts. The host guarantees
/// mutual exclusion; the processor itself never serializes runs.
pub trait BusyFlag: Send + Sync {
    fn is_busy(&self) -> bool;
}

/// Default busy flag for hosts without one.
#[derive(Debug, Default)]
pub struct NeverBusy;

impl BusyFlag for NeverBusy {
    fn is_busy(&self) -> bool {
        false
    }
}

/// Pre-fetch cleanup hook: a host can propose art removals (dead cached
/// urls and the like) applied before candidates are gathered.
pub trait ArtCleaner: Send + Sync {
    fn clean(&self, _item: &MediaItem) -> ArtMap {
        ArtMap::new()
    }
}

/// Default cleaner that proposes nothing.
#[derive(Debug, Default)]
pub struct NoopCleaner;

impl ArtCleaner for NoopCleaner {}

/// Aggregate outcome of one run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    /// Items the run looked at.
    pub processed: usize,
    /// Items that received at least one art change.
    pub updated_items: usize,
    /// Total art keys written across all items.
    pub updated_art: usize,
    /// False when the run was cancelled before finishing.
    pub completed: bool,
}

/// The artwork processor. Construct with the required collaborators, then
/// override the optional ones as the host needs.
pub struct ArtworkProcessor {
    library: Arc<dyn MediaLibrary>,
    gatherer: Arc<dyn Gatherer>,
    providers: Vec<Arc<dyn ArtworkProvider>>,
    store: ScheduleStore,
    config: Config,
    notifier: Arc<dyn Notifier>,
    progress: Arc<dyn ProgressReporter>,
    picker: Option<Arc<dyn ArtworkPicker>>,
    busy: Arc<dyn BusyFlag>,
    cleaner: Arc<dyn ArtCleaner>,
    language: String,
    rng: StdRng,
    cancel: watch::Receiver<bool>,
}

impl ArtworkProcessor {
    pub fn new(
        library: Arc<dyn MediaLibrary>,
        gatherer: Arc<dyn Gatherer>,
        store: ScheduleStore,
        config: Config,
    ) -> Self {
        let (_tx, cancel) = watch::channel(false);
        Self {
            library,
            gatherer,
            providers: Vec::new(),
            store,
            config,
            notifier: Arc::new(LogNotifier),
            progress: Arc::new(LogProgress),
            picker: None,
            busy: Arc::new(NeverBusy),
            cleaner: Arc::new(NoopCleaner),
            language: "en".to_string(),
            rng: StdRng::from_entropy(),
            cancel,
        }
    }

    /// Providers used for movie-set identification lookups.
    pub fn with_providers(mut self, providers: Vec<Arc<dyn ArtworkProvider>>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_picker(mut self, picker: Arc<dyn ArtworkPicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn with_busy_flag(mut self, busy: Arc<dyn BusyFlag>) -> Self {
        self.busy = busy;
        self
    }

    pub fn with_cleaner(mut self, cleaner: Arc<dyn ArtCleaner>) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Seed the jitter source; tests use this for deterministic delays.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Cooperative cancellation; polled at item boundaries only.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = cancel;
        self
    }

    fn cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Process a batch of items in automatic mode.
    ///
    /// Cancellation stops at the next item boundary; everything written
    /// for prior items stays committed and the summary reports the run as
    /// not completed.
    pub async fn run_batch(&mut self, items: Vec<MediaItem>) -> Result<RunSummary> {
        if self.busy.is_busy() {
            anyhow::bail!("another artwork run is active");
        }

        let ctx = SelectionContext::new(&self.language, &self.config);
        let cutoff = freshness_cutoff(Utc::now());
        let single = items.len() == 1;

        let mut summary = RunSummary {
            completed: true,
            ..RunSummary::default()
        };
        self.progress.create(items.len());

        for (index, mut item) in items.into_iter().enumerate() {
            if self.cancelled() {
                summary.completed = false;
                break;
            }
            self.progress.update(index, &item.label);

            let (updated, services_hit) =
                self.process_item_auto(&mut item, &ctx, cutoff, single).await?;
            summary.processed += 1;
            summary.updated_art += updated;
            if updated > 0 {
                summary.updated_items += 1;
            }

            if services_hit {
                // Politeness wait toward the remote services, reused as
                // the cancellation poll for this boundary.
                tokio::time::sleep(THROTTLE_TIME).await;
            }
            if self.cancelled() {
                summary.completed = false;
                break;
            }

            if self.wants_episode_art(&item) {
                let done = self
                    .process_episodes(&item, &ctx, cutoff, &mut summary)
                    .await?;
                if !done {
                    summary.completed = false;
                    break;
                }
            }
        }

        self.progress.close();
        self.notifier.summary(summary.updated_items);
        info!(
            processed = summary.processed,
            updated_items = summary.updated_items,
            completed = summary.completed,
            "artwork run finished"
        );
        Ok(summary)
    }

    /// Process one item by library reference. Interactive mode requires a
    /// picker and defers selection to the user.
    pub async fn run_single(
        &mut self,
        media_type: MediaType,
        id: i64,
        interactive: bool,
    ) -> Result<RunSummary> {
        let item = self
            .library
            .get_item(media_type, id)
            .await?
            .with_context(|| format!("no {media_type} with id {id} in the library"))?;

        if interactive {
            self.run_interactive(item).await
        } else {
            self.run_batch(vec![item]).await
        }
    }

    /// One automatic item: identify, clean, fetch, reconcile, write,
    /// reschedule. Returns (art keys written, services hit).
    async fn process_item_auto(
        &mut self,
        item: &mut MediaItem,
        ctx: &SelectionContext,
        cutoff: NaiveDate,
        single: bool,
    ) -> Result<(usize, bool)> {
        let outcome = identify::identify_item(
            item,
            self.library.as_ref(),
            &self.store,
            &self.providers,
            &self.config,
        )
        .await?;

        if !outcome.identified {
            if single {
                self.notifier
                    .no_id(&item.label, item.media_type() == MediaType::MovieSet);
            }
            debug!(item = item.id, "unidentifiable, scheduling retry");
            let retry = identification_retry_delay(&mut self.rng);
            self.store
                .set_next_check(item.media_type(), item.id, Utc::now() + retry)?;
            return Ok((0, false));
        }

        // Pre-fetch cleanup: first-seen movie-set stripping plus whatever
        // the host's cleaner proposes. Applied immediately so the
        // reconcile below starts from a clean slate.
        let mut cleanup = outcome.cleanup;
        cleanup.extend(self.cleaner.clean(item));
        let cleanup = diff(&item.art, &cleanup);
        let mut written = 0;
        if !cleanup.is_empty() {
            self.write_back(item, &cleanup).await?;
            written += cleanup.len();
            apply_changes(&mut item.art, &cleanup);
        }

        let gathered = self
            .gatherer
            .gather(item, ctx)
            .await;
        if let Some(error) = &gathered.error {
            self.notifier.provider_error(&error.provider, &error.message);
        }

        let (changes, nothing_missing) = build_auto_proposal(item, &gathered, ctx);
        if !changes.is_empty() {
            self.write_back(item, &changes).await?;
            written += changes.len();
            apply_changes(&mut item.art, &changes);
        }

        // A failed fetch leaves the item due so the next run retries it
        // instead of pushing it out by the full delay.
        if gathered.error.is_none() {
            self.reschedule(item, nothing_missing, cutoff)?;
        }
        Ok((written, gathered.services_hit))
    }

    /// Whether a processed show's episodes get their own artwork pass.
    fn wants_episode_art(&self, item: &MediaItem) -> bool {
        if item.media_type() != MediaType::TvShow {
            return false;
        }
        let listed = &self.config.episodes.auto_fanart_shows;
        item.unique_id
            .as_deref()
            .is_some_and(|id| listed.iter().any(|s| s == id))
            || item
                .unique_ids
                .values()
                .any(|id| listed.iter().any(|s| s == id))
    }

    /// Run the episodes of a listed show through the automatic flow.
    /// Returns false when cancellation stopped the pass.
    async fn process_episodes(
        &mut self,
        show: &MediaItem,
        ctx: &SelectionContext,
        cutoff: NaiveDate,
        summary: &mut RunSummary,
    ) -> Result<bool> {
        let episodes = self.library.get_episodes(show.id).await?;
        for mut episode in episodes {
            if self.cancelled() {
                return Ok(false);
            }
            let (updated, services_hit) = self
                .process_item_auto(&mut episode, ctx, cutoff, false)
                .await?;
            summary.processed += 1;
            summary.updated_art += updated;
            if updated > 0 {
                summary.updated_items += 1;
            }
            if services_hit {
                tokio::time::sleep(THROTTLE_TIME).await;
            }
        }
        Ok(true)
    }

    fn reschedule(
        &mut self,
        item: &MediaItem,
        nothing_missing: bool,
        cutoff: NaiveDate,
    ) -> Result<()> {
        // Episodes only skipping fanart would re-check forever without
        // ever finding anything new; leave their record untouched.
        if item.media_type() == MediaType::Episode && item.skip.iter().any(|s| s == "fanart") {
            return Ok(());
        }

        let delay = compute_delay(
            &mut self.rng,
            item,
            self.config.artwork.only_filesystem,
            nothing_missing,
            cutoff,
        );
        self.store
            .set_next_check(item.media_type(), item.id, Utc::now() + delay)?;

        // Shows keep their resolved identity cached so later season-only
        // passes skip the lookup.
        if item.media_type() == MediaType::TvShow {
            self.store.cache_unique_id(
                MediaType::TvShow,
                item.id,
                item.unique_id.as_deref(),
            )?;
        }
        Ok(())
    }

    /// Apply a non-empty diff, routing season-scoped keys of a show to
    /// the season-level writes.
    async fn write_back(&self, item: &MediaItem, changes: &ArtMap) -> Result<()> {
        if let MediaKind::TvShow { seasons, .. } = &item.kind {
            let mut show_changes = ArtMap::new();
            let mut season_changes: HashMap<u32, ArtMap> = HashMap::new();
            for (key, url) in changes {
                match split_season_key(key) {
                    Some((number, art_type)) => {
                        season_changes
                            .entry(number)
                            .or_default()
                            .insert(art_type.to_string(), url.clone());
                    }
                    None => {
                        show_changes.insert(key.clone(), url.clone());
                    }
                }
            }

            for (number, art) in season_changes {
                let Some(season_id) = seasons.get(&number) else {
                    warn!(show = item.id, season = number, "no season id for write");
                    continue;
                };
                self.library
                    .update_art(MediaType::Season, *season_id, &art)
                    .await?;
            }
            if !show_changes.is_empty() {
                self.library
                    .update_art(MediaType::TvShow, item.id, &show_changes)
                    .await?;
            }
            return Ok(());
        }

        self.library
            .update_art(item.media_type(), item.id, changes)
            .await
    }

    /// One interactive item: the user picks, the processor reconciles.
    async fn run_interactive(&mut self, mut item: MediaItem) -> Result<RunSummary> {
        if self.busy.is_busy() {
            anyhow::bail!("another artwork run is active");
        }
        let picker = self
            .picker
            .clone()
            .context("interactive mode needs a picker")?;

        let ctx = SelectionContext::new(&self.language, &self.config);
        let mut summary = RunSummary {
            processed: 1,
            completed: true,
            ..RunSummary::default()
        };

        let outcome = identify::identify_item(
            &mut item,
            self.library.as_ref(),
            &self.store,
            &self.providers,
            &self.config,
        )
        .await?;
        let mut identified = outcome.identified;
        if !identified && item.media_type() == MediaType::MovieSet {
            identified = identify::identify_movieset_interactive(
                &mut item,
                picker.as_ref(),
                &self.providers,
                &self.store,
            )
            .await?;
        }
        if !identified {
            self.notifier
                .no_id(&item.label, item.media_type() == MediaType::MovieSet);
            self.notifier.summary(0);
            return Ok(summary);
        }

        let cleanup = diff(&item.art, &outcome.cleanup);
        if !cleanup.is_empty() {
            self.write_back(&item, &cleanup).await?;
            summary.updated_art += cleanup.len();
            apply_changes(&mut item.art, &cleanup);
        }

        let mut pool = self.gather_for_review(&item, &ctx).await;

        loop {
            match picker.pick(&item, &pool).await? {
                PickOutcome::Cancelled => break,
                PickOutcome::Identify => {
                    if item.media_type() == MediaType::MovieSet
                        && identify::identify_movieset_interactive(
                            &mut item,
                            picker.as_ref(),
                            &self.providers,
                            &self.store,
                        )
                        .await?
                    {
                        pool = self.gather_for_review(&item, &ctx).await;
                        continue;
                    }
                    break;
                }
                PickOutcome::Picked {
                    art_type,
                    selection,
                } => {
                    let changes = apply_pick(&item, &art_type, selection);
                    let changes = diff(&item.art, &changes);
                    if !changes.is_empty() {
                        self.write_back(&item, &changes).await?;
                        summary.updated_art += changes.len();
                        apply_changes(&mut item.art, &changes);
                        // Re-tag so the next round of picking sees the
                        // new assignment as existing.
                        tag_for_review(&mut pool, &HashMap::new(), &item.art);
                    }
                }
            }
        }

        if summary.updated_art > 0 {
            summary.updated_items = 1;
        }
        self.notifier.summary(summary.updated_items);
        Ok(summary)
    }

    /// Gather and prepare the candidate pool for human review.
    async fn gather_for_review(
        &self,
        item: &MediaItem,
        ctx: &SelectionContext,
    ) -> HashMap<String, Vec<CandidateImage>> {
        let gathered = self.gatherer.gather(item, ctx).await;
        if let Some(error) = &gathered.error {
            self.notifier.provider_error(&error.provider, &error.message);
        }

        let GatheredArt {
            forced,
            mut available,
            ..
        } = gathered;

        // Season fanart pools also offer the show-level backdrops that are
        // not tied to a specific season.
        if let MediaKind::TvShow { seasons, .. } = &item.kind {
            let seasonless: Vec<CandidateImage> = available
                .get("fanart")
                .map(|pool| pool.iter().filter(|c| !c.has_season).cloned().collect())
                .unwrap_or_default();
            if !seasonless.is_empty() {
                for season in seasons.keys() {
                    let key = crate::art::season_key(*season, "fanart");
                    available.entry(key).or_default().extend(seasonless.clone());
                }
            }
        }

        tag_for_review(&mut available, &forced, &item.art);
        available
    }
}

/// Fold a written diff back into an in-memory art map.
fn apply_changes(art: &mut ArtMap, changes: &ArtMap) {
    for (key, url) in changes {
        if url.is_empty() {
            art.remove(key);
        } else {
            art.insert(key.clone(), url.clone());
        }
    }
}

/// Locally stored art that the host can no longer resolve: not a remote
/// url, not the host's own video-embedded scheme, not protected, and not
/// re-discovered among the forced candidates.
fn is_stale_local(
    exact: &str,
    url: &str,
    forced: &HashMap<String, Vec<CandidateImage>>,
) -> bool {
    if url.is_empty() || url.starts_with("http") || url.starts_with("image://video@") {
        return false;
    }
    if PROTECTED_TYPES.contains(&base_type(exact)) {
        return false;
    }
    !forced.contains_key(exact)
}

/// Build the automatic proposal for one item: null stale local art,
/// overlay forced urls, renumber, fill remaining missing slots, and diff
/// against the current assignment. Also reports whether the item had
/// nothing missing to begin with (drives the long re-check delay).
fn build_auto_proposal(
    item: &MediaItem,
    gathered: &GatheredArt,
    ctx: &SelectionContext,
) -> (ArtMap, bool) {
    let mut proposed = item.art.clone();

    for (exact, url) in &item.art {
        if is_stale_local(exact, url, &gathered.forced) {
            proposed.insert(exact.clone(), String::new());
        }
    }

    for (exact, images) in &gathered.forced {
        if let Some(first) = images.first() {
            proposed.insert(exact.clone(), first.url.clone());
        }
    }

    let mut proposed = renumber_all(&proposed);

    let occupied: Vec<String> = proposed
        .iter()
        .filter(|(_, url)| !url.is_empty())
        .map(|(k, _)| k.clone())
        .collect();
    let missing = missing_art_types(item, &occupied);
    let nothing_missing = missing.is_empty();

    let filled = fill_missing(
        &missing,
        item.media_type(),
        &proposed,
        &gathered.available,
        ctx,
    );
    proposed.extend(filled);

    (diff(&item.art, &proposed), nothing_missing)
}

/// Turn a pick into a proposed art map. Multiselect picks union the
/// surviving existing urls with the additions and renumber the slots.
fn apply_pick(item: &MediaItem, art_type: &str, selection: PickedSelection) -> ArtMap {
    match selection {
        PickedSelection::Single(url) => {
            let mut changes = ArtMap::new();
            changes.insert(art_type.to_string(), url);
            changes
        }
        PickedSelection::Multi { add, remove } => {
            let mut keys: Vec<&String> = item
                .art
                .iter()
                .filter(|(k, url)| base_type(k) == art_type && !url.is_empty())
                .map(|(k, _)| k)
                .collect();
            keys.sort_by(|a, b| natural_cmp(a, b));

            let mut urls: Vec<String> = keys
                .iter()
                .map(|k| item.art[*k].clone())
                .filter(|url| !remove.contains(url))
                .collect();
            for url in add {
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }

            let existing_keys: Vec<String> = keys.iter().map(|k| (*k).clone()).collect();
            renumber_base(&urls, art_type, &existing_keys)
        }
    }
}
