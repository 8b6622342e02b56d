//! Per-item identification: resolving the external id a provider lookup
//! needs, plus the type-specific completion that has to happen before
//! fetching (season maps for shows, collection matching and first-seen
//! cleanup for movie sets).

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::art::season_key;
use crate::config::Config;
use crate::library::MediaLibrary;
use crate::media::{ArtMap, MediaItem, MediaKind, MediaType};
use crate::picker::ArtworkPicker;
use crate::providers::ArtworkProvider;
use crate::schedule::ScheduleStore;

/// Result of identifying one item.
#[derive(Debug, Default)]
pub struct IdentifyOutcome {
    /// An external id usable for provider lookups was resolved.
    pub identified: bool,
    /// Art removals to apply before fetching (first-seen movie sets shed
    /// the poster/fanart the host auto-copied from their movies).
    pub cleanup: ArtMap,
}

/// Id authorities tried in order, per media type.
fn id_preference(media_type: MediaType) -> &'static [&'static str] {
    match media_type {
        MediaType::Movie => &["imdb", "tmdb", "unknown"],
        MediaType::TvShow | MediaType::Season => &["tmdb", "imdb", "unknown"],
        MediaType::Episode => &["unknown"],
        MediaType::MovieSet => &[],
    }
}

/// Pick the item's external id from its raw id map: the preferred
/// authorities in order, else any id at all (with a warning, since an
/// arbitrary authority may not be understood by every provider).
fn resolve_unique_id(item: &MediaItem) -> Option<String> {
    let prefs = id_preference(item.media_type());
    for authority in prefs {
        if let Some(id) = item.unique_ids.get(*authority).filter(|v| !v.is_empty()) {
            return Some(id.clone());
        }
    }
    let fallback = item
        .unique_ids
        .iter()
        .find(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()));
    if let Some((authority, id)) = fallback {
        warn!(
            item = item.id,
            authority, "falling back to non-preferred id authority"
        );
        return Some(id);
    }
    None
}

/// Resolve the item's external id and complete type-specific state.
pub async fn identify_item(
    item: &mut MediaItem,
    library: &dyn MediaLibrary,
    store: &ScheduleStore,
    providers: &[Arc<dyn ArtworkProvider>],
    config: &Config,
) -> Result<IdentifyOutcome> {
    let mut outcome = IdentifyOutcome::default();

    match item.media_type() {
        MediaType::MovieSet => {
            identify_movieset(item, library, store, providers, config, &mut outcome).await?;
        }
        MediaType::TvShow => {
            item.unique_id = resolve_unique_id(item);
            complete_show(item, library).await?;
            outcome.identified = item.unique_id.is_some();
        }
        _ => {
            item.unique_id = resolve_unique_id(item);
            outcome.identified = item.unique_id.is_some();
        }
    }
    Ok(outcome)
}

/// Merge the library's season list into a show item: season numbers and
/// ids for policy/write-back, and season-level art as `season.N.<type>`
/// keys so the whole show reconciles in one pass.
async fn complete_show(item: &mut MediaItem, library: &dyn MediaLibrary) -> Result<()> {
    let details = library.get_seasons(item.id).await?;
    if let MediaKind::TvShow { seasons, .. } = &mut item.kind {
        for season in &details {
            seasons.insert(season.number, season.season_id);
            for (art_type, url) in &season.art {
                item.art
                    .insert(season_key(season.number, art_type), url.clone());
            }
        }
    }
    Ok(())
}

async fn identify_movieset(
    item: &mut MediaItem,
    library: &dyn MediaLibrary,
    store: &ScheduleStore,
    providers: &[Arc<dyn ArtworkProvider>],
    config: &Config,
    outcome: &mut IdentifyOutcome,
) -> Result<()> {
    let first_seen = !store.seen_before(MediaType::MovieSet, item.id)?;

    if item.unique_id.is_none() {
        item.unique_id = store.cached_unique_id(MediaType::MovieSet, item.id)?;
    }
    if item.unique_id.is_none() {
        if let Some(id) = search_set_exact(providers, &item.label).await {
            store.cache_unique_id(MediaType::MovieSet, item.id, Some(&id))?;
            item.unique_id = Some(id);
        }
    }
    outcome.identified = item.unique_id.is_some();

    if let MediaKind::MovieSet { movies } = &mut item.kind {
        if movies.is_empty() {
            *movies = library.get_set_movies(item.id).await?;
        }
    }

    // Hosts copy a constituent movie's poster/fanart onto a new set; shed
    // those on first contact so real set artwork can take their place.
    if first_seen {
        let assigned = item.existing_art_keys();
        if !assigned.is_empty()
            && assigned
                .iter()
                .all(|k| k == "poster" || k == "fanart" || k == "thumb")
        {
            for key in assigned {
                outcome.cleanup.insert(key, String::new());
            }
        }
    }

    item.file = set_folder(item, config);
    Ok(())
}

/// Auto-identification only trusts an exact name match; anything fuzzier
/// needs a human (the interactive sub-flow).
async fn search_set_exact(providers: &[Arc<dyn ArtworkProvider>], label: &str) -> Option<String> {
    for provider in providers {
        if !provider.is_available() || !provider.supports(MediaType::MovieSet) {
            continue;
        }
        match provider.search_set(label).await {
            Ok(results) => {
                if let Some(hit) = results
                    .iter()
                    .find(|r| r.name.eq_ignore_ascii_case(label))
                {
                    debug!(set = label, id = %hit.id, "matched collection by name");
                    return Some(hit.id.clone());
                }
            }
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "collection search failed");
            }
        }
    }
    None
}

/// Derive the folder local set artwork lives in: the constituent movies'
/// shared parent when a path segment matches the set name, else the
/// configured central directory.
fn set_folder(item: &MediaItem, config: &Config) -> Option<String> {
    let MediaKind::MovieSet { movies } = &item.kind else {
        return None;
    };

    if config.movie_sets.artwork_from_parent {
        for movie in movies {
            let mut path = Path::new(&movie.file).parent();
            while let Some(dir) = path {
                let matches = dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(&item.label));
                if matches {
                    return Some(dir.to_string_lossy().into_owned());
                }
                path = dir.parent();
            }
        }
    }

    config
        .movie_sets
        .central_directory
        .as_ref()
        .map(|dir| dir.join(&item.label).to_string_lossy().into_owned())
}

/// Interactive movie-set identification: prompt for a name, search the
/// collection-capable providers, let the user pick, persist the choice.
/// Returns whether an id was resolved.
pub async fn identify_movieset_interactive(
    item: &mut MediaItem,
    picker: &dyn ArtworkPicker,
    providers: &[Arc<dyn ArtworkProvider>],
    store: &ScheduleStore,
) -> Result<bool> {
    let Some(name) = picker.prompt_set_name(&item.label).await? else {
        return Ok(false);
    };

    let mut results = Vec::new();
    for provider in providers {
        if !provider.is_available() || !provider.supports(MediaType::MovieSet) {
            continue;
        }
        match provider.search_set(&name).await {
            Ok(mut found) => results.append(&mut found),
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "collection search failed");
            }
        }
    }
    if results.is_empty() {
        return Ok(false);
    }

    let Some(chosen) = picker.select_set(&results).await? else {
        return Ok(false);
    };
    store.cache_unique_id(MediaType::MovieSet, item.id, Some(&chosen.id))?;
    item.unique_id = Some(chosen.id);
    Ok(true)
}
