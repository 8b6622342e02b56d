//! Per-art-type slot policy: which base types each media type supports,
//! which of them admit multiple numbered slots, and how many slots the
//! auto-fill pass may populate.

use crate::media::{MediaItem, MediaKind, MediaType};

use super::{matches_base, split_season_key};

/// Slot policy for one base art type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtSlotRule {
    /// Whether the type admits several simultaneous images via numbered
    /// slots (`fanart`, `fanart1`, ...).
    pub multiselect: bool,
    /// Maximum number of slots auto-fill may populate.
    pub autolimit: usize,
}

const SINGLE: ArtSlotRule = ArtSlotRule {
    multiselect: false,
    autolimit: 1,
};
const MULTI_FANART: ArtSlotRule = ArtSlotRule {
    multiselect: true,
    autolimit: 5,
};

const MOVIE_TYPES: &[(&str, ArtSlotRule)] = &[
    ("poster", SINGLE),
    ("fanart", MULTI_FANART),
    ("banner", SINGLE),
    ("clearlogo", SINGLE),
    ("clearart", SINGLE),
    ("landscape", SINGLE),
    ("discart", SINGLE),
];

const TVSHOW_TYPES: &[(&str, ArtSlotRule)] = &[
    ("poster", SINGLE),
    ("fanart", MULTI_FANART),
    ("banner", SINGLE),
    ("clearlogo", SINGLE),
    ("clearart", SINGLE),
    ("landscape", SINGLE),
    ("characterart", SINGLE),
];

const SEASON_TYPES: &[(&str, ArtSlotRule)] = &[
    ("poster", SINGLE),
    ("fanart", MULTI_FANART),
    ("banner", SINGLE),
    ("landscape", SINGLE),
];

const EPISODE_TYPES: &[(&str, ArtSlotRule)] = &[("fanart", SINGLE)];

/// Base art types supported for a media type, in presentation order.
pub fn supported_types(media_type: MediaType) -> &'static [(&'static str, ArtSlotRule)] {
    match media_type {
        MediaType::Movie | MediaType::MovieSet => MOVIE_TYPES,
        MediaType::TvShow => TVSHOW_TYPES,
        MediaType::Season => SEASON_TYPES,
        MediaType::Episode => EPISODE_TYPES,
    }
}

/// Resolve the slot rule for a base art type of a media type.
///
/// Season-scoped keys on a TV show (`season.2.fanart`) resolve against the
/// season policy. Unknown types fall back to single-select so a provider
/// inventing a type cannot trigger runaway slot fills.
pub fn art_rule(media_type: MediaType, base: &str) -> ArtSlotRule {
    let (policy_type, key) = match split_season_key(base) {
        Some((_, season_art)) if media_type == MediaType::TvShow => (MediaType::Season, season_art),
        _ => (media_type, base),
    };
    supported_types(policy_type)
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rule)| *rule)
        .unwrap_or(SINGLE)
}

/// Iterate the base art types an item is still missing, honoring its skip
/// list. A multiselect type is missing while fewer than `autolimit` of its
/// exact slots are occupied; a single-select type is missing when its base
/// slot is unoccupied. TV shows additionally report season-scoped types
/// for every known season.
pub fn missing_art_types(item: &MediaItem, existing_keys: &[String]) -> Vec<String> {
    let mut missing = Vec::new();
    collect_missing(
        supported_types(item.media_type()),
        &item.skip,
        existing_keys,
        "",
        &mut missing,
    );

    if let MediaKind::TvShow { seasons, .. } = &item.kind {
        for season in seasons.keys() {
            let prefix = format!("season.{season}.");
            collect_missing(
                supported_types(MediaType::Season),
                &item.skip,
                existing_keys,
                &prefix,
                &mut missing,
            );
        }
    }
    missing
}

fn collect_missing(
    types: &[(&str, ArtSlotRule)],
    skip: &[String],
    existing_keys: &[String],
    prefix: &str,
    out: &mut Vec<String>,
) {
    for (name, rule) in types {
        if skip.iter().any(|s| s == name) {
            continue;
        }
        let full = format!("{prefix}{name}");
        let occupied = existing_keys
            .iter()
            .filter(|k| matches_base(k, &full))
            .count();
        let wanted = if rule.multiselect { rule.autolimit } else { 1 };
        if occupied < wanted {
            out.push(full);
        }
    }
}
