//! Art type vocabulary: base vs. exact slot names, season-scoped keys,
//! natural ordering, and disc-source detection.

pub mod candidate;
pub mod policy;

pub use candidate::{CandidateImage, ImageSize, Rating};
pub use policy::ArtSlotRule;

use std::cmp::Ordering;

/// Art types that providers cannot replace and local-cleanup must not null
/// out.
pub const PROTECTED_TYPES: &[&str] = &["animatedposter", "animatedfanart"];

/// Strip a trailing slot number from an exact art type: `fanart2` ->
/// `fanart`, `poster` -> `poster`. Season-scoped keys keep their prefix:
/// `season.3.fanart1` -> `season.3.fanart`.
pub fn base_type(exact_type: &str) -> &str {
    let end = exact_type
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    &exact_type[..end]
}

/// Slot index of an exact art type: `fanart` -> 0, `fanart3` -> 3.
pub fn slot_index(exact_type: &str) -> usize {
    let base = base_type(exact_type);
    exact_type[base.len()..].parse().unwrap_or(0)
}

/// The exact slot name for a base type and index: slot 0 has no suffix.
pub fn exact_type(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{base}{index}")
    }
}

/// Whether an exact art type belongs to the given base type.
pub fn matches_base(exact: &str, base: &str) -> bool {
    base_type(exact) == base
}

/// Split a season-scoped key `season.<n>.<arttype>` into its parts.
pub fn split_season_key(art_type: &str) -> Option<(u32, &str)> {
    let rest = art_type.strip_prefix("season.")?;
    let (num, art) = rest.split_once('.')?;
    Some((num.parse().ok()?, art))
}

/// Build a season-scoped key.
pub fn season_key(season: u32, art_type: &str) -> String {
    format!("season.{season}.{art_type}")
}

/// Natural (numeric-aware) string comparison: `fanart2` sorts before
/// `fanart10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ac = a.chars().peekable();
    let mut bc = b.chars().peekable();
    loop {
        match (ac.peek().copied(), bc.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let mut xn = 0u64;
                    while let Some(d) = ac.peek().and_then(|c| c.to_digit(10)) {
                        xn = xn * 10 + u64::from(d);
                        ac.next();
                    }
                    let mut yn = 0u64;
                    while let Some(d) = bc.peek().and_then(|c| c.to_digit(10)) {
                        yn = yn * 10 + u64::from(d);
                        bc.next();
                    }
                    match xn.cmp(&yn) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    match x.cmp(&y) {
                        Ordering::Equal => {
                            ac.next();
                            bc.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

/// Detect the disc subtype of a media file from its path, used to match
/// `discart` candidates to the source the user actually has.
pub fn media_source(path: Option<&str>) -> Option<&'static str> {
    let lower = path?.to_lowercase();
    if lower.contains("bluray") || lower.contains("blu-ray") || lower.contains("bdrip") {
        Some("bluray")
    } else if lower.contains("dvd") {
        Some("dvd")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_type_strips_slot_number() {
        assert_eq!(base_type("fanart"), "fanart");
        assert_eq!(base_type("fanart2"), "fanart");
        assert_eq!(base_type("fanart12"), "fanart");
        assert_eq!(base_type("season.3.fanart1"), "season.3.fanart");
    }

    #[test]
    fn exact_type_and_slot_index_invert() {
        assert_eq!(exact_type("fanart", 0), "fanart");
        assert_eq!(exact_type("fanart", 3), "fanart3");
        assert_eq!(slot_index("fanart"), 0);
        assert_eq!(slot_index("fanart3"), 3);
    }

    #[test]
    fn season_key_round_trip() {
        let key = season_key(2, "poster");
        assert_eq!(key, "season.2.poster");
        assert_eq!(split_season_key(&key), Some((2, "poster")));
        assert_eq!(split_season_key("poster"), None);
    }

    #[test]
    fn natural_ordering() {
        let mut keys = vec!["fanart10", "fanart2", "fanart", "banner"];
        keys.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(keys, vec!["banner", "fanart", "fanart2", "fanart10"]);
    }

    #[test]
    fn media_source_from_path() {
        assert_eq!(media_source(Some("/video/Film.BluRay.x264.mkv")), Some("bluray"));
        assert_eq!(media_source(Some("/video/film.dvdrip.avi")), Some("dvd"));
        assert_eq!(media_source(Some("/video/film.web.mkv")), None);
        assert_eq!(media_source(None), None);
    }
}
