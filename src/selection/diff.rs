//! Diff-based reconciliation and multi-slot renumbering.

use std::collections::HashMap;

use crate::art::{base_type, exact_type, natural_cmp};
use crate::media::ArtMap;

/// Reduce a proposal to actual changes: every key of `proposed` whose
/// value differs from the current assignment. An empty proposed value for
/// a key present in `current` is a removal and is included. Keys absent
/// from `proposed` are never touched.
pub fn diff(current: &ArtMap, proposed: &ArtMap) -> ArtMap {
    proposed
        .iter()
        .filter(|(key, url)| current.get(*key).map(String::as_str).unwrap_or("") != url.as_str())
        .map(|(key, url)| (key.clone(), url.clone()))
        .collect()
}

/// Renumber one base type's slots: surviving URLs (in slot order) are
/// reassigned to the contiguous run `base, base1, ...`; previously
/// occupied exact types past the new count are cleared with an empty
/// value.
pub fn renumber_base(urls: &[String], base: &str, existing_keys: &[String]) -> ArtMap {
    let mut result = ArtMap::new();
    for (i, url) in urls.iter().enumerate() {
        result.insert(exact_type(base, i), url.clone());
    }
    for i in urls.len()..existing_keys.len() {
        let name = exact_type(base, i);
        if existing_keys.contains(&name) {
            result.insert(name, String::new());
        }
    }
    result
}

/// Renumber every base type present in a selection, dropping empty
/// entries and closing slot gaps while preserving the relative order the
/// URLs were assigned in. Empty values still clear the vacated trailing
/// slots.
pub fn renumber_all(selections: &ArtMap) -> ArtMap {
    let mut by_base: HashMap<&str, Vec<(&String, &String)>> = HashMap::new();
    for (key, url) in selections {
        by_base.entry(base_type(key)).or_default().push((key, url));
    }

    let mut result = ArtMap::new();
    for (base, mut entries) in by_base {
        entries.sort_by(|a, b| natural_cmp(a.0, b.0));
        let urls: Vec<String> = entries
            .iter()
            .filter(|(_, url)| !url.is_empty())
            .map(|(_, url)| (*url).clone())
            .collect();
        let names: Vec<String> = entries.iter().map(|(name, _)| (*name).clone()).collect();
        result.extend(renumber_base(&urls, base, &names));
    }
    result
}
