//! Merge step for interactive review: forced (local) candidates and the
//! currently assigned art are folded into the gathered candidate pool so
//! a human reviewer always sees them.

use std::collections::HashMap;

use crate::art::{base_type, natural_cmp, CandidateImage};
use crate::media::ArtMap;

/// Provider name used for placeholder entries synthesized from art that
/// is assigned in the library but unknown to every provider.
pub const CURRENT_PROVIDER: &str = "current";

/// Merge forced-art candidates and existing assignments into
/// `available`.
///
/// Forced candidates (iterated in natural order of their exact-type
/// keys) that match an available URL annotate the match -- title
/// backfilled when missing, second-provider recorded -- instead of being
/// duplicated; unmatched ones are inserted at a per-base-type running
/// insertion index. Existing assigned URLs likewise annotate their match
/// as preview+existing, or synthesize a placeholder candidate so the
/// current selection is always visible.
pub fn tag_for_review(
    available: &mut HashMap<String, Vec<CandidateImage>>,
    forced: &HashMap<String, Vec<CandidateImage>>,
    existing: &ArtMap,
) {
    let mut forced_keys: Vec<&String> = forced.keys().collect();
    forced_keys.sort_by(|a, b| natural_cmp(a, b));

    let mut insert_at: HashMap<String, usize> = HashMap::new();
    for exact in forced_keys {
        let base = base_type(exact).to_string();
        let images = &forced[exact];

        match available.get_mut(&base) {
            None => {
                available.insert(base, images.clone());
            }
            Some(pool) => {
                for image in images {
                    if let Some(found) = pool.iter_mut().find(|a| a.url == image.url) {
                        if found.title.is_none() {
                            found.title = image.title.clone();
                        }
                        found.second_provider = Some(image.provider.clone());
                    } else {
                        let index = next_insert_index(&mut insert_at, &base);
                        pool.insert(index, image.clone());
                    }
                }
            }
        }
    }

    let mut existing_keys: Vec<&String> = existing.keys().collect();
    existing_keys.sort_by(|a, b| natural_cmp(a, b));

    let mut insert_at: HashMap<String, usize> = HashMap::new();
    for exact in existing_keys {
        let url = &existing[exact];
        if url.is_empty() {
            continue;
        }
        let base = base_type(exact).to_string();
        let Some(pool) = available.get_mut(&base) else {
            continue;
        };

        if let Some(found) = pool.iter_mut().find(|a| a.url == *url) {
            found.preview = Some(url.clone());
            found.existing = true;
        } else {
            let mut placeholder = CandidateImage::new(url.clone(), CURRENT_PROVIDER);
            placeholder.preview = Some(url.clone());
            placeholder.title = Some(exact.clone());
            placeholder.existing = true;
            let index = next_insert_index(&mut insert_at, &base);
            pool.insert(index, placeholder);
        }
    }
}

/// Running insertion index per base type: first insert lands at the head
/// of the list, later inserts directly after the previous one.
fn next_insert_index(insert_at: &mut HashMap<String, usize>, base: &str) -> usize {
    let index = insert_at
        .get(base)
        .map(|i| i + 1)
        .unwrap_or(0);
    insert_at.insert(base.to_string(), index);
    index
}
