//! Auto-selection policy and missing-slot filling.

use std::collections::HashMap;

use crate::art::{exact_type, matches_base, policy, CandidateImage};
use crate::media::{ArtMap, MediaType};

use super::SelectionContext;

/// Whether a candidate qualifies for unattended selection of `art_type`.
///
/// Rejects candidates rated below the configured minimum, fanart-family
/// candidates below the minimum width, URLs already assigned locally,
/// and any language outside the fallback list (`None` qualifies via the
/// list's `None` entry).
pub fn accepts(
    art_type: &str,
    image: &CandidateImage,
    ctx: &SelectionContext,
    ignored_urls: &[String],
) -> bool {
    if image.rating.value < ctx.minimum_rating {
        return false;
    }
    if art_type.ends_with("fanart") && image.size.width < ctx.minimum_size {
        return false;
    }
    ctx.languages
        .iter()
        .any(|l| l.as_deref() == image.language.as_deref())
        && !ignored_urls.iter().any(|u| u == &image.url)
}

/// Propose candidates for the missing base types of an item.
///
/// Multiselect types walk slot indices `0..autolimit`, skipping slots an
/// existing exact type already occupies and assigning the next unused
/// qualifying candidate to each free slot until candidates run out.
/// Single-select types take the first qualifying candidate. Types with no
/// qualifying candidate are left absent, never nulled.
pub fn fill_missing(
    missing_types: &[String],
    media_type: MediaType,
    existing_art: &ArtMap,
    available_art: &HashMap<String, Vec<CandidateImage>>,
    ctx: &SelectionContext,
) -> ArtMap {
    let mut new_art = ArtMap::new();
    if available_art.is_empty() {
        return new_art;
    }

    for base in missing_types {
        let Some(candidates) = available_art.get(base) else {
            continue;
        };
        let rule = policy::art_rule(media_type, base);

        if rule.multiselect {
            let mut existing_urls = Vec::new();
            let mut existing_names = Vec::new();
            for (name, url) in existing_art {
                if matches_base(name, base) && !url.is_empty() {
                    existing_urls.push(url.clone());
                    existing_names.push(name.clone());
                }
            }

            let qualifying: Vec<&CandidateImage> = candidates
                .iter()
                .filter(|c| accepts(base, c, ctx, &existing_urls))
                .collect();
            if qualifying.is_empty() {
                continue;
            }

            let mut used = 0;
            for slot in 0..rule.autolimit {
                let exact = exact_type(base, slot);
                if existing_names.contains(&exact) {
                    continue;
                }
                if used >= qualifying.len() {
                    break;
                }
                new_art.insert(exact, qualifying[used].url.clone());
                used += 1;
            }
        } else if let Some(best) = candidates.iter().find(|c| accepts(base, c, ctx, &[])) {
            new_art.insert(base.clone(), best.url.clone());
        }
    }
    new_art
}
