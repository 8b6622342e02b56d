//! Candidate ranking.
//!
//! One stable comparator over an explicit key tuple, most to least
//! significant: language tier, disc-subtype mismatch (discart only),
//! size bucket descending, rating descending. Equal keys preserve the
//! providers' input order.

use std::cmp::Ordering;

use crate::art::{media_source, CandidateImage, ImageSize};

use super::SelectionContext;

/// Sort candidates for one art type into presentation/selection order.
///
/// Stable and idempotent: re-ranking an already-ranked list yields the
/// same order.
pub fn rank(
    art_type: &str,
    candidates: &mut [CandidateImage],
    media_path: Option<&str>,
    ctx: &SelectionContext,
) {
    let source = if art_type == "discart" {
        media_source(media_path)
    } else {
        None
    };

    candidates.sort_by(|a, b| {
        language_tier(a, art_type, ctx)
            .cmp(&language_tier(b, art_type, ctx))
            .then_with(|| subtype_rank(a, source).cmp(&subtype_rank(b, source)))
            .then_with(|| size_bucket(&b.size, ctx.preferred_size).cmp(&size_bucket(&a.size, ctx.preferred_size)))
            .then_with(|| {
                b.rating
                    .value
                    .partial_cmp(&a.rating.value)
                    .unwrap_or(Ordering::Equal)
            })
    });
}

/// Language preference tier, doubled to keep it integral: 0 for the
/// active language, 1 for the English fallback (active language not
/// English), 2 otherwise. Title-free policy adds 2 when the art type is
/// a titled category and the candidate has any language at all.
fn language_tier(image: &CandidateImage, art_type: &str, ctx: &SelectionContext) -> u8 {
    let lang = image.language.as_deref();
    let mut tier = if lang == Some(ctx.language.as_str()) {
        0
    } else if ctx.language != "en" && lang == Some("en") {
        1
    } else {
        2
    };

    let titlefree = (art_type.ends_with("fanart") && ctx.titlefree_fanart)
        || (art_type.ends_with("poster") && ctx.titlefree_poster);
    if lang.is_some() && titlefree {
        tier += 2;
    }
    tier
}

/// 0 when the candidate's disc subtype matches the detected media
/// source, 1 otherwise. No detected source means no preference.
fn subtype_rank(image: &CandidateImage, source: Option<&'static str>) -> u8 {
    match source {
        Some(src) if image.subtype.as_deref() == Some(src) => 0,
        Some(_) => 1,
        None => 0,
    }
}

/// Size score in 200-pixel buckets. Dimensions above the preferred
/// maximum are first shrunk proportionally to fit, so an oversized image
/// scores no better than one exactly at the preferred size.
fn size_bucket(size: &ImageSize, preferred: (u32, u32)) -> i64 {
    let mut w = size.width as f64;
    let mut h = size.height as f64;
    let (pw, ph) = (preferred.0 as f64, preferred.1 as f64);

    if w > pw {
        let shrink = pw / w;
        w = pw;
        h *= shrink;
    }
    if h > ph {
        let shrink = ph / h;
        w *= shrink;
        h = ph;
    }
    (w.max(h) / 200.0) as i64
}
