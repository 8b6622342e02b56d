//! TMDB (The Movie Database) artwork provider.
//!
//! Implements [`ArtworkProvider`] by querying the TMDB v3 REST API.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - 30-second request timeout.
//! - Poster aspect-ratio sanity flagging for candidates cropped to unusual shapes.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::art::{season_key, CandidateImage, Rating};
use crate::media::{MediaItem, MediaKind, MediaType};
use crate::providers::{ArtworkProvider, SetSearchResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;

/// Posters outside this width/height ratio range were cropped to a shape
/// the usual skins cannot display cleanly.
const POSTER_ASPECT: std::ops::RangeInclusive<f64> = 0.66..=0.685;

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbImagesResponse {
    posters: Option<Vec<TmdbImage>>,
    backdrops: Option<Vec<TmdbImage>>,
}

#[derive(Debug, Deserialize)]
struct TmdbImage {
    file_path: String,
    width: u32,
    height: u32,
    iso_639_1: Option<String>,
    vote_average: f64,
    vote_count: u64,
}

#[derive(Debug, Deserialize)]
struct TmdbCollectionSearchResponse {
    results: Vec<TmdbCollectionResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbCollectionResult {
    id: u64,
    name: Option<String>,
    overview: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB artwork provider.
///
/// Serves posters and backdrops for movies, shows, seasons of shows, and
/// movie sets (TMDB collections), with built-in rate limiting and retry
/// logic.
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a new TMDB provider with the given API key.
    ///
    /// Rate limiting is configured at 4 requests per second.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, TMDB_BASE_URL.to_string())
    }

    /// Create a provider pointed at a custom API endpoint.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        let quota = Quota::per_second(NonZeroU32::new(4).unwrap());
        let rate_limiter = RateLimiter::direct(quota);

        Self {
            client,
            api_key,
            base_url,
            rate_limiter,
        }
    }

    /// Execute a GET request with rate limiting and 429-retry logic.
    async fn get(&self, url: &str) -> anyhow::Result<reqwest::Response> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("TMDB request failed: {url}"))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            let resp = resp
                .error_for_status()
                .with_context(|| format!("TMDB request returned error: {url}"))?;

            return Ok(resp);
        }
    }

    /// Build a full API URL with the API key and any extra query parameters.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> String {
        let mut url = format!("{}{path}?api_key={}", self.base_url, self.api_key);
        for (key, value) in extra_params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }
        url
    }

    async fn fetch_images(&self, path: &str) -> anyhow::Result<TmdbImagesResponse> {
        let url = self.url(path, &[]);
        debug!(url = %url, "TMDB get images");

        self.get(&url)
            .await?
            .json()
            .await
            .with_context(|| format!("failed to parse TMDB images response: {path}"))
    }

    /// Map an images response to candidates keyed by exact art type.
    ///
    /// Posters map to `poster` and backdrops to `fanart`; season queries
    /// rewrite those into season-scoped keys.
    fn map_images(
        &self,
        resp: TmdbImagesResponse,
        season: Option<u32>,
        out: &mut HashMap<String, Vec<CandidateImage>>,
    ) {
        for (base, images) in [
            ("poster", resp.posters.unwrap_or_default()),
            ("fanart", resp.backdrops.unwrap_or_default()),
        ] {
            if images.is_empty() {
                continue;
            }
            let key = match season {
                Some(n) => season_key(n, base),
                None => base.to_string(),
            };
            let candidates = out.entry(key).or_default();
            for img in images {
                candidates.push(to_candidate(&img, self.name(), base));
            }
        }
    }
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

/// Convert a TMDB image path fragment to a full URL.
fn image_url(path: &str) -> String {
    format!("{TMDB_IMAGE_BASE}{path}")
}

/// Convert a raw TMDB image to a [`CandidateImage`].
///
/// Unvoted images get the neutral "Not rated" rating rather than a zero,
/// and the `xx` language marker (textless) maps to no language. Posters
/// cropped to an unusual aspect ratio are flagged.
fn to_candidate(img: &TmdbImage, provider: &str, base: &str) -> CandidateImage {
    let mut candidate = CandidateImage::new(image_url(&img.file_path), provider)
        .with_language(img.iso_639_1.as_deref().filter(|l| *l != "xx"))
        .with_size(img.width, img.height);

    candidate.rating = if img.vote_count > 0 {
        Rating {
            value: img.vote_average,
            display: format!("{:.1} stars", img.vote_average),
        }
    } else {
        Rating::not_rated()
    };

    if base == "poster" && img.height > 0 {
        let ratio = img.width as f64 / img.height as f64;
        candidate.goofy = !POSTER_ASPECT.contains(&ratio);
    }
    candidate
}

#[async_trait]
impl ArtworkProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "themoviedb.org"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn supports(&self, media_type: MediaType) -> bool {
        matches!(
            media_type,
            MediaType::Movie | MediaType::TvShow | MediaType::MovieSet
        )
    }

    async fn get_images(
        &self,
        item: &MediaItem,
    ) -> anyhow::Result<HashMap<String, Vec<CandidateImage>>> {
        let media_type = item.media_type();
        let id = item
            .unique_id
            .as_deref()
            .context("item has no external id for TMDB lookup")?;

        let mut result = HashMap::new();
        match &item.kind {
            MediaKind::Movie { .. } => {
                let resp = self.fetch_images(&format!("/movie/{id}/images")).await?;
                self.map_images(resp, None, &mut result);
            }
            MediaKind::MovieSet { .. } => {
                let resp = self
                    .fetch_images(&format!("/collection/{id}/images"))
                    .await?;
                self.map_images(resp, None, &mut result);
            }
            MediaKind::TvShow { seasons, .. } => {
                let resp = self.fetch_images(&format!("/tv/{id}/images")).await?;
                self.map_images(resp, None, &mut result);
                for season in seasons.keys() {
                    let resp = self
                        .fetch_images(&format!("/tv/{id}/season/{season}/images"))
                        .await?;
                    self.map_images(resp, Some(*season), &mut result);
                }
            }
            _ => anyhow::bail!("TMDB does not serve {media_type} artwork"),
        }
        Ok(result)
    }

    async fn search_set(&self, name: &str) -> anyhow::Result<Vec<SetSearchResult>> {
        let url = self.url("/search/collection", &[("query", name)]);
        debug!(url = %url, "TMDB search collection");

        let body: TmdbCollectionSearchResponse = self
            .get(&url)
            .await?
            .json()
            .await
            .context("failed to parse TMDB collection search response")?;

        Ok(body
            .results
            .into_iter()
            .map(|r| SetSearchResult {
                id: r.id.to_string(),
                name: r.name.unwrap_or_default(),
                overview: r.overview,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn poster_json(file: &str, w: u32, h: u32, votes: u64) -> serde_json::Value {
        json!({
            "file_path": file,
            "width": w,
            "height": h,
            "iso_639_1": "en",
            "vote_average": 7.4,
            "vote_count": votes,
        })
    }

    fn movie_item(tmdb_id: &str) -> MediaItem {
        let mut item = MediaItem::new(1, "Example", MediaKind::Movie { premiered: None });
        item.unique_id = Some(tmdb_id.to_string());
        item
    }

    #[test]
    fn image_url_construction() {
        assert_eq!(
            image_url("/abc123.jpg"),
            "https://image.tmdb.org/t/p/original/abc123.jpg"
        );
    }

    #[test]
    fn url_encoding() {
        assert_eq!(urlencoded("hello world"), "hello+world");
        assert_eq!(urlencoded("foo&bar"), "foo%26bar");
        assert_eq!(urlencoded("simple"), "simple");
    }

    #[test]
    fn unvoted_image_gets_not_rated() {
        let img = TmdbImage {
            file_path: "/p.jpg".to_string(),
            width: 1000,
            height: 1500,
            iso_639_1: None,
            vote_average: 0.0,
            vote_count: 0,
        };
        let c = to_candidate(&img, "themoviedb.org", "poster");
        assert_eq!(c.rating.value, 5.0);
        assert_eq!(c.rating.display, "Not rated");
    }

    #[test]
    fn textless_language_marker_maps_to_none() {
        let img = TmdbImage {
            file_path: "/p.jpg".to_string(),
            width: 1000,
            height: 1500,
            iso_639_1: Some("xx".to_string()),
            vote_average: 6.0,
            vote_count: 3,
        };
        let c = to_candidate(&img, "themoviedb.org", "poster");
        assert_eq!(c.language, None);
        assert_eq!(c.rating.display, "6.0 stars");
    }

    #[test]
    fn odd_poster_aspect_is_flagged() {
        let square = TmdbImage {
            file_path: "/sq.jpg".to_string(),
            width: 1000,
            height: 1000,
            iso_639_1: None,
            vote_average: 0.0,
            vote_count: 0,
        };
        assert!(to_candidate(&square, "themoviedb.org", "poster").goofy);

        let normal = TmdbImage {
            file_path: "/n.jpg".to_string(),
            width: 1000,
            height: 1500,
            iso_639_1: None,
            vote_average: 0.0,
            vote_count: 0,
        };
        assert!(!to_candidate(&normal, "themoviedb.org", "poster").goofy);
        // Backdrops are never aspect-checked.
        assert!(!to_candidate(&square, "themoviedb.org", "fanart").goofy);
    }

    #[test]
    fn provider_availability() {
        assert!(TmdbProvider::new("key".into()).is_available());
        assert!(!TmdbProvider::new(String::new()).is_available());
    }

    #[test]
    fn supported_media_types() {
        let provider = TmdbProvider::new("key".into());
        assert!(provider.supports(MediaType::Movie));
        assert!(provider.supports(MediaType::MovieSet));
        assert!(provider.supports(MediaType::TvShow));
        assert!(!provider.supports(MediaType::Episode));
        assert!(!provider.supports(MediaType::Season));
    }

    #[tokio::test]
    async fn movie_images_map_to_poster_and_fanart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/550/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posters": [poster_json("/p1.jpg", 1000, 1500, 12)],
                "backdrops": [poster_json("/b1.jpg", 1920, 1080, 0)],
            })))
            .mount(&server)
            .await;

        let provider = TmdbProvider::with_base_url("key".into(), server.uri());
        let images = provider.get_images(&movie_item("550")).await.unwrap();

        assert_eq!(images["poster"].len(), 1);
        assert_eq!(
            images["poster"][0].url,
            "https://image.tmdb.org/t/p/original/p1.jpg"
        );
        assert_eq!(images["fanart"].len(), 1);
        assert_eq!(images["fanart"][0].rating.display, "Not rated");
    }

    #[tokio::test]
    async fn show_images_include_season_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tv/1396/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posters": [poster_json("/show.jpg", 1000, 1500, 1)],
                "backdrops": [],
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tv/1396/season/2/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posters": [poster_json("/s2.jpg", 1000, 1500, 1)],
            })))
            .mount(&server)
            .await;

        let mut item = MediaItem::new(
            7,
            "Show",
            MediaKind::TvShow {
                premiered: None,
                seasons: [(2u32, 42i64)].into_iter().collect(),
            },
        );
        item.unique_id = Some("1396".to_string());

        let provider = TmdbProvider::with_base_url("key".into(), server.uri());
        let images = provider.get_images(&item).await.unwrap();

        assert!(images.contains_key("poster"));
        assert_eq!(images["season.2.poster"].len(), 1);
        assert!(!images.contains_key("season.2.fanart"));
    }

    #[tokio::test]
    async fn retries_on_429_with_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/550/images"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("retry-after", "0"),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/550/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posters": [poster_json("/p1.jpg", 1000, 1500, 1)],
            })))
            .mount(&server)
            .await;

        let provider = TmdbProvider::with_base_url("key".into(), server.uri());
        let images = provider.get_images(&movie_item("550")).await.unwrap();
        assert_eq!(images["poster"].len(), 1);
    }

    #[tokio::test]
    async fn collection_search_maps_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/collection"))
            .and(query_param("query", "Alien Collection"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"id": 8091, "name": "Alien Collection", "overview": "Xenomorphs."}
                ]
            })))
            .mount(&server)
            .await;

        let provider = TmdbProvider::with_base_url("key".into(), server.uri());
        let results = provider.search_set("Alien Collection").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "8091");
        assert_eq!(results[0].name, "Alien Collection");
    }
}
