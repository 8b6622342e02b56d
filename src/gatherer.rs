//! Candidate gathering: fan a request out to the providers applicable to
//! an item and merge what they return.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::art::{base_type, CandidateImage};
use crate::media::MediaItem;
use crate::providers::ArtworkProvider;
use crate::selection::{rank, SelectionContext};

/// A single provider failure surfaced to the user. Only one is reported
/// per item even when several providers fail.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: String,
    pub message: String,
}

/// Everything gathered for one item.
#[derive(Debug, Default)]
pub struct GatheredArt {
    /// Art the user placed locally, keyed by exact art type. Always
    /// applied over automatic selections.
    pub forced: HashMap<String, Vec<CandidateImage>>,
    /// Remote candidates keyed by exact art type, ranked per type.
    pub available: HashMap<String, Vec<CandidateImage>>,
    /// Whether any remote service was actually contacted, for throttling.
    pub services_hit: bool,
    /// At most one provider failure for this item.
    pub error: Option<ProviderError>,
}

/// Gathers artwork candidates for a media item.
#[async_trait]
pub trait Gatherer: Send + Sync {
    async fn gather(&self, item: &MediaItem, ctx: &SelectionContext) -> GatheredArt;
}

/// The standard gatherer: local sources always run and feed the forced
/// map; remote providers are skipped entirely in filesystem-only mode.
/// A failing provider never suppresses candidates already gathered from
/// the others.
pub struct ProviderGatherer {
    remote: Vec<Arc<dyn ArtworkProvider>>,
    local: Vec<Arc<dyn ArtworkProvider>>,
    only_filesystem: bool,
}

impl ProviderGatherer {
    pub fn new(remote: Vec<Arc<dyn ArtworkProvider>>) -> Self {
        Self {
            remote,
            local: Vec::new(),
            only_filesystem: false,
        }
    }

    /// Register a local (filesystem) source; its results become forced art.
    pub fn with_local(mut self, provider: Arc<dyn ArtworkProvider>) -> Self {
        self.local.push(provider);
        self
    }

    pub fn only_filesystem(mut self, enabled: bool) -> Self {
        self.only_filesystem = enabled;
        self
    }
}

fn merge(
    into: &mut HashMap<String, Vec<CandidateImage>>,
    from: HashMap<String, Vec<CandidateImage>>,
) {
    for (art_type, candidates) in from {
        into.entry(art_type).or_default().extend(candidates);
    }
}

#[async_trait]
impl Gatherer for ProviderGatherer {
    async fn gather(&self, item: &MediaItem, ctx: &SelectionContext) -> GatheredArt {
        let media_type = item.media_type();
        let mut result = GatheredArt::default();

        for provider in &self.local {
            if !provider.is_available() || !provider.supports(media_type) {
                continue;
            }
            match provider.get_images(item).await {
                Ok(images) => merge(&mut result.forced, images),
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "local artwork source failed");
                }
            }
        }

        if self.only_filesystem {
            debug!(item = item.id, "filesystem-only mode, skipping remote providers");
            return result;
        }

        for provider in &self.remote {
            if !provider.is_available() || !provider.supports(media_type) {
                continue;
            }
            result.services_hit = true;
            match provider.get_images(item).await {
                Ok(images) => merge(&mut result.available, images),
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "artwork provider failed");
                    if result.error.is_none() {
                        result.error = Some(ProviderError {
                            provider: provider.name().to_string(),
                            message: err.to_string(),
                        });
                    }
                }
            }
        }

        for (art_type, candidates) in result.available.iter_mut() {
            rank(
                base_type(art_type),
                candidates,
                item.file.as_deref(),
                ctx,
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::media::{MediaKind, MediaType};

    struct StubProvider {
        name: &'static str,
        images: HashMap<String, Vec<CandidateImage>>,
        fail: bool,
    }

    impl StubProvider {
        fn with_poster(name: &'static str, url: &str) -> Self {
            let mut images = HashMap::new();
            images.insert(
                "poster".to_string(),
                vec![CandidateImage::new(url, name)],
            );
            StubProvider {
                name,
                images,
                fail: false,
            }
        }

        fn failing(name: &'static str) -> Self {
            StubProvider {
                name,
                images: HashMap::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ArtworkProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_available(&self) -> bool {
            true
        }

        fn supports(&self, media_type: MediaType) -> bool {
            media_type == MediaType::Movie
        }

        async fn get_images(
            &self,
            _item: &MediaItem,
        ) -> anyhow::Result<HashMap<String, Vec<CandidateImage>>> {
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(self.images.clone())
        }
    }

    fn movie() -> MediaItem {
        MediaItem::new(1, "Example", MediaKind::Movie { premiered: None })
    }

    fn ctx() -> SelectionContext {
        SelectionContext::new("en", &Config::default())
    }

    #[tokio::test]
    async fn merges_candidates_across_providers() {
        let gatherer = ProviderGatherer::new(vec![
            Arc::new(StubProvider::with_poster("one", "http://a")),
            Arc::new(StubProvider::with_poster("two", "http://b")),
        ]);

        let gathered = gatherer.gather(&movie(), &ctx()).await;
        assert!(gathered.services_hit);
        assert!(gathered.error.is_none());
        assert_eq!(gathered.available["poster"].len(), 2);
    }

    #[tokio::test]
    async fn one_failing_provider_keeps_the_rest() {
        let gatherer = ProviderGatherer::new(vec![
            Arc::new(StubProvider::failing("broken")),
            Arc::new(StubProvider::with_poster("fine", "http://a")),
        ]);

        let gathered = gatherer.gather(&movie(), &ctx()).await;
        assert_eq!(gathered.available["poster"].len(), 1);
        let error = gathered.error.expect("error should be surfaced");
        assert_eq!(error.provider, "broken");
    }

    #[tokio::test]
    async fn filesystem_only_skips_remote_but_keeps_local() {
        let gatherer = ProviderGatherer::new(vec![Arc::new(StubProvider::with_poster(
            "remote",
            "http://remote",
        ))])
        .with_local(Arc::new(StubProvider::with_poster("local", "file:///p")))
        .only_filesystem(true);

        let gathered = gatherer.gather(&movie(), &ctx()).await;
        assert!(!gathered.services_hit);
        assert!(gathered.available.is_empty());
        assert_eq!(gathered.forced["poster"].len(), 1);
    }

    #[tokio::test]
    async fn unsupported_media_type_contacts_nothing() {
        let gatherer = ProviderGatherer::new(vec![Arc::new(StubProvider::with_poster(
            "one",
            "http://a",
        ))]);

        let item = MediaItem::new(9, "Ep", MediaKind::Episode);
        let gathered = gatherer.gather(&item, &ctx()).await;
        assert!(!gathered.services_hit);
        assert!(gathered.available.is_empty());
    }
}
