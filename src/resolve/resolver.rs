//! Metadata resolution: reference in, display-ready descriptor out.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::time::{sleep, timeout};

use crate::api::ContentSource;
use crate::config::{Config, UpstreamConfig};
use crate::content::{ContentDescriptor, ContentKind, ContentReference};
use crate::error::{Error, Result, UpstreamReason};
use crate::media::{RawMetadata, StoryAccess};
use crate::options::build_options;
use crate::resolve::cache::MetadataCache;

/// Caption and biography length shown in descriptors.
const DESCRIPTION_MAX_CHARS: usize = 100;

/// Resolves content references against a [`ContentSource`].
pub struct Resolver {
    source: Arc<dyn ContentSource>,
    cache: Option<MetadataCache>,
    metadata_timeout: Duration,
    max_attempts: u32,
    retry_base_delay: Duration,
}

impl Resolver {
    /// Create a resolver without caching.
    pub fn new(source: Arc<dyn ContentSource>, upstream: &UpstreamConfig) -> Self {
        Self {
            source,
            cache: None,
            metadata_timeout: upstream.metadata_timeout(),
            max_attempts: upstream.max_attempts.clamp(1, 2),
            retry_base_delay: upstream.retry_base_delay(),
        }
    }

    /// Create a resolver with the cache settings from `config`.
    pub fn from_config(source: Arc<dyn ContentSource>, config: &Config) -> Self {
        let resolver = Self::new(source, &config.upstream);
        if config.cache.enabled {
            resolver.with_cache(MetadataCache::new(
                config.cache.ttl(),
                config.cache.max_entries,
            ))
        } else {
            resolver
        }
    }

    pub fn with_cache(mut self, cache: MetadataCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The underlying content source.
    pub fn source(&self) -> Arc<dyn ContentSource> {
        self.source.clone()
    }

    /// Resolve a reference, serving a recent result from the cache if enabled.
    pub async fn resolve(&self, reference: &ContentReference) -> Result<Arc<ContentDescriptor>> {
        match &self.cache {
            Some(cache) => {
                cache
                    .get_or_try_insert_with(reference, || self.resolve_fresh(reference))
                    .await
            }
            None => self.resolve_fresh(reference).await.map(Arc::new),
        }
    }

    /// Resolve a reference against upstream, bypassing the cache.
    #[tracing::instrument(skip(self, reference), fields(reference = %reference))]
    pub async fn resolve_fresh(&self, reference: &ContentReference) -> Result<ContentDescriptor> {
        let raw = self.fetch_metadata(reference).await?;
        let descriptor = describe(reference, &raw);

        tracing::debug!(
            "Resolved {} with {} download option(s)",
            descriptor.content_type,
            descriptor.download_options.len()
        );
        Ok(descriptor)
    }

    /// Fetch typed metadata, retrying transient upstream failures once.
    async fn fetch_metadata(&self, reference: &ContentReference) -> Result<RawMetadata> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(reference).await {
                Ok(raw) => return Ok(raw),
                Err(e) if attempt < self.max_attempts && should_retry(&e) => {
                    let delay = self.retry_delay();
                    tracing::warn!(
                        "Metadata fetch failed ({}), retrying in {}ms",
                        e,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, reference: &ContentReference) -> Result<RawMetadata> {
        timeout(self.metadata_timeout, self.fetch_kind(reference))
            .await
            .map_err(|_| {
                Error::upstream(
                    UpstreamReason::Timeout,
                    format!(
                        "metadata for {} not received within {}s",
                        reference,
                        self.metadata_timeout.as_secs()
                    ),
                )
            })?
    }

    async fn fetch_kind(&self, reference: &ContentReference) -> Result<RawMetadata> {
        match reference.kind() {
            ContentKind::Post | ContentKind::Reel => {
                let shortcode = reference
                    .content_id()
                    .ok_or_else(|| Error::InvalidUrl(format!("{} has no shortcode", reference)))?;
                self.source.fetch_post(shortcode).await.map(RawMetadata::Post)
            }
            ContentKind::Profile => {
                let profile = self.source.fetch_profile(reference.owner_handle()).await?;
                if profile.is_private {
                    return Err(Error::PrivateContent(format!(
                        "@{} is a private account",
                        profile.username
                    )));
                }
                Ok(RawMetadata::Profile(profile))
            }
            ContentKind::Story => {
                let mut feed = self.source.fetch_stories(reference.owner_handle()).await?;
                feed.retain_active(Utc::now());
                Ok(RawMetadata::Story(feed))
            }
        }
    }

    fn retry_delay(&self) -> Duration {
        let base = self.retry_base_delay.as_millis() as u64;
        let jitter = rand::thread_rng().gen_range(0..=base / 2);
        Duration::from_millis(base + jitter)
    }
}

/// Timeouts, dropped connections and 5xx responses. Rate limits go back to the caller.
fn should_retry(error: &Error) -> bool {
    match error.upstream_reason() {
        Some(UpstreamReason::Timeout) | Some(UpstreamReason::Transport) => true,
        Some(UpstreamReason::Status(status)) => status >= 500,
        _ => false,
    }
}

/// Build the descriptor for fetched metadata.
pub fn describe(reference: &ContentReference, raw: &RawMetadata) -> ContentDescriptor {
    let username = match raw.owner() {
        "" => reference.owner_handle().to_string(),
        owner => owner.to_string(),
    };

    let (content_type, title, description, thumbnail_url) = match raw {
        RawMetadata::Post(post) => {
            let single_video = !post.is_carousel && post.items.len() == 1 && post.items[0].is_video();
            let is_reel = reference.kind() == ContentKind::Reel || single_video;
            let (content_type, label) = if is_reel { ("reel", "Reel") } else { ("post", "Post") };
            (
                content_type,
                format!("{} by @{}", label, username),
                post.caption.as_deref().map(truncate_description),
                post.thumbnail_url.clone(),
            )
        }
        RawMetadata::Profile(profile) => (
            "profile",
            format!("Profile: @{}", username),
            profile.biography.as_deref().map(truncate_description),
            profile.profile_pic_url.clone(),
        ),
        RawMetadata::Story(feed) => {
            let description = match feed.access {
                StoryAccess::LoginRequired => "Stories require Instagram login to access".to_string(),
                StoryAccess::PrivateAccount => "Stories of private accounts are not accessible".to_string(),
                StoryAccess::Available => match feed.items.len() {
                    0 => "No active stories".to_string(),
                    1 => "1 active story".to_string(),
                    n => format!("{} active stories", n),
                },
            };
            let thumbnail_url = feed
                .items
                .first()
                .and_then(|s| s.asset.preview_url.clone())
                .or_else(|| feed.profile_pic_url.clone());
            (
                "story",
                format!("Story by @{}", username),
                Some(description),
                thumbnail_url,
            )
        }
    };

    ContentDescriptor {
        content_type: content_type.to_string(),
        title,
        description,
        thumbnail_url,
        username,
        download_options: build_options(reference.kind(), raw),
    }
}

/// Cut text to the descriptor length, marking the cut with `...`.
pub fn truncate_description(text: &str) -> String {
    match text.char_indices().nth(DESCRIPTION_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
