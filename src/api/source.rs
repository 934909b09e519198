//! Abstraction over the upstream content source.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::media::{PostMedia, ProfileInfo, StoryFeed};

/// Byte stream of a fetched asset.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// An open asset download.
pub struct AssetStream {
    /// `Content-Type` declared by upstream.
    pub content_type: Option<String>,
    /// `Content-Length` declared by upstream.
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl fmt::Debug for AssetStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Read-only query interface of the external content provider.
///
/// Implementations parse upstream payloads into typed metadata and map
/// upstream failures onto the crate error taxonomy:
/// missing content → `NotFound`, login walls → `PrivateContent`,
/// everything transient → `Upstream`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a post or reel by shortcode.
    async fn fetch_post(&self, shortcode: &str) -> Result<PostMedia>;

    /// Fetch public profile information.
    async fn fetch_profile(&self, handle: &str) -> Result<ProfileInfo>;

    /// Fetch a user's current stories.
    async fn fetch_stories(&self, handle: &str) -> Result<StoryFeed>;

    /// Open a byte stream for an asset URL previously returned in metadata.
    async fn open_asset(&self, url: &str) -> Result<AssetStream>;
}
