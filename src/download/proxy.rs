//! Pass-through download of a single asset.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt};
use tokio::time::timeout;

use crate::api::ByteStream;
use crate::config::UpstreamConfig;
use crate::content::{ContentDescriptor, ContentReference, OptionKey};
use crate::error::{Error, Result, UpstreamReason};
use crate::fs::derive_filename;
use crate::media::{extension_for, guess_mimetype, MediaType};
use crate::resolve::Resolver;

/// An asset ready to be streamed to the caller.
pub struct DownloadStreamResult {
    pub filename: String,
    /// MIME type of the fetched bytes.
    pub media_type: String,
    pub content_length: Option<u64>,
    pub stream: ByteStream,
}

impl fmt::Debug for DownloadStreamResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadStreamResult")
            .field("filename", &self.filename)
            .field("media_type", &self.media_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Streams assets from upstream without buffering them.
///
/// Every download re-resolves the reference instead of trusting cached
/// asset URLs, which are signed and expire. Asset fetches are never retried.
pub struct DownloadProxy {
    resolver: Arc<Resolver>,
    asset_timeout: Duration,
}

impl DownloadProxy {
    pub fn new(resolver: Arc<Resolver>, upstream: &UpstreamConfig) -> Self {
        Self {
            resolver,
            asset_timeout: upstream.asset_timeout(),
        }
    }

    /// Resolve `reference` and open the asset behind option `key`.
    #[tracing::instrument(skip(self, reference), fields(reference = %reference))]
    pub async fn download(
        &self,
        reference: &ContentReference,
        key: &str,
    ) -> Result<DownloadStreamResult> {
        let key = parse_key(key)?;
        let descriptor = self.resolver.resolve_fresh(reference).await?;
        self.download_resolved(reference, &descriptor, key).await
    }

    /// Open the asset behind `key` in a descriptor resolved for this request.
    pub async fn download_resolved(
        &self,
        reference: &ContentReference,
        descriptor: &ContentDescriptor,
        key: OptionKey,
    ) -> Result<DownloadStreamResult> {
        let option = descriptor.download_options.get(&key).ok_or_else(|| {
            Error::OptionUnavailable(format!("'{}' is not offered for this {}", key, reference.kind()))
        })?;

        let url = match option.source_url() {
            Some(url) if option.available => url,
            _ => {
                return Err(Error::OptionUnavailable(format!(
                    "'{}' is not available: {}",
                    key, option.description
                )))
            }
        };

        let asset = timeout(self.asset_timeout, self.resolver.source().open_asset(url))
            .await
            .map_err(|_| {
                Error::upstream(
                    UpstreamReason::Timeout,
                    format!("asset did not respond within {}s", self.asset_timeout.as_secs()),
                )
            })??;

        let fallback = option.media_type.unwrap_or(MediaType::Image);
        let media_type = asset
            .content_type
            .filter(|ct| MediaType::from_mimetype(ct).is_some())
            .or_else(|| guess_mimetype(url).filter(|ct| MediaType::from_mimetype(ct).is_some()))
            .unwrap_or_else(|| fallback.default_mimetype().to_string());

        let extension = extension_for(Some(&media_type), url, fallback);
        let filename = derive_filename(
            &descriptor.username,
            reference.kind(),
            reference.content_id(),
            key,
            &extension,
        );

        tracing::info!("Streaming {} ({})", filename, media_type);

        Ok(DownloadStreamResult {
            filename,
            media_type,
            content_length: asset.content_length,
            stream: with_idle_timeout(asset.body, self.asset_timeout),
        })
    }
}

/// Parse a client-supplied option key.
pub fn parse_key(key: &str) -> Result<OptionKey> {
    key.trim()
        .parse()
        .map_err(|_| Error::OptionUnavailable(format!("'{}' is not a download option", key)))
}

/// Fail the stream when upstream stalls longer than `idle` between chunks.
fn with_idle_timeout(body: ByteStream, idle: Duration) -> ByteStream {
    stream::unfold(Some(body), move |state| async move {
        let mut body = state?;
        match timeout(idle, body.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(body))),
            Ok(Some(Err(e))) => Some((Err(e), None)),
            Ok(None) => None,
            Err(_) => Some((
                Err(Error::upstream(
                    UpstreamReason::Timeout,
                    format!("asset stream stalled for {}s", idle.as_secs()),
                )),
                None,
            )),
        }
    })
    .boxed()
}
