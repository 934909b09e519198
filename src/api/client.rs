//! Instagram HTTP client.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::source::{AssetStream, ContentSource};
use crate::api::types::*;
use crate::config::UpstreamConfig;
use crate::error::{Error, Result, UpstreamReason};
use crate::media::{
    parse_profile, parse_shortcode_media, parse_story_reel, PostMedia, ProfileInfo, StoryAccess,
    StoryFeed,
};

/// Instagram GraphQL API endpoint.
const GRAPHQL_ENDPOINT: &str = "https://www.instagram.com/api/graphql";

/// Private API base used by the web app.
const API_BASE: &str = "https://i.instagram.com/api/v1";

/// Facebook LSD token (anti-CSRF, public static value used by web scrapers).
const FB_LSD_TOKEN: &str = "AVqbxe3J_YA";

/// Facebook ASBD ID (public, embedded in the web app).
const FB_ASBD_ID: &str = "129477";

/// Bytes of an error body kept in log and error messages.
const BODY_PREVIEW_LEN: usize = 300;

/// Instagram API client for anonymous public-content access.
pub struct InstagramApi {
    client: Client,
    graphql_doc_id: String,
}

impl InstagramApi {
    /// Create a new API client.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let app_id = header::HeaderValue::from_str(&config.app_id)
            .map_err(|e| Error::Config(format!("Invalid app_id header value: {}", e)))?;

        headers.insert("x-ig-app-id", app_id);
        headers.insert("x-asbd-id", header::HeaderValue::from_static(FB_ASBD_ID));
        headers.insert(
            "x-requested-with",
            header::HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_static("https://www.instagram.com/"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .connect_timeout(config.metadata_timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            graphql_doc_id: config.graphql_doc_id.clone(),
        })
    }

    /// Get a post or reel by shortcode via GraphQL.
    pub async fn get_post(&self, shortcode: &str) -> Result<ShortcodeMedia> {
        let variables = serde_json::json!({ "shortcode": shortcode }).to_string();

        tracing::debug!("POST {} shortcode={}", GRAPHQL_ENDPOINT, shortcode);

        let response = self
            .client
            .post(GRAPHQL_ENDPOINT)
            .header("x-fb-lsd", FB_LSD_TOKEN)
            .header(header::ORIGIN, "https://www.instagram.com")
            .header(header::ACCEPT, "*/*")
            .form(&[
                ("doc_id", self.graphql_doc_id.as_str()),
                ("variables", variables.as_str()),
                ("lsd", FB_LSD_TOKEN),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let what = format!("post {}", shortcode);
        let body: GraphqlResponse = read_json(response, &what).await?;

        match body.data.and_then(GraphqlData::into_media) {
            Some(media) => Ok(media),
            None if body.status.requires_login() => Err(Error::PrivateContent(format!(
                "{} requires login (private account)",
                what
            ))),
            None => Err(Error::NotFound(what)),
        }
    }

    /// Get public profile information by username.
    pub async fn get_web_profile(&self, username: &str) -> Result<WebUser> {
        let url = format!("{}/users/web_profile_info/?username={}", API_BASE, username);
        let what = format!("profile @{}", username);
        let body: WebProfileResponse = self.get_json(&url, &what).await?;

        match body.data.and_then(|d| d.user) {
            Some(user) => Ok(user),
            None if body.status.requires_login() => Err(Error::PrivateContent(format!(
                "{} requires login",
                what
            ))),
            None => Err(Error::NotFound(what)),
        }
    }

    /// Get the current story tray for a user id.
    pub async fn get_reels_media(&self, user_id: &str) -> Result<Option<StoryReel>> {
        let url = format!("{}/feed/reels_media/?reel_ids={}", API_BASE, user_id);
        let what = format!("stories of user {}", user_id);
        let mut body: ReelsMediaResponse = self.get_json(&url, &what).await?;

        if body.status.requires_login() {
            return Err(Error::PrivateContent(format!("{} require login", what)));
        }

        Ok(body
            .reels
            .remove(user_id)
            .or_else(|| body.reels_media.into_iter().next()))
    }

    /// Download a file from a URL (streamed by the caller).
    pub async fn download_file(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET asset {}", url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        tracing::warn!("Asset request failed: HTTP {}", status);
        match status {
            // Signed CDN URLs expire; treat like removed content.
            StatusCode::NOT_FOUND | StatusCode::GONE | StatusCode::FORBIDDEN => Err(
                Error::NotFound("the media file is no longer available".to_string()),
            ),
            StatusCode::TOO_MANY_REQUESTS => Err(Error::upstream(
                UpstreamReason::RateLimited {
                    retry_after_secs: retry_after(response.headers()),
                },
                "asset download rate limited",
            )),
            _ => Err(Error::upstream(
                UpstreamReason::Status(status.as_u16()),
                format!("Failed to download file: HTTP {}", status),
            )),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        read_json(response, what).await
    }
}

#[async_trait]
impl ContentSource for InstagramApi {
    async fn fetch_post(&self, shortcode: &str) -> Result<PostMedia> {
        let media = self.get_post(shortcode).await?;
        Ok(parse_shortcode_media(media))
    }

    async fn fetch_profile(&self, handle: &str) -> Result<ProfileInfo> {
        let user = self.get_web_profile(handle).await?;
        Ok(parse_profile(user))
    }

    async fn fetch_stories(&self, handle: &str) -> Result<StoryFeed> {
        let profile = self.fetch_profile(handle).await?;

        let restricted = |access| StoryFeed {
            owner: profile.username.clone(),
            access,
            profile_pic_url: profile.profile_pic_url.clone(),
            items: Vec::new(),
        };

        if profile.is_private {
            return Ok(restricted(StoryAccess::PrivateAccount));
        }

        match self.get_reels_media(&profile.user_id).await {
            Ok(reel) => Ok(parse_story_reel(&profile, reel)),
            Err(Error::PrivateContent(reason)) => {
                tracing::debug!("Stories unavailable anonymously: {}", reason);
                Ok(restricted(StoryAccess::LoginRequired))
            }
            Err(e) => Err(e),
        }
    }

    async fn open_asset(&self, url: &str) -> Result<AssetStream> {
        let response = self.download_file(url).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();

        let body = response.bytes_stream().map_err(transport_error).boxed();

        Ok(AssetStream {
            content_type,
            content_length,
            body,
        })
    }
}

/// Check status and parse a JSON body, mapping failures onto the error taxonomy.
async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    let retry_after_secs = retry_after(response.headers());
    tracing::debug!("Response status: {}", status);

    let text = response.text().await.map_err(transport_error)?;

    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(what.to_string()));
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(Error::upstream(
            UpstreamReason::RateLimited { retry_after_secs },
            format!("{}: HTTP 429", what),
        ));
    }

    if !status.is_success() {
        let api_status: ApiStatus = serde_json::from_str(&text).unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || api_status.requires_login() {
            return Err(Error::PrivateContent(format!("{} requires login", what)));
        }

        tracing::error!("Upstream error response: {}", preview(&text));
        return Err(Error::upstream(
            UpstreamReason::Status(status.as_u16()),
            format!("{}: HTTP {}", what, status),
        ));
    }

    serde_json::from_str(&text).map_err(|e| {
        Error::upstream(
            UpstreamReason::MalformedResponse,
            format!(
                "Failed to parse {}: {} - Response: {}",
                what,
                e,
                preview(&text)
            ),
        )
    })
}

fn transport_error(e: reqwest::Error) -> Error {
    let reason = if e.is_timeout() {
        UpstreamReason::Timeout
    } else {
        UpstreamReason::Transport
    };
    Error::upstream(reason, e.to_string())
}

fn retry_after(headers: &header::HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn preview(text: &str) -> &str {
    let mut end = text.len().min(BODY_PREVIEW_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "é".repeat(BODY_PREVIEW_LEN);
        let cut = preview(&text);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(cut.chars().all(|c| c == 'é'));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = header::HeaderMap::new();
        assert_eq!(retry_after(&headers), None);
        headers.insert(header::RETRY_AFTER, header::HeaderValue::from_static("42"));
        assert_eq!(retry_after(&headers), Some(42));
    }

    #[test]
    fn test_client_builds_from_default_config() {
        let config = UpstreamConfig::default();
        assert!(InstagramApi::new(&config).is_ok());
    }
}
