//! HTTP routes for analyze, download and health.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api::{ContentSource, InstagramApi};
use crate::config::{Config, UpstreamConfig};
use crate::content::{classify, ContentDescriptor};
use crate::download::DownloadProxy;
use crate::error::{Error, Result};
use crate::fs::ascii_filename;
use crate::resolve::Resolver;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    resolver: Arc<Resolver>,
    proxy: Arc<DownloadProxy>,
}

impl AppState {
    pub fn new(resolver: Arc<Resolver>, upstream: &UpstreamConfig) -> Self {
        let proxy = Arc::new(DownloadProxy::new(resolver.clone(), upstream));
        Self { resolver, proxy }
    }

    /// State backed by a source other than Instagram.
    pub fn with_source(source: Arc<dyn ContentSource>, config: &Config) -> Self {
        let resolver = Arc::new(Resolver::from_config(source, config));
        Self::new(resolver, &config.upstream)
    }

    /// State backed by the live Instagram API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = InstagramApi::new(&config.upstream)?;
        Ok(Self::with_source(Arc::new(api), config))
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub download_type: String,
}

/// Build the application router.
pub fn router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    Ok(Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/download", post(download))
        .with_state(state)
        .layer(trace)
        .layer(cors_layer(allowed_origins)?))
}

/// CORS policy. An empty allow-list admits any origin.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION]);

    if allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| Error::ConfigValidation {
                field: "allowed_origins".to_string(),
                message: format!("'{}' is not a valid header value", origin),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Instagram Downloader API is running"
    }))
}

async fn analyze(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ContentDescriptor>> {
    let Json(request) = payload.map_err(bad_body)?;
    let reference = classify(&request.url)?;
    tracing::info!("Analyzing {}", reference);

    let descriptor = state.resolver.resolve(&reference).await?;
    Ok(Json(descriptor.as_ref().clone()))
}

async fn download(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(bad_body)?;
    let reference = classify(&request.url)?;
    tracing::info!("Downloading {} from {}", request.download_type, reference);

    let result = state.proxy.download(&reference, &request.download_type).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&result.media_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&result.filename))
            .map_err(|e| Error::InvalidFilename(format!("{}: {}", result.filename, e)))?,
    );
    if let Some(length) = result.content_length {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok((headers, Body::from_stream(result.stream)).into_response())
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_filename(filename),
        urlencoding::encode(filename)
    )
}

fn bad_body(rejection: JsonRejection) -> Error {
    Error::InvalidUrl(format!("malformed request body: {}", rejection.body_text()))
}
