//! HTTP mapping of crate errors.

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{Error, ErrorKind, UpstreamReason};

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Status code for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidUrl | ErrorKind::OptionUnavailable => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PrivateContent => StatusCode::FORBIDDEN,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);
        let reason = self.upstream_reason();

        if kind == ErrorKind::Internal {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request failed ({}): {}", kind.as_str(), self);
        }

        let body = Json(ErrorBody {
            detail: self.user_message(),
            kind: kind.as_str(),
            reason: reason.map(|r| r.as_str()),
        });

        let mut response = (status, body).into_response();
        if let Some(UpstreamReason::RateLimited {
            retry_after_secs: Some(seconds),
        }) = reason
        {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}
