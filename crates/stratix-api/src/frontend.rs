//! Forwarding of page requests to the rendering frontend.

use std::time::Duration;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use reqwest::Client;
use reqwest::redirect::Policy;

use stratix_core::error::{AppError, ErrorKind};

/// Hop-by-hop headers, never forwarded in either direction.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

const FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Reverse proxy to the frontend. Redirects are passed back to the client
/// untouched.
#[derive(Debug, Clone)]
pub struct FrontendProxy {
    /// Frontend base URL (no trailing slash).
    base_url: String,
    client: Client,
    max_body_bytes: usize,
}

impl FrontendProxy {
    pub fn new(base_url: &str, timeout: Duration, max_body_bytes: usize) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build frontend client", e)
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            max_body_bytes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forwards `request` as-is, with `extra` headers added.
    pub async fn forward(&self, request: Request, extra: HeaderMap) -> Result<Response, AppError> {
        let (parts, body) = request.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{path_and_query}", self.base_url);

        let body = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|_| AppError::validation("Request body too large"))?;

        let mut headers = strip_hop_by_hop(parts.headers);
        if let Some(host) = headers.remove(header::HOST) {
            headers.insert(FORWARDED_HOST, host);
        }
        headers.remove(header::CONTENT_LENGTH);
        headers.extend(extra);

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Frontend request failed");
                AppError::with_source(ErrorKind::ServiceUnavailable, "Frontend unavailable", e)
            })?;

        let status = upstream.status();
        let mut response_headers = strip_hop_by_hop(upstream.headers().clone());
        response_headers.remove(header::CONTENT_LENGTH);
        let bytes = upstream.bytes().await.map_err(|e| {
            AppError::with_source(ErrorKind::ServiceUnavailable, "Frontend response interrupted", e)
        })?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}

/// A single header map entry, for building `extra` headers.
pub fn header_pair(name: &'static str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    HeaderValue::from_str(value)
        .ok()
        .map(|v| (HeaderName::from_static(name), v))
}
