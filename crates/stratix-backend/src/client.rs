//! Backend REST API client.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use stratix_core::config::BackendConfig;

use crate::error::DataFetchError;
use crate::models::{Area, Initiative, Listing, Objective, OrganizationSettings, Statistics};

/// Header carrying the caller's verified tenant to the backend.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Caller context forwarded on every backend call.
#[derive(Debug, Clone, Copy)]
pub struct CallerContext<'a> {
    /// The caller's access token, forwarded as a bearer token.
    pub access_token: &'a str,
    /// Tenant taken from the verified principal.
    pub tenant_id: Option<&'a str>,
}

/// Client for the backend REST API.
///
/// Built once at startup and shared; `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// Backend base URL (no trailing slash).
    base_url: String,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl BackendClient {
    /// Builds a client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, DataFetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| DataFetchError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_objectives(
        &self,
        caller: CallerContext<'_>,
    ) -> Result<Vec<Objective>, DataFetchError> {
        self.get_list("objectives", caller).await
    }

    pub async fn list_initiatives(
        &self,
        caller: CallerContext<'_>,
    ) -> Result<Vec<Initiative>, DataFetchError> {
        self.get_list("initiatives", caller).await
    }

    pub async fn list_areas(&self, caller: CallerContext<'_>) -> Result<Vec<Area>, DataFetchError> {
        self.get_list("areas", caller).await
    }

    pub async fn organization_settings(
        &self,
        caller: CallerContext<'_>,
    ) -> Result<OrganizationSettings, DataFetchError> {
        let request = self.request(Method::GET, "organization/settings", caller);
        read_json(send(request).await?).await
    }

    /// Applies a partial settings update and returns the stored document.
    pub async fn update_organization_settings(
        &self,
        caller: CallerContext<'_>,
        patch: &serde_json::Value,
    ) -> Result<OrganizationSettings, DataFetchError> {
        let request = self
            .request(Method::PATCH, "organization/settings", caller)
            .json(patch);
        read_json(send(request).await?).await
    }

    pub async fn statistics(&self, caller: CallerContext<'_>) -> Result<Statistics, DataFetchError> {
        let request = self.request(Method::GET, "statistics", caller);
        read_json(send(request).await?).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        caller: CallerContext<'_>,
    ) -> Result<Vec<T>, DataFetchError> {
        let request = self.request(Method::GET, resource, caller);
        let listing: Listing<T> = read_json(send(request).await?).await?;
        Ok(listing.into_vec())
    }

    fn request(&self, method: Method, resource: &str, caller: CallerContext<'_>) -> RequestBuilder {
        let url = format!("{}/{resource}", self.base_url);
        let mut builder = self
            .client
            .request(method, url)
            .bearer_auth(caller.access_token);
        if let Some(tenant) = caller.tenant_id {
            builder = builder.header(TENANT_HEADER, tenant);
        }
        builder
    }
}

async fn send(request: RequestBuilder) -> Result<Response, DataFetchError> {
    let response = request
        .send()
        .await
        .map_err(|e| DataFetchError::from_reqwest(&e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("backend request failed")
            .to_string()
    });
    tracing::warn!(status = status.as_u16(), error = %message, "Backend returned an error");
    Err(DataFetchError::status(status.as_u16(), message))
}

/// Decodes a 2xx body. A body that does not match the model keeps the
/// upstream status, so it surfaces as a bad gateway rather than an outage.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, DataFetchError> {
    let status = response.status().as_u16();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| DataFetchError::from_reqwest(&e))?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::warn!(status, error = %e, "Backend body did not match the expected shape");
        DataFetchError::status(status, format!("backend returned an unreadable body: {e}"))
    })
}

/// Pulls a human-readable message out of a backend error body.
fn error_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        error: Option<serde_json::Value>,
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(parsed) => parsed.message.or_else(|| match parsed.error {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => other
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            None => None,
        }),
        Err(_) => Some(trimmed.chars().take(200).collect()),
    }
}
