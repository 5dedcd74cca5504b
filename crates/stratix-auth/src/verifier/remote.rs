//! Identity-provider-backed verification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use stratix_core::config::IdentityConfig;

use super::SessionVerifier;
use crate::credentials::{CredentialSource, PendingCookies, SessionCredentials, StoredSession};
use crate::error::AuthError;
use crate::principal::Principal;

/// User object returned by `GET /auth/v1/user`.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<String>,
    #[serde(default)]
    app_metadata: serde_json::Value,
}

impl ProviderUser {
    /// Tenant assignment is read from `app_metadata` only; `user_metadata`
    /// is writable by the user and never consulted.
    fn into_principal(self) -> Principal {
        let tenant_id = self
            .app_metadata
            .get("tenant_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Principal {
            user_id: self.id,
            email: self.email.unwrap_or_default(),
            verified: self.email_confirmed_at.is_some(),
            tenant_id,
        }
    }
}

/// Token grant returned by `POST /auth/v1/token?grant_type=refresh_token`.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Verifies sessions by asking the identity provider for the current user.
#[derive(Debug, Clone)]
pub struct RemoteSessionVerifier {
    /// Provider base URL (no trailing slash).
    base_url: String,
    /// Public API key.
    anon_key: String,
    /// Whether refreshed cookies are marked `Secure`.
    cookie_secure: bool,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl RemoteSessionVerifier {
    /// Creates a verifier from identity configuration.
    pub fn new(config: &IdentityConfig, request_timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(request_timeout)
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            cookie_secure: config.cookie_secure,
            client,
        })
    }

    async fn fetch_user(&self, access_token: &str) -> Result<ProviderUser, AuthError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            StatusCode::OK => response
                .json::<ProviderUser>()
                .await
                .map_err(|e| AuthError::MalformedResponse(e.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                if body.to_ascii_lowercase().contains("expired") {
                    Err(AuthError::Expired)
                } else {
                    Err(AuthError::InvalidCredentials("provider rejected token".to_string()))
                }
            }
            status => Err(AuthError::ProviderUnavailable(format!(
                "user lookup returned {status}"
            ))),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            StatusCode::OK => response
                .json::<TokenGrant>()
                .await
                .map_err(|e| AuthError::MalformedResponse(e.to_string())),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                AuthError::InvalidCredentials("refresh token rejected".to_string()),
            ),
            status => Err(AuthError::ProviderUnavailable(format!(
                "token refresh returned {status}"
            ))),
        }
    }

    async fn refresh_and_fetch(
        &self,
        credentials: &SessionCredentials,
        refresh_token: &str,
        pending: &mut PendingCookies,
    ) -> Result<Principal, AuthError> {
        let grant = self.refresh(refresh_token).await?;
        let session = StoredSession {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_at,
            token_type: grant.token_type,
        };
        pending.set_session(credentials.cookie_name(), &session, self.cookie_secure);
        pending.clear_chunks(credentials.cookie_name(), credentials.chunk_count());
        tracing::debug!("Session refreshed during verification");

        let user = self.fetch_user(&session.access_token).await?;
        Ok(user.into_principal())
    }
}

#[async_trait]
impl SessionVerifier for RemoteSessionVerifier {
    async fn verify(
        &self,
        credentials: &SessionCredentials,
        pending: &mut PendingCookies,
    ) -> Result<Principal, AuthError> {
        let access_token = credentials
            .access_token()
            .ok_or(AuthError::MissingCredentials)?;

        let err = match self.fetch_user(access_token).await {
            Ok(user) => return Ok(user.into_principal()),
            Err(err) => err,
        };

        if !err.is_rejection() {
            return Err(err);
        }

        let result = match credentials.refresh_token() {
            Some(refresh_token) => {
                self.refresh_and_fetch(credentials, refresh_token, pending)
                    .await
            }
            None => Err(err),
        };

        if let Err(err) = &result {
            if err.is_rejection() && credentials.source() == CredentialSource::Cookie {
                pending.clear_credentials(credentials);
            }
        }

        result
    }
}

fn map_transport_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::ProviderUnavailable(format!("identity provider timed out: {err}"))
    } else {
        AuthError::ProviderUnavailable(err.to_string())
    }
}
