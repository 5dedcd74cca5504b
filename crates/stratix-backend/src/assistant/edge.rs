//! Client for the edge function that executes assistant actions.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::error::AssistantError;
use super::request::ActionPlan;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Body posted to the edge function.
#[derive(Debug, Serialize)]
struct EdgePayload<'a> {
    action: &'a str,
    params: &'a serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_token: Option<&'a str>,
}

/// Envelope returned by the edge function.
#[derive(Debug, Deserialize)]
struct EdgeEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Posts action plans to the edge function.
#[derive(Debug, Clone)]
pub struct EdgeFunctionClient {
    url: String,
    anon_key: String,
    client: Client,
}

impl EdgeFunctionClient {
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| AssistantError::Internal(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            anon_key: anon_key.into(),
            client,
        })
    }

    /// Executes `plan` and returns the `data` member of a successful answer.
    pub async fn call(
        &self,
        plan: &ActionPlan,
        user_token: Option<&str>,
    ) -> Result<serde_json::Value, AssistantError> {
        let payload = EdgePayload {
            action: plan.action.as_str(),
            params: &plan.params,
            user_token,
        };

        tracing::debug!(action = plan.action.as_str(), "Calling assistant edge function");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.anon_key)
            .header("apikey", &self.anon_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = response
            .json::<EdgeEnvelope>()
            .await
            .map_err(|e| AssistantError::Internal(format!("unreadable edge response: {e}")))?;

        if envelope.success {
            Ok(envelope
                .data
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())))
        } else {
            Err(AssistantError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "Unknown error from assistant backend".to_string()),
            ))
        }
    }
}
