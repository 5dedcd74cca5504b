//! Conversational assistant webhook.
//!
//! Requests arrive either as conversational-agent webhooks or as generative
//! tool calls. Both are mapped to an edge function action; the result is
//! enriched with deep links and a Spanish summary and answered in the
//! caller's format.

pub mod edge;
pub mod error;
pub mod extract;
pub mod request;
pub mod response;

use std::time::Duration;

use serde_json::Value;

use stratix_core::config::AssistantConfig;

pub use edge::EdgeFunctionClient;
pub use error::AssistantError;
pub use extract::NameExtractor;
pub use request::{ActionPlan, AssistantAction, AssistantRequest};

/// Reply to an assistant request.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    /// HTTP status to answer with.
    pub status: u16,
    pub body: Value,
}

/// Answers assistant requests.
#[derive(Debug, Clone)]
pub struct AssistantService {
    names: NameExtractor,
    edge: Option<EdgeFunctionClient>,
    platform_url: Option<String>,
}

impl AssistantService {
    /// Builds the service. Without an edge function URL every action is
    /// answered with a "not configured" error.
    pub fn from_config(config: &AssistantConfig, anon_key: &str) -> Result<Self, AssistantError> {
        let edge = match config.edge_function_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => Some(EdgeFunctionClient::new(
                url,
                anon_key,
                config.request_timeout_ms.map(Duration::from_millis),
            )?),
            None => None,
        };

        Ok(Self {
            names: NameExtractor::new().map_err(|e| AssistantError::Internal(e.to_string()))?,
            edge,
            platform_url: config.platform_url.clone().filter(|u| !u.is_empty()),
        })
    }

    /// Handles one request body.
    pub async fn handle(&self, body: &Value) -> AssistantReply {
        let request = match AssistantRequest::parse(body) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "Rejected assistant request");
                return AssistantReply {
                    status: 400,
                    body: response::webhook_message(&format!("Error: {err}")),
                };
            }
        };

        let outcome = self.execute(&request).await;
        match &outcome {
            Ok(_) => tracing::info!(
                webhook = request.is_webhook(),
                tool = request.tool_name(),
                "Assistant request answered"
            ),
            Err(err) => tracing::warn!(
                webhook = request.is_webhook(),
                tool = request.tool_name(),
                error = %err,
                "Assistant request failed"
            ),
        }

        AssistantReply {
            status: 200,
            body: response::format_reply(&request, &outcome),
        }
    }

    async fn execute(&self, request: &AssistantRequest) -> Result<Value, AssistantError> {
        let plan = request.plan(&self.names)?;
        tracing::debug!(action = plan.action.as_str(), "Mapped assistant request");

        let edge = self.edge.as_ref().ok_or(AssistantError::NotConfigured)?;
        let mut data = edge.call(&plan, request.user_token()).await?;
        response::enrich(plan.action, &mut data, self.platform_url.as_deref());
        Ok(data)
    }
}
