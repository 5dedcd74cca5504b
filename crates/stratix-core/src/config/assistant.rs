//! Conversational assistant configuration.

use serde::{Deserialize, Serialize};

/// Assistant webhook configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Backend edge function that answers assistant actions.
    /// The webhook answers with an error payload when unset.
    #[serde(default)]
    pub edge_function_url: Option<String>,
    /// Public platform URL used to build deep links in answers.
    #[serde(default)]
    pub platform_url: Option<String>,
    /// Shared secret expected in the `x-assistant-key` header.
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// Edge function request timeout in milliseconds.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}
