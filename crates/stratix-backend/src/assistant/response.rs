//! Enrichment of edge function results and the two reply formats.

use serde_json::{Map, Value, json};

use super::error::AssistantError;
use super::request::{AssistantAction, AssistantRequest};

/// Webhook text used when the result carries no summary.
const DEFAULT_WEBHOOK_TEXT: &str = "Datos obtenidos correctamente de Stratix.";

/// Adds deep links and a Spanish `resumen` to a successful result.
///
/// Only non-empty objects are enriched. Links are omitted when no
/// platform URL is configured.
pub fn enrich(action: AssistantAction, data: &mut Value, platform_url: Option<&str>) {
    let Some(object) = data.as_object_mut().filter(|o| !o.is_empty()) else {
        return;
    };
    let platform_url = platform_url.map(|u| u.trim_end_matches('/'));

    match action {
        AssistantAction::InitiativeStatus => {
            if let (Some(base), Some(id)) = (platform_url, truthy(object, "id")) {
                object.insert("link".into(), format!("{base}/initiatives/{id}").into());
            }
            let resumen = format!(
                "La iniciativa '{}' tiene un progreso del {}% y está en estado '{}'.",
                text(object.get("title"), ""),
                text(object.get("progress"), "0"),
                text(object.get("status"), ""),
            );
            object.insert("resumen".into(), resumen.into());
        }
        AssistantAction::AreaKpis => {
            if let (Some(base), Some(area_id)) = (platform_url, truthy(object, "area_id")) {
                object.insert("link".into(), format!("{base}/areas/{area_id}").into());
            }
            let resumen = format!(
                "El área '{}' tiene {} iniciativas con un progreso promedio del {}%.",
                text(object.get("area_name"), ""),
                text(object.get("total_initiatives"), "0"),
                text(object.get("avg_progress"), "0"),
            );
            object.insert("resumen".into(), resumen.into());
        }
        AssistantAction::CompanyOverview => {
            let metrics = object.get("company_metrics");
            let metric = |key: &str| text(metrics.and_then(|m| m.get(key)), "0");
            let resumen = format!(
                "La empresa tiene {} iniciativas, {} completadas y un progreso general del {}%.",
                metric("total_initiatives"),
                metric("completed_initiatives"),
                metric("overall_progress"),
            );
            object.insert("resumen".into(), resumen.into());
            if let Some(base) = platform_url {
                object.insert("link".into(), format!("{base}/dashboard").into());
            }
        }
        AssistantAction::UserInitiatives
        | AssistantAction::SearchInitiatives
        | AssistantAction::InitiativeSuggestions => {}
    }
}

/// Renders the reply in the caller's format.
pub fn format_reply(request: &AssistantRequest, outcome: &Result<Value, AssistantError>) -> Value {
    if request.is_webhook() {
        let message = match outcome {
            Ok(data) => data
                .get("resumen")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_WEBHOOK_TEXT)
                .to_string(),
            Err(err) => format!("Lo siento, hubo un error: {err}"),
        };
        webhook_message(&message)
    } else {
        let output = match outcome {
            Ok(data) => data.clone(),
            Err(err) => json!({ "error": err.to_string() }),
        };
        json!({
            "tool_output": [
                { "tool": request.tool(), "output": output }
            ]
        })
    }
}

/// A conversational-agent fulfillment with a single text message.
pub fn webhook_message(message: &str) -> Value {
    json!({
        "fulfillmentResponse": {
            "messages": [
                { "text": { "text": [message] } }
            ]
        }
    })
}

/// The value under `key` rendered as text, if it is present and non-empty.
fn truthy(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        value => Some(text(Some(value), "")),
    }
}

fn text(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
