//! Inbound assistant requests and the action they map to.

use serde_json::{Map, Value};

use super::error::AssistantError;
use super::extract::NameExtractor;

type Params = Map<String, Value>;

/// Default page size for a user's initiatives.
const USER_INITIATIVES_LIMIT: u64 = 10;
/// Default page size for initiative search.
const SEARCH_LIMIT: u64 = 20;

/// Action understood by the edge function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantAction {
    CompanyOverview,
    InitiativeStatus,
    AreaKpis,
    UserInitiatives,
    SearchInitiatives,
    InitiativeSuggestions,
}

impl AssistantAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyOverview => "get_company_overview",
            Self::InitiativeStatus => "get_initiative_status",
            Self::AreaKpis => "get_area_kpis",
            Self::UserInitiatives => "get_user_initiatives",
            Self::SearchInitiatives => "search_initiatives",
            Self::InitiativeSuggestions => "get_initiative_suggestions",
        }
    }
}

/// An action with the parameters to send along.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPlan {
    pub action: AssistantAction,
    pub params: Params,
}

impl ActionPlan {
    fn new(action: AssistantAction) -> Self {
        Self {
            action,
            params: Params::new(),
        }
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }
}

/// A parsed assistant request.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantRequest {
    /// Conversational agent webhook (`fulfillmentInfo` present).
    Webhook {
        tag: String,
        text: String,
        parameters: Params,
    },
    /// Generative agent tool call.
    Tool { tool: String, parameters: Params },
}

impl AssistantRequest {
    /// Parses a JSON body. Anything but a non-empty object is rejected.
    pub fn parse(body: &Value) -> Result<Self, AssistantError> {
        let object = match body.as_object() {
            Some(object) if !object.is_empty() => object,
            _ => return Err(AssistantError::EmptyRequest),
        };

        if let Some(fulfillment) = object.get("fulfillmentInfo") {
            let tag = fulfillment
                .get("tag")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let parameters = object
                .get("sessionInfo")
                .and_then(|s| s.get("parameters"))
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let text = object
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Ok(Self::Webhook {
                tag,
                text,
                parameters,
            });
        }

        let tool = object
            .get("tool")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let parameters = object
            .get("tool_parameters")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(Self::Tool { tool, parameters })
    }

    pub fn is_webhook(&self) -> bool {
        matches!(self, Self::Webhook { .. })
    }

    /// Full tool resource name as sent by the caller (empty for webhooks).
    pub fn tool(&self) -> &str {
        match self {
            Self::Webhook { .. } => "",
            Self::Tool { tool, .. } => tool,
        }
    }

    /// Last path segment of the tool resource name.
    pub fn tool_name(&self) -> &str {
        match self.tool().rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "unknown",
        }
    }

    /// End-user token to forward to the edge function, if provided.
    pub fn user_token(&self) -> Option<&str> {
        let params = match self {
            Self::Webhook { parameters, .. } | Self::Tool { parameters, .. } => parameters,
        };
        params.get("user_token").and_then(Value::as_str)
    }

    /// Maps the request to an action.
    pub fn plan(&self, names: &NameExtractor) -> Result<ActionPlan, AssistantError> {
        match self {
            Self::Webhook { tag, text, .. } => plan_webhook(tag, text, names),
            Self::Tool { parameters, .. } => plan_tool(parameters),
        }
    }
}

fn plan_webhook(tag: &str, text: &str, names: &NameExtractor) -> Result<ActionPlan, AssistantError> {
    match tag {
        "company_overview" => Ok(ActionPlan::new(AssistantAction::CompanyOverview)),
        "initiative_status" => {
            let plan = ActionPlan::new(AssistantAction::InitiativeStatus);
            Ok(match names.initiative_name(text) {
                Some(name) => plan.with("nombre_iniciativa", Value::String(name)),
                None => plan,
            })
        }
        "area_kpis" => {
            let plan = ActionPlan::new(AssistantAction::AreaKpis);
            Ok(match names.area_name(text) {
                Some(name) => plan.with("nombre_area", Value::String(name)),
                None => plan,
            })
        }
        other => Err(AssistantError::UnsupportedTag(other.to_string())),
    }
}

/// Tool parameters are checked in a fixed precedence; the first group
/// present selects the action. Absent members of a group are sent as null.
fn plan_tool(params: &Params) -> Result<ActionPlan, AssistantError> {
    let get = |key: &str| params.get(key).cloned().unwrap_or(Value::Null);
    let has = |key: &str| params.contains_key(key);
    let limit = |default: u64| params.get("limit").cloned().unwrap_or(Value::from(default));
    let action = params.get("action").and_then(Value::as_str);

    if has("nombre_iniciativa") || has("initiative_id") {
        return Ok(ActionPlan::new(AssistantAction::InitiativeStatus)
            .with("nombre_iniciativa", get("nombre_iniciativa"))
            .with("initiative_id", get("initiative_id")));
    }
    if has("nombre_area") || has("area_id") {
        return Ok(ActionPlan::new(AssistantAction::AreaKpis)
            .with("nombre_area", get("nombre_area"))
            .with("area_id", get("area_id")));
    }
    if has("user_id") {
        return Ok(ActionPlan::new(AssistantAction::UserInitiatives)
            .with("user_id", get("user_id"))
            .with("limit", limit(USER_INITIATIVES_LIMIT)));
    }
    if has("query") {
        return Ok(ActionPlan::new(AssistantAction::SearchInitiatives)
            .with("query", get("query"))
            .with("limit", limit(SEARCH_LIMIT)));
    }
    match action {
        Some("company_overview") => Ok(ActionPlan::new(AssistantAction::CompanyOverview)),
        Some("suggestions") => Ok(ActionPlan::new(AssistantAction::InitiativeSuggestions)
            .with("area_id", get("area_id"))
            .with("user_role", get("user_role"))),
        _ => Err(AssistantError::NoAction(Value::Object(params.clone()).to_string())),
    }
}
