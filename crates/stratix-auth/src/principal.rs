//! The verified identity produced by session verification.

use serde::{Deserialize, Serialize};

/// Response header carrying the verified user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Response header carrying the verified user email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// A verified user, valid for the lifetime of one request only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Identity provider user id.
    pub user_id: String,
    /// Primary email address.
    pub email: String,
    /// Whether the provider confirmed the email address.
    pub verified: bool,
    /// Tenant assigned by the provider's server-controlled metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Principal {
    /// Creates a principal without tenant assignment.
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, verified: bool) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            verified,
            tenant_id: None,
        }
    }

    /// Sets the tenant assignment.
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}
