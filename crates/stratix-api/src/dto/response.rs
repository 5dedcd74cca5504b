//! Response DTOs.

use serde::{Deserialize, Serialize};

use stratix_auth::Principal;
use stratix_tenant::{TenantDescriptor, Theme};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Deployment environment.
    pub environment: String,
    /// Seconds since the process started.
    pub uptime_seconds: u64,
}

/// Public, display-only view of a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingResponse {
    pub id: String,
    pub name: String,
    pub theme: Theme,
}

impl From<&TenantDescriptor> for BrandingResponse {
    fn from(tenant: &TenantDescriptor) -> Self {
        Self {
            id: tenant.id.clone(),
            name: tenant.name.clone(),
            theme: tenant.theme.clone(),
        }
    }
}

/// The caller's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub verified: bool,
    /// Tenant resolved from the verified principal.
    pub tenant: BrandingResponse,
}

impl MeResponse {
    pub fn new(principal: &Principal, tenant: &TenantDescriptor) -> Self {
        Self {
            user_id: principal.user_id.clone(),
            email: principal.email.clone(),
            verified: principal.verified,
            tenant: tenant.into(),
        }
    }
}
