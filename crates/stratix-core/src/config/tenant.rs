//! Static tenant table configuration.

use serde::{Deserialize, Serialize};

/// Tenant table loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantsConfig {
    /// Id of the tenant used when a lookup misses. Falls back to the
    /// built-in default tenant when unset or unknown.
    #[serde(default)]
    pub default_id: Option<String>,
    /// Tenant entries. The built-in table is used when empty.
    #[serde(default)]
    pub entries: Vec<TenantEntry>,
}

/// One row of the tenant table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantEntry {
    /// Opaque tenant identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Host name the tenant is served under, if any.
    #[serde(default)]
    pub domain: Option<String>,
    /// Theme overrides.
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Theme colors and assets. Unset fields use the default palette.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub accent: Option<String>,
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub font_family: Option<String>,
    pub logo_url: Option<String>,
}
