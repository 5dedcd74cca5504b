//! Tenant table and lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stratix_core::config::{TenantEntry, TenantsConfig};

use crate::theme::Theme;

/// Id of the built-in default tenant.
pub const DEFAULT_TENANT_ID: &str = "stratix";

/// Display and theming information for one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDescriptor {
    /// Opaque tenant identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Host name the tenant is served under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Visual theme.
    pub theme: Theme,
}

impl TenantDescriptor {
    fn from_entry(entry: &TenantEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            domain: entry.domain.as_ref().map(|d| d.to_ascii_lowercase()),
            theme: Theme::from_config(&entry.theme),
        }
    }
}

/// Read-only tenant table with a guaranteed default.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    tenants: HashMap<String, TenantDescriptor>,
    default_id: String,
}

impl TenantRegistry {
    /// Builds the registry from configuration, falling back to the built-in
    /// table when no entries are configured.
    pub fn from_config(config: &TenantsConfig) -> Self {
        let descriptors: Vec<TenantDescriptor> = if config.entries.is_empty() {
            builtin_tenants()
        } else {
            config.entries.iter().map(TenantDescriptor::from_entry).collect()
        };

        let mut tenants: HashMap<String, TenantDescriptor> = descriptors
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        let default_id = match &config.default_id {
            Some(id) if tenants.contains_key(id) => id.clone(),
            Some(id) => {
                tracing::warn!(
                    tenant_id = %id,
                    "Configured default tenant not in table, using built-in default"
                );
                DEFAULT_TENANT_ID.to_string()
            }
            None => DEFAULT_TENANT_ID.to_string(),
        };

        if !tenants.contains_key(&default_id) {
            let fallback = default_tenant();
            tenants.insert(fallback.id.clone(), fallback);
        }

        tracing::info!(
            tenants = tenants.len(),
            default_tenant = %default_id,
            "Tenant registry initialized"
        );

        Self {
            tenants,
            default_id,
        }
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        Self::from_config(&TenantsConfig::default())
    }

    /// Resolves a tenant id; unknown or absent ids yield the default tenant.
    pub fn resolve(&self, tenant_id: Option<&str>) -> &TenantDescriptor {
        tenant_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .and_then(|id| self.tenants.get(id))
            .unwrap_or_else(|| self.default_tenant())
    }

    /// Resolves a tenant from a request host (`Host` header, port allowed).
    ///
    /// Matches a configured domain exactly, then the left-most label
    /// against tenant ids (`siga.example.com` -> `siga`).
    pub fn resolve_by_domain(&self, host: Option<&str>) -> &TenantDescriptor {
        let Some(host) = host else {
            return self.default_tenant();
        };
        let host = host
            .rsplit_once(':')
            .map_or(host, |(name, _port)| name)
            .trim()
            .to_ascii_lowercase();

        if let Some(tenant) = self
            .tenants
            .values()
            .find(|t| t.domain.as_deref() == Some(host.as_str()))
        {
            return tenant;
        }

        let label = host.split('.').next();
        self.resolve(label)
    }

    /// The fallback tenant.
    pub fn default_tenant(&self) -> &TenantDescriptor {
        &self.tenants[&self.default_id]
    }

    /// Ids of every tenant in the table.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tenants.keys().map(String::as_str)
    }

    /// Whether `tenant_id` names a known tenant.
    pub fn contains(&self, tenant_id: &str) -> bool {
        self.tenants.contains_key(tenant_id)
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

fn default_tenant() -> TenantDescriptor {
    TenantDescriptor {
        id: DEFAULT_TENANT_ID.to_string(),
        name: "Stratix Platform".to_string(),
        domain: Some("stratix-platform.vercel.app".to_string()),
        theme: Theme::default(),
    }
}

fn builtin_tenants() -> Vec<TenantDescriptor> {
    vec![
        default_tenant(),
        TenantDescriptor {
            id: "fema".to_string(),
            name: "FEMA Electricidad".to_string(),
            domain: None,
            theme: Theme {
                primary: "#00539f".to_string(),
                secondary: "#ffc72c".to_string(),
                accent: "#f0f4f8".to_string(),
                ..Theme::default()
            },
        },
        TenantDescriptor {
            id: "siga".to_string(),
            name: "SIGA Turismo".to_string(),
            domain: None,
            theme: Theme {
                primary: "#00a651".to_string(),
                secondary: "#fddc02".to_string(),
                accent: "#f5f5f5".to_string(),
                ..Theme::default()
            },
        },
    ]
}
