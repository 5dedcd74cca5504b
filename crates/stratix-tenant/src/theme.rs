//! Tenant themes and the shared presentation context they are applied to.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use stratix_core::config::ThemeConfig;

use crate::registry::{TenantDescriptor, TenantRegistry};

/// Visual theme of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub foreground: String,
    pub font_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: "#6366f1".to_string(),
            secondary: "#ec4899".to_string(),
            accent: "#f59e0b".to_string(),
            background: "#ffffff".to_string(),
            foreground: "#0f172a".to_string(),
            font_family: "Inter, system-ui, sans-serif".to_string(),
            logo_url: None,
        }
    }
}

impl Theme {
    /// Builds a theme from configuration, filling unset fields from the
    /// default palette.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();
        Self {
            primary: config.primary.clone().unwrap_or(base.primary),
            secondary: config.secondary.clone().unwrap_or(base.secondary),
            accent: config.accent.clone().unwrap_or(base.accent),
            background: config.background.clone().unwrap_or(base.background),
            foreground: config.foreground.clone().unwrap_or(base.foreground),
            font_family: config.font_family.clone().unwrap_or(base.font_family),
            logo_url: config.logo_url.clone(),
        }
    }

    /// CSS custom properties for this theme, keyed by variable name.
    pub fn css_variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("--tenant-primary".to_string(), self.primary.clone());
        vars.insert("--tenant-secondary".to_string(), self.secondary.clone());
        vars.insert("--tenant-accent".to_string(), self.accent.clone());
        vars.insert("--tenant-background".to_string(), self.background.clone());
        vars.insert("--tenant-foreground".to_string(), self.foreground.clone());
        vars.insert("--tenant-font-family".to_string(), self.font_family.clone());
        if let Some(logo) = &self.logo_url {
            vars.insert("--tenant-logo-url".to_string(), format!("url(\"{logo}\")"));
        }
        vars
    }
}

/// Snapshot of the presentation context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresentationState {
    /// Value of the `data-tenant` attribute.
    pub tenant: Option<String>,
    /// CSS custom properties currently applied.
    pub variables: BTreeMap<String, String>,
}

/// Long-lived presentation state shared by the process.
///
/// Written only through [`ThemeApplier`].
#[derive(Debug, Default)]
pub struct PresentationContext {
    state: RwLock<PresentationState>,
}

impl PresentationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> PresentationState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Currently applied tenant id.
    pub fn tenant(&self) -> Option<String> {
        self.snapshot().tenant
    }

    /// Renders the applied variables as a `:root` stylesheet.
    pub fn to_stylesheet(&self) -> String {
        let state = self.snapshot();
        let mut css = String::new();
        match &state.tenant {
            Some(tenant) => {
                let _ = writeln!(css, ":root[data-tenant=\"{tenant}\"], :root {{");
            }
            None => css.push_str(":root {\n"),
        }
        for (name, value) in &state.variables {
            let _ = writeln!(css, "  {name}: {value};");
        }
        css.push_str("}\n");
        css
    }

    fn replace(&self, next: PresentationState) -> bool {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *guard == next {
            return false;
        }
        *guard = next;
        true
    }
}

/// Writes tenant themes into a [`PresentationContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThemeApplier;

impl ThemeApplier {
    /// Applies `tenant`'s theme, replacing every variable and the tenant
    /// attribute. Applying the same tenant again leaves the state unchanged.
    pub fn apply(context: &PresentationContext, tenant: &TenantDescriptor) {
        let next = PresentationState {
            tenant: Some(tenant.id.clone()),
            variables: tenant.theme.css_variables(),
        };

        if context.replace(next) {
            tracing::debug!(tenant_id = %tenant.id, "Applied tenant theme");
        }
    }
}

/// One long-lived [`PresentationContext`] per tenant in the registry.
///
/// Contexts are independent: applying one tenant's theme never changes
/// another tenant's context.
#[derive(Debug, Default)]
pub struct PresentationContexts {
    contexts: HashMap<String, PresentationContext>,
    default_id: String,
}

impl PresentationContexts {
    /// Creates an empty context for every tenant in `registry`.
    pub fn for_registry(registry: &TenantRegistry) -> Self {
        Self {
            contexts: registry
                .ids()
                .map(|id| (id.to_string(), PresentationContext::new()))
                .collect(),
            default_id: registry.default_tenant().id.clone(),
        }
    }

    /// Context for `tenant_id`, or the default tenant's context.
    pub fn get(&self, tenant_id: &str) -> Option<&PresentationContext> {
        self.contexts
            .get(tenant_id)
            .or_else(|| self.contexts.get(&self.default_id))
    }

    /// Applies `tenant` to its context and renders the stylesheet.
    pub fn stylesheet_for(&self, tenant: &TenantDescriptor) -> Option<String> {
        let context = self.get(&tenant.id)?;
        ThemeApplier::apply(context, tenant);
        Some(context.to_stylesheet())
    }
}
