//! # stratix-tenant
//!
//! Tenant resolution and theming.
//!
//! The tenant table is built once at startup and never mutated. Lookups
//! always succeed: unknown ids fall back to the default tenant.

pub mod registry;
pub mod theme;

pub use registry::{TenantDescriptor, TenantRegistry};
pub use theme::{
    PresentationContext, PresentationContexts, PresentationState, Theme, ThemeApplier,
};
