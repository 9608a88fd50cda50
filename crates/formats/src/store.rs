//! Format storage collaborator. The broker never mutates these maps; they
//! are maintained by the surrounding platform and read concurrently from
//! request-handling tasks.

use dashmap::DashMap;

use adcp_core::types::FormatLayer;

use crate::registry::standard_formats;

/// Lookup surface for the three resolution scopes. Each scope returns a
/// partial-or-full `FormatLayer`, or `None` when the scope has no entry.
pub trait FormatStore: Send + Sync {
    fn product_override(&self, product_id: &str, format_id: &str) -> Option<FormatLayer>;
    fn tenant_custom(&self, tenant_id: &str, format_id: &str) -> Option<FormatLayer>;
    fn standard(&self, format_id: &str) -> Option<FormatLayer>;
}

/// In-memory store: the immutable standard registry plus concurrent maps
/// for tenant and product entries.
pub struct InMemoryFormatStore {
    standard: DashMap<String, FormatLayer>,
    tenant: DashMap<(String, String), FormatLayer>,
    product: DashMap<(String, String), FormatLayer>,
}

impl InMemoryFormatStore {
    /// Store preloaded with the standard format registry.
    pub fn with_standard_registry() -> Self {
        let store = Self::empty();
        for (format_id, layer) in standard_formats() {
            store.standard.insert(format_id, layer);
        }
        store
    }

    pub fn empty() -> Self {
        Self {
            standard: DashMap::new(),
            tenant: DashMap::new(),
            product: DashMap::new(),
        }
    }

    pub fn insert_standard(&self, format_id: impl Into<String>, layer: FormatLayer) {
        self.standard.insert(format_id.into(), layer);
    }

    pub fn insert_tenant_custom(
        &self,
        tenant_id: impl Into<String>,
        format_id: impl Into<String>,
        layer: FormatLayer,
    ) {
        self.tenant.insert((tenant_id.into(), format_id.into()), layer);
    }

    pub fn insert_product_override(
        &self,
        product_id: impl Into<String>,
        format_id: impl Into<String>,
        layer: FormatLayer,
    ) {
        self.product.insert((product_id.into(), format_id.into()), layer);
    }
}

impl FormatStore for InMemoryFormatStore {
    fn product_override(&self, product_id: &str, format_id: &str) -> Option<FormatLayer> {
        self.product
            .get(&(product_id.to_string(), format_id.to_string()))
            .map(|entry| entry.clone())
    }

    fn tenant_custom(&self, tenant_id: &str, format_id: &str) -> Option<FormatLayer> {
        self.tenant
            .get(&(tenant_id.to_string(), format_id.to_string()))
            .map(|entry| entry.clone())
    }

    fn standard(&self, format_id: &str) -> Option<FormatLayer> {
        self.standard.get(format_id).map(|entry| entry.clone())
    }
}
