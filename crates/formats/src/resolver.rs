//! Three-tier format resolution.
//!
//! A format identifier is looked up across three scopes: product-level
//! override, tenant-level custom definition, global standard registry.
//! The highest scope that matches wins, but each layer may be partial:
//! placement configuration and requirements are deep-merged over the
//! lower layers, higher layer winning on key conflict. A tenant can
//! therefore override only the ad-server template identifier while
//! inheriting standard dimension requirements.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use adcp_core::types::{FormatDefinition, FormatLayer, ResolutionScope};

use crate::store::FormatStore;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// Every scope was searched and none matched.
    #[error("unknown format '{format_id}' (searched {searched_scopes:?})")]
    UnknownFormat {
        format_id: String,
        searched_scopes: Vec<ResolutionScope>,
    },

    /// Layers matched but never produced a media kind. Registry data is
    /// corrupt; this aborts the request rather than becoming a domain
    /// error.
    #[error("format '{format_id}' resolves to an incomplete definition: {detail}")]
    Incomplete { format_id: String, detail: String },
}

/// A resolved definition plus the scope that supplied the winning layer.
#[derive(Debug, Clone)]
pub struct ResolvedFormat {
    pub definition: FormatDefinition,
    pub source_scope: ResolutionScope,
}

/// Resolve `format_id` through the override chain. Pure lookup: identical
/// inputs always yield identical output.
pub fn resolve(
    store: &dyn FormatStore,
    format_id: &str,
    tenant_id: Option<&str>,
    product_id: Option<&str>,
) -> Result<ResolvedFormat, ResolutionError> {
    // Gather matching layers lowest scope first so higher scopes merge
    // over them.
    let mut layers: Vec<(ResolutionScope, FormatLayer)> = Vec::new();
    let mut searched_scopes = Vec::new();

    if let Some(product) = product_id {
        searched_scopes.push(ResolutionScope::Product);
        if let Some(layer) = store.product_override(product, format_id) {
            layers.push((ResolutionScope::Product, layer));
        }
    }
    if let Some(tenant) = tenant_id {
        searched_scopes.push(ResolutionScope::Tenant);
        if let Some(layer) = store.tenant_custom(tenant, format_id) {
            layers.push((ResolutionScope::Tenant, layer));
        }
    }
    searched_scopes.push(ResolutionScope::Global);
    if let Some(layer) = store.standard(format_id) {
        layers.push((ResolutionScope::Global, layer));
    }

    if layers.is_empty() {
        return Err(ResolutionError::UnknownFormat {
            format_id: format_id.to_string(),
            searched_scopes,
        });
    }

    // The first gathered layer is the winner for provenance; merging runs
    // global-first so that winner's keys land on top.
    let source_scope = layers[0].0;

    let mut media_kind = None;
    let mut requirements = Default::default();
    let mut placement = Map::new();
    for (_, layer) in layers.iter().rev() {
        media_kind = layer.media_kind.or(media_kind);
        requirements = layer.requirements.merged_over(&requirements);
        deep_merge(&mut placement, &layer.placement);
    }

    let media_kind = media_kind.ok_or_else(|| ResolutionError::Incomplete {
        format_id: format_id.to_string(),
        detail: "no layer declares a media kind".to_string(),
    })?;

    debug!(format_id, scope = ?source_scope, "format resolved");

    Ok(ResolvedFormat {
        definition: FormatDefinition {
            format_id: format_id.to_string(),
            media_kind,
            requirements,
            placement,
        },
        source_scope,
    })
}

/// Recursively merge `overlay` into `base`: object values merge key by
/// key, anything else replaces.
fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, overlay_value) in overlay {
        match (base.get_mut(key), overlay_value) {
            (Some(Value::Object(base_obj)), Value::Object(overlay_obj)) => {
                deep_merge(base_obj, overlay_obj);
            }
            _ => {
                base.insert(key.clone(), overlay_value.clone());
            }
        }
    }
}
