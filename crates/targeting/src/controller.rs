//! Two-phase targeting overlay application.
//!
//! Phase one rejects any external overlay that touches a managed-only
//! dimension, before anything is merged. Phase two merges the
//! operator-injected managed signals over the surviving baseline. A
//! managed-only value can therefore never originate from an external
//! caller, not even transiently.

use thiserror::Error;
use tracing::warn;

use adcp_core::result::DomainError;
use adcp_core::types::{AccessClass, TargetingOverlay};

use crate::classification::ClassificationTable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessViolation {
    #[error("targeting dimension '{dimension}' is managed-only and cannot be set by callers")]
    ManagedOnly { dimension: String },

    #[error("unknown targeting dimension '{dimension}'")]
    UnknownDimension { dimension: String },
}

impl From<AccessViolation> for DomainError {
    fn from(violation: AccessViolation) -> Self {
        match violation {
            AccessViolation::ManagedOnly { dimension } => {
                DomainError::ManagedOnlyViolation { dimension }
            }
            AccessViolation::UnknownDimension { dimension } => {
                DomainError::UnknownDimension { dimension }
            }
        }
    }
}

/// Apply an externally-submitted overlay and merge in managed signals
/// from the trusted internal path.
///
/// Violations short-circuit on the first offending dimension in table
/// declaration order, so error messages are reproducible regardless of
/// how the caller's map iterates. `managed_signals` must only carry
/// managed-only and hybrid dimensions; the trusted path constructs it,
/// never request input.
pub fn apply(
    table: &ClassificationTable,
    external_overlay: &TargetingOverlay,
    managed_signals: &TargetingOverlay,
) -> Result<TargetingOverlay, AccessViolation> {
    // Phase one: reject before anything merges.
    for dim in table.dimensions() {
        if dim.class == AccessClass::ManagedOnly && external_overlay.contains_key(&dim.name) {
            warn!(dimension = %dim.name, "rejected managed-only dimension from external caller");
            return Err(AccessViolation::ManagedOnly {
                dimension: dim.name.clone(),
            });
        }
    }
    for dimension in external_overlay.keys() {
        if table.class_of(dimension).is_none() {
            return Err(AccessViolation::UnknownDimension {
                dimension: dimension.clone(),
            });
        }
    }

    // Phase two: baseline from the caller, managed signals on top.
    let mut effective: TargetingOverlay = external_overlay.clone();
    for (dimension, value) in managed_signals {
        debug_assert_ne!(
            table.class_of(dimension),
            Some(AccessClass::Overlay),
            "trusted path supplied an overlay-only dimension: {dimension}"
        );
        effective.insert(dimension.clone(), value.clone());
    }

    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcp_core::config::TargetingConfig;
    use serde_json::json;

    fn table() -> ClassificationTable {
        ClassificationTable::from_config(&TargetingConfig::default()).unwrap()
    }

    fn overlay(entries: &[(&str, serde_json::Value)]) -> TargetingOverlay {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_overlay_dimensions_pass_through() {
        let external = overlay(&[
            ("geo_country_any_of", json!(["US", "CA"])),
            ("device_type_any_of", json!(["mobile"])),
        ]);
        let effective = apply(&table(), &external, &TargetingOverlay::new()).unwrap();
        assert_eq!(effective, external);
    }

    #[test]
    fn test_managed_only_dimension_rejected_outright() {
        let external = overlay(&[
            ("geo_country_any_of", json!(["US"])),
            ("key_value_pairs", json!({"aee": "1"})),
        ]);
        let err = apply(&table(), &external, &TargetingOverlay::new()).unwrap_err();
        assert_eq!(
            err,
            AccessViolation::ManagedOnly {
                dimension: "key_value_pairs".into()
            }
        );
    }

    #[test]
    fn test_violation_order_follows_declaration_not_map_order() {
        // BTreeMap iterates "aee_signals" before "key_value_pairs", but the
        // table declares key_value_pairs first.
        let external = overlay(&[
            ("aee_signals", json!(["sig-1"])),
            ("key_value_pairs", json!({"k": "v"})),
        ]);
        let err = apply(&table(), &external, &TargetingOverlay::new()).unwrap_err();
        assert_eq!(
            err,
            AccessViolation::ManagedOnly {
                dimension: "key_value_pairs".into()
            }
        );
    }

    #[test]
    fn test_unknown_dimension_rejected() {
        let external = overlay(&[("astrological_sign_any_of", json!(["aries"]))]);
        let err = apply(&table(), &external, &TargetingOverlay::new()).unwrap_err();
        assert_eq!(
            err,
            AccessViolation::UnknownDimension {
                dimension: "astrological_sign_any_of".into()
            }
        );
    }

    #[test]
    fn test_managed_signal_replaces_hybrid_baseline() {
        let external = overlay(&[("signals", json!(["caller_signal"]))]);
        let managed = overlay(&[("signals", json!(["operator_signal"]))]);
        let effective = apply(&table(), &external, &managed).unwrap();
        assert_eq!(effective["signals"], json!(["operator_signal"]));
    }

    #[test]
    fn test_managed_only_signal_injected_by_trusted_path() {
        let external = overlay(&[("geo_country_any_of", json!(["US"]))]);
        let managed = overlay(&[("key_value_pairs", json!({"aee_segment": "seg-42"}))]);
        let effective = apply(&table(), &external, &managed).unwrap();
        assert_eq!(effective["geo_country_any_of"], json!(["US"]));
        assert_eq!(effective["key_value_pairs"], json!({"aee_segment": "seg-42"}));
    }

    #[test]
    fn test_no_partial_merge_on_violation() {
        let external = overlay(&[
            ("geo_country_any_of", json!(["US"])),
            ("key_value_pairs", json!({"k": "v"})),
        ]);
        let managed = overlay(&[("aee_signals", json!(["sig"]))]);
        // The violation surfaces before the managed merge ever runs.
        assert!(apply(&table(), &external, &managed).is_err());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let external = overlay(&[
            ("geo_country_any_of", json!(["US"])),
            ("signals", json!(["s1"])),
        ]);
        let managed = overlay(&[("signals", json!(["s2"]))]);
        let first = apply(&table(), &external, &managed).unwrap();
        let second = apply(&table(), &external, &managed).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
