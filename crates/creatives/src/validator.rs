//! Placeholder slot matching.
//!
//! An asset is accepted as soon as it matches one slot of one assigned
//! package. Wildcard slots (1x1, with or without a bound native template)
//! are tried before exact sizing and accept any dimensions and any media
//! kind. A legitimate 1x1 tracking-pixel request therefore also matches a
//! wildcard slot; see `SlotKind` for the tagged variants kept to make
//! that behavior revisitable.

use tracing::debug;

use adcp_core::result::DomainError;
use adcp_core::types::{
    CreativeAsset, FormatRequirements, PackagePlaceholders, PlaceholderSlot, RequirementViolation,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted {
        package_id: String,
        slot: PlaceholderSlot,
    },
    Rejected {
        reason: DomainError,
        attempted: Vec<PlaceholderSlot>,
    },
}

/// Validate an asset against the slots of every package it is assigned
/// to. Rejections carry the full attempted slot list so the caller can
/// diagnose the mismatch without server-side log access.
pub fn validate(asset: &CreativeAsset, packages: &[PackagePlaceholders]) -> ValidationOutcome {
    let mut attempted: Vec<PlaceholderSlot> = Vec::new();
    let mut empty_package: Option<String> = None;

    for package in packages {
        if package.slots.is_empty() {
            // A slotless package never vacuously accepts.
            empty_package.get_or_insert_with(|| package.package_id.clone());
            continue;
        }

        // Wildcard slots first, then exact sizing.
        let ordered = package
            .slots
            .iter()
            .filter(|s| s.is_wildcard())
            .chain(package.slots.iter().filter(|s| !s.is_wildcard()));

        for slot in ordered {
            if slot.is_wildcard() || (asset.width == slot.width && asset.height == slot.height) {
                debug!(
                    creative_id = %asset.creative_id,
                    package_id = %package.package_id,
                    slot = %slot,
                    "creative matched placeholder"
                );
                return ValidationOutcome::Accepted {
                    package_id: package.package_id.clone(),
                    slot: slot.clone(),
                };
            }
            attempted.push(slot.clone());
        }
    }

    let reason = if attempted.is_empty() {
        DomainError::NoPlaceholdersConfigured {
            package_id: empty_package.unwrap_or_default(),
        }
    } else {
        DomainError::SlotMismatch {
            creative_id: asset.creative_id.clone(),
            attempted: attempted.clone(),
        }
    };

    ValidationOutcome::Rejected { reason, attempted }
}

/// Check an asset against a resolved format's requirement bounds
/// (duration and file size). Dimension fit is the validator's job; these
/// bounds apply at submission time.
pub fn check_requirements(
    asset: &CreativeAsset,
    requirements: &FormatRequirements,
) -> Vec<RequirementViolation> {
    let mut violations = Vec::new();

    if let (Some(min), Some(actual)) = (requirements.min_duration_secs, asset.duration_secs) {
        if actual < min {
            violations.push(RequirementViolation {
                field: "duration_secs".into(),
                expected: format!(">= {min}"),
                actual: actual.to_string(),
            });
        }
    }
    if let (Some(max), Some(actual)) = (requirements.max_duration_secs, asset.duration_secs) {
        if actual > max {
            violations.push(RequirementViolation {
                field: "duration_secs".into(),
                expected: format!("<= {max}"),
                actual: actual.to_string(),
            });
        }
    }
    if let (Some(max), Some(actual)) = (requirements.max_file_size_bytes, asset.file_size_bytes) {
        if actual > max {
            violations.push(RequirementViolation {
                field: "file_size_bytes".into(),
                expected: format!("<= {max}"),
                actual: actual.to_string(),
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcp_core::types::MediaKind;

    fn package(id: &str, slots: Vec<PlaceholderSlot>) -> PackagePlaceholders {
        PackagePlaceholders {
            package_id: id.to_string(),
            slots,
        }
    }

    fn native_template_slot(template_id: u64) -> PlaceholderSlot {
        PlaceholderSlot {
            width: 1,
            height: 1,
            creative_template_id: Some(template_id),
            expected_creative_count: None,
        }
    }

    #[test]
    fn test_native_asset_matches_template_wildcard() {
        let asset = CreativeAsset::new("hero", 1200, 627, MediaKind::Native);
        let packages = vec![package("pkg-1", vec![native_template_slot(12345678)])];
        match validate(&asset, &packages) {
            ValidationOutcome::Accepted { package_id, slot } => {
                assert_eq!(package_id, "pkg-1");
                assert_eq!(slot.creative_template_id, Some(12345678));
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn test_programmatic_wildcard_accepts_any_dimensions() {
        let asset = CreativeAsset::new("banner", 300, 250, MediaKind::Display);
        let packages = vec![package("pkg-1", vec![PlaceholderSlot::exact(1, 1)])];
        assert!(matches!(
            validate(&asset, &packages),
            ValidationOutcome::Accepted { .. }
        ));
    }

    #[test]
    fn test_wildcard_ignores_media_kind() {
        let asset = CreativeAsset::new("spot", 640, 480, MediaKind::Video);
        let packages = vec![package("pkg-1", vec![native_template_slot(99)])];
        assert!(matches!(
            validate(&asset, &packages),
            ValidationOutcome::Accepted { .. }
        ));
    }

    #[test]
    fn test_exact_mismatch_reports_attempted_slots() {
        let asset = CreativeAsset::new("leader", 728, 90, MediaKind::Display);
        let packages = vec![package("pkg-1", vec![PlaceholderSlot::exact(300, 250)])];
        match validate(&asset, &packages) {
            ValidationOutcome::Rejected { reason, attempted } => {
                assert_eq!(attempted, vec![PlaceholderSlot::exact(300, 250)]);
                assert!(matches!(reason, DomainError::SlotMismatch { .. }));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_one_matching_slot_in_one_package_is_enough() {
        let asset = CreativeAsset::new("banner", 300, 250, MediaKind::Display);
        let packages = vec![
            package("pkg-1", vec![PlaceholderSlot::exact(728, 90)]),
            package(
                "pkg-2",
                vec![
                    PlaceholderSlot::exact(160, 600),
                    PlaceholderSlot::exact(300, 250),
                ],
            ),
        ];
        match validate(&asset, &packages) {
            ValidationOutcome::Accepted { package_id, .. } => assert_eq!(package_id, "pkg-2"),
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn test_wildcard_tried_before_exact() {
        // 300x250 asset against a package holding both an exact 728x90 and
        // a wildcard: the wildcard wins and the exact slot is never listed
        // as attempted.
        let asset = CreativeAsset::new("banner", 300, 250, MediaKind::Display);
        let packages = vec![package(
            "pkg-1",
            vec![
                PlaceholderSlot::exact(728, 90),
                PlaceholderSlot::exact(1, 1),
            ],
        )];
        match validate(&asset, &packages) {
            ValidationOutcome::Accepted { slot, .. } => assert!(slot.is_wildcard()),
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_slot_package_never_vacuously_accepts() {
        let asset = CreativeAsset::new("banner", 300, 250, MediaKind::Display);
        let packages = vec![package("pkg-1", vec![])];
        match validate(&asset, &packages) {
            ValidationOutcome::Rejected { reason, attempted } => {
                assert!(attempted.is_empty());
                assert_eq!(
                    reason,
                    DomainError::NoPlaceholdersConfigured {
                        package_id: "pkg-1".into()
                    }
                );
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_requirement_bounds() {
        let mut asset = CreativeAsset::new("spot", 640, 480, MediaKind::Video);
        asset.duration_secs = Some(45);
        asset.file_size_bytes = Some(60_000_000);

        let requirements = FormatRequirements {
            min_duration_secs: Some(1),
            max_duration_secs: Some(30),
            max_file_size_bytes: Some(50_000_000),
            ..Default::default()
        };

        let violations = check_requirements(&asset, &requirements);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "duration_secs");
        assert_eq!(violations[1].field, "file_size_bytes");
    }

    #[test]
    fn test_unmeasured_asset_skips_bounds() {
        let asset = CreativeAsset::new("tag", 300, 250, MediaKind::Display);
        let requirements = FormatRequirements {
            max_file_size_bytes: Some(200_000),
            ..Default::default()
        };
        assert!(check_requirements(&asset, &requirements).is_empty());
    }
}
