//! Transport-free domain results.
//!
//! A `DomainResult` carries the business outcome of a broker operation and
//! nothing else: created identifiers, per-package and per-creative
//! outcomes, and structured errors. Lifecycle status, task identifiers and
//! human-readable messages are derived at the transport boundary and never
//! stored here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CreativeStatus, PlaceholderSlot, RequirementViolation, ResolutionScope};

/// Domain-level rejection detail. These are data, not exceptions: they
/// travel inside `DomainResult` so the envelope mapper can compute
/// `failed`/`partial` status from them.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DomainError {
    #[error("unknown format '{format_id}' (searched {searched_scopes:?})")]
    UnknownFormat {
        format_id: String,
        searched_scopes: Vec<ResolutionScope>,
    },

    #[error("package '{package_id}' has no placeholder slots configured")]
    NoPlaceholdersConfigured { package_id: String },

    #[error("creative '{creative_id}' does not match any of: {}", format_slots(.attempted))]
    SlotMismatch {
        creative_id: String,
        attempted: Vec<PlaceholderSlot>,
    },

    #[error("creative '{creative_id}' violates format requirements: {}", format_violations(.violations))]
    RequirementsViolated {
        creative_id: String,
        violations: Vec<RequirementViolation>,
    },

    #[error("targeting dimension '{dimension}' is managed-only and cannot be set by callers")]
    ManagedOnlyViolation { dimension: String },

    #[error("unknown targeting dimension '{dimension}'")]
    UnknownDimension { dimension: String },

    #[error("ad server error: {detail}")]
    UpstreamAdServer { detail: String },
}

impl DomainError {
    /// Whether this error fails the whole operation (versus rejecting one
    /// item of a batch that may otherwise succeed).
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownFormat { .. }
                | DomainError::ManagedOnlyViolation { .. }
                | DomainError::UnknownDimension { .. }
                | DomainError::UpstreamAdServer { .. }
        )
    }
}

fn format_slots(slots: &[PlaceholderSlot]) -> String {
    let parts: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
    parts.join(", ")
}

fn format_violations(violations: &[RequirementViolation]) -> String {
    let parts: Vec<String> = violations
        .iter()
        .map(|v| format!("{} expected {}, got {}", v.field, v.expected, v.actual))
        .collect();
    parts.join("; ")
}

/// Outcome for one campaign package within an operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageOutcome {
    pub package_id: String,
    /// Ad-server line-item identifiers created for this package.
    pub line_item_ids: Vec<String>,
    pub accepted: bool,
}

/// Outcome for one creative within a sync operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreativeOutcome {
    pub creative_id: String,
    pub status: CreativeStatus,
    /// Package and slot the creative matched, when approved.
    pub package_id: Option<String>,
    pub matched_slot: Option<PlaceholderSlot>,
}

/// The business outcome of a broker operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainResult {
    pub media_buy_id: Option<String>,
    pub packages: Vec<PackageOutcome>,
    pub creatives: Vec<CreativeOutcome>,
    pub errors: Vec<DomainError>,
    /// The operation needs asynchronous continuation (e.g. the order is
    /// awaiting external approval before activation).
    pub pending_activation: bool,
}

impl DomainResult {
    pub fn has_unrecoverable_error(&self) -> bool {
        self.errors.iter().any(DomainError::is_unrecoverable)
    }

    pub fn accepted_count(&self) -> usize {
        self.packages.iter().filter(|p| p.accepted).count()
            + self
                .creatives
                .iter()
                .filter(|c| c.status == CreativeStatus::Approved)
                .count()
    }

    pub fn rejected_count(&self) -> usize {
        self.packages.iter().filter(|p| !p.accepted).count()
            + self
                .creatives
                .iter()
                .filter(|c| c.status == CreativeStatus::Rejected)
                .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecoverable_classification() {
        let fatal = DomainError::UnknownFormat {
            format_id: "display_9000x1".into(),
            searched_scopes: vec![
                ResolutionScope::Product,
                ResolutionScope::Tenant,
                ResolutionScope::Global,
            ],
        };
        assert!(fatal.is_unrecoverable());

        let rejection = DomainError::SlotMismatch {
            creative_id: "c-1".into(),
            attempted: vec![PlaceholderSlot::exact(300, 250)],
        };
        assert!(!rejection.is_unrecoverable());
    }

    #[test]
    fn test_slot_mismatch_message_lists_attempted() {
        let err = DomainError::SlotMismatch {
            creative_id: "c-1".into(),
            attempted: vec![
                PlaceholderSlot::exact(1, 1),
                PlaceholderSlot::exact(728, 90),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("1x1(wildcard)"));
        assert!(msg.contains("728x90"));
    }

    #[test]
    fn test_requirements_violation_is_a_rejection_with_detail() {
        let err = DomainError::RequirementsViolated {
            creative_id: "c-1".into(),
            violations: vec![RequirementViolation {
                field: "duration_secs".into(),
                expected: "<= 30".into(),
                actual: "90".into(),
            }],
        };
        assert!(!err.is_unrecoverable());
        assert!(err.to_string().contains("duration_secs expected <= 30, got 90"));
    }

    #[test]
    fn test_counts() {
        let result = DomainResult {
            creatives: vec![
                CreativeOutcome {
                    creative_id: "a".into(),
                    status: CreativeStatus::Approved,
                    package_id: Some("p1".into()),
                    matched_slot: Some(PlaceholderSlot::exact(300, 250)),
                },
                CreativeOutcome {
                    creative_id: "b".into(),
                    status: CreativeStatus::Rejected,
                    package_id: None,
                    matched_slot: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(result.accepted_count(), 1);
        assert_eq!(result.rejected_count(), 1);
    }
}
