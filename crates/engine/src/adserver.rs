//! Ad-server collaborator seam.
//!
//! The broker treats the ad server as an opaque pair of operations:
//! applying an order with its line items, and associating an uploaded
//! creative with a placeholder. Both are retryable and idempotent under
//! the caller-supplied key; their concrete SDK calls live outside this
//! engine.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use adcp_core::types::{PlaceholderSlot, TargetingOverlay};

/// One line item to create, carrying the placeholder slots derived from
/// its resolved formats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemSpec {
    pub package_id: String,
    pub slots: Vec<PlaceholderSlot>,
}

/// Order application request. `idempotency_key` makes retries safe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSpec {
    pub idempotency_key: String,
    pub network_code: String,
    pub line_items: Vec<LineItemSpec>,
    pub targeting: TargetingOverlay,
}

/// Server-side identifiers created by an order application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedOrder {
    pub order_id: String,
    /// Package id to created line-item identifiers.
    pub line_item_ids: BTreeMap<String, Vec<String>>,
}

/// Placeholder reference a creative gets associated with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotRef {
    pub package_id: String,
    pub slot: PlaceholderSlot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssociationResult {
    pub association_id: String,
}

/// Opaque ad-server operations. Errors are surfaced to callers wrapped,
/// never interpreted.
pub trait AdServerClient: Send + Sync {
    fn apply_line_items(&self, spec: &OrderSpec) -> Result<AppliedOrder, String>;
    fn associate_creative(
        &self,
        creative_id: &str,
        slot_ref: &SlotRef,
    ) -> Result<AssociationResult, String>;
}

/// In-memory test double. Records every call and can be flipped into
/// failure mode per operation.
#[derive(Default)]
pub struct MockAdServer {
    pub applied: DashMap<String, OrderSpec>,
    pub associations: DashMap<String, SlotRef>,
    fail_apply: AtomicBool,
    fail_associate: AtomicBool,
}

impl MockAdServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_apply(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub fn fail_associate(&self, fail: bool) {
        self.fail_associate.store(fail, Ordering::SeqCst);
    }
}

impl AdServerClient for MockAdServer {
    fn apply_line_items(&self, spec: &OrderSpec) -> Result<AppliedOrder, String> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err("simulated ad server outage".to_string());
        }
        // Idempotent: a replayed key returns the same order id.
        let order_id = format!("order-{}", spec.idempotency_key);
        let line_item_ids = spec
            .line_items
            .iter()
            .map(|li| {
                (
                    li.package_id.clone(),
                    vec![format!("li-{}-{}", spec.idempotency_key, li.package_id)],
                )
            })
            .collect();
        self.applied.insert(spec.idempotency_key.clone(), spec.clone());
        Ok(AppliedOrder {
            order_id,
            line_item_ids,
        })
    }

    fn associate_creative(
        &self,
        creative_id: &str,
        slot_ref: &SlotRef,
    ) -> Result<AssociationResult, String> {
        if self.fail_associate.load(Ordering::SeqCst) {
            return Err("simulated association failure".to_string());
        }
        self.associations
            .insert(creative_id.to_string(), slot_ref.clone());
        Ok(AssociationResult {
            association_id: Uuid::new_v4().to_string(),
        })
    }
}
