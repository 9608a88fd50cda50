//! Media-buy creation and creative sync.
//!
//! All computation here is synchronous and stateless; the format store
//! and ad-server client own their concurrency discipline. Domain-level
//! rejections end up inside the returned `DomainResult`; only corrupted
//! configuration aborts a request.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use adcp_core::config::AdServerConfig;
use adcp_core::error::{BrokerError, BrokerResult};
use adcp_core::result::{CreativeOutcome, DomainError, DomainResult, PackageOutcome};
use adcp_core::types::{
    CreativeAsset, CreativeStatus, PackagePlaceholders, PlaceholderSlot, TargetingOverlay,
};
use adcp_creatives::{check_requirements, validate, ValidationOutcome};
use adcp_formats::{resolve, FormatStore, ResolutionError, ResolvedFormat};
use adcp_targeting::ClassificationTable;

use crate::adserver::{AdServerClient, LineItemSpec, OrderSpec, SlotRef};

/// One requested campaign package: where it runs and which formats its
/// line items accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRequest {
    pub package_id: String,
    pub product_id: Option<String>,
    pub format_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMediaBuyRequest {
    /// Caller-supplied reference, doubling as the idempotency key for the
    /// ad-server order application.
    pub buyer_ref: String,
    pub tenant_id: Option<String>,
    pub packages: Vec<PackageRequest>,
    pub targeting: TargetingOverlay,
}

/// The broker engine. Cheap to share across request handlers; holds no
/// mutable state of its own.
pub struct BrokerEngine {
    formats: Arc<dyn FormatStore>,
    ad_server: Arc<dyn AdServerClient>,
    classification: ClassificationTable,
    config: AdServerConfig,
}

impl BrokerEngine {
    pub fn new(
        formats: Arc<dyn FormatStore>,
        ad_server: Arc<dyn AdServerClient>,
        classification: ClassificationTable,
        config: AdServerConfig,
    ) -> Self {
        Self {
            formats,
            ad_server,
            classification,
            config,
        }
    }

    /// Create a media buy: validate and merge targeting, resolve every
    /// requested format, and apply the resulting order against the ad
    /// server. `managed_signals` comes from the trusted internal path
    /// only, never from request input.
    pub fn create_media_buy(
        &self,
        request: &CreateMediaBuyRequest,
        managed_signals: &TargetingOverlay,
    ) -> BrokerResult<DomainResult> {
        let started = Instant::now();
        let mut result = DomainResult::default();

        let effective_targeting =
            match adcp_targeting::apply(&self.classification, &request.targeting, managed_signals) {
                Ok(overlay) => overlay,
                Err(violation) => {
                    warn!(buyer_ref = %request.buyer_ref, error = %violation, "targeting rejected");
                    metrics::counter!("broker.targeting_violations").increment(1);
                    result.errors.push(violation.into());
                    return Ok(result);
                }
            };

        // Resolve every format before touching the ad server.
        let mut line_items = Vec::new();
        for package in &request.packages {
            let mut slots = Vec::new();
            for format_id in &package.format_ids {
                match resolve(
                    self.formats.as_ref(),
                    format_id,
                    request.tenant_id.as_deref(),
                    package.product_id.as_deref(),
                ) {
                    Ok(resolved) => slots.push(placeholder_for(&resolved)),
                    Err(ResolutionError::UnknownFormat {
                        format_id,
                        searched_scopes,
                    }) => {
                        result.errors.push(DomainError::UnknownFormat {
                            format_id,
                            searched_scopes,
                        });
                    }
                    Err(ResolutionError::Incomplete { format_id, detail }) => {
                        return Err(BrokerError::CorruptedRegistry { format_id, detail });
                    }
                }
            }
            line_items.push(LineItemSpec {
                package_id: package.package_id.clone(),
                slots,
            });
        }

        if !result.errors.is_empty() {
            result.packages = request
                .packages
                .iter()
                .map(|p| PackageOutcome {
                    package_id: p.package_id.clone(),
                    line_item_ids: Vec::new(),
                    accepted: false,
                })
                .collect();
            metrics::counter!("broker.media_buys", "outcome" => "rejected").increment(1);
            return Ok(result);
        }

        let spec = OrderSpec {
            idempotency_key: request.buyer_ref.clone(),
            network_code: self.config.network_code.clone(),
            line_items,
            targeting: effective_targeting,
        };

        match self.ad_server.apply_line_items(&spec) {
            Ok(applied) => {
                result.media_buy_id = Some(applied.order_id);
                result.packages = request
                    .packages
                    .iter()
                    .map(|p| PackageOutcome {
                        package_id: p.package_id.clone(),
                        line_item_ids: applied
                            .line_item_ids
                            .get(&p.package_id)
                            .cloned()
                            .unwrap_or_default(),
                        accepted: true,
                    })
                    .collect();
                result.pending_activation = self.config.require_manual_approval;
                metrics::counter!("broker.media_buys", "outcome" => "created").increment(1);
            }
            Err(detail) => {
                warn!(buyer_ref = %request.buyer_ref, error = %detail, "ad server rejected order");
                result.errors.push(DomainError::UpstreamAdServer { detail });
                result.packages = request
                    .packages
                    .iter()
                    .map(|p| PackageOutcome {
                        package_id: p.package_id.clone(),
                        line_item_ids: Vec::new(),
                        accepted: false,
                    })
                    .collect();
                metrics::counter!("broker.media_buys", "outcome" => "upstream_error").increment(1);
            }
        }

        metrics::histogram!("broker.create_media_buy_ms")
            .record(started.elapsed().as_millis() as f64);
        info!(
            buyer_ref = %request.buyer_ref,
            packages = request.packages.len(),
            media_buy_id = ?result.media_buy_id,
            "media buy processed"
        );

        Ok(result)
    }

    /// Sync creatives against the placeholders of the packages they are
    /// assigned to: resolve each asset's declared format and enforce its
    /// requirement bounds, validate slot fit, and associate accepted
    /// assets with their matched slot.
    pub fn sync_creatives(
        &self,
        assets: &[CreativeAsset],
        packages: &[PackagePlaceholders],
        tenant_id: Option<&str>,
    ) -> BrokerResult<DomainResult> {
        let mut result = DomainResult::default();

        for asset in assets {
            if let Some(format_id) = asset.format_id.as_deref() {
                match resolve(self.formats.as_ref(), format_id, tenant_id, None) {
                    Ok(resolved) => {
                        let violations =
                            check_requirements(asset, &resolved.definition.requirements);
                        if !violations.is_empty() {
                            warn!(
                                creative_id = %asset.creative_id,
                                format_id,
                                count = violations.len(),
                                "creative violates format requirement bounds"
                            );
                            metrics::counter!("broker.creatives", "outcome" => "rejected")
                                .increment(1);
                            result.errors.push(DomainError::RequirementsViolated {
                                creative_id: asset.creative_id.clone(),
                                violations,
                            });
                            result.creatives.push(CreativeOutcome {
                                creative_id: asset.creative_id.clone(),
                                status: CreativeStatus::Rejected,
                                package_id: None,
                                matched_slot: None,
                            });
                            continue;
                        }
                    }
                    Err(ResolutionError::UnknownFormat {
                        format_id,
                        searched_scopes,
                    }) => {
                        result.errors.push(DomainError::UnknownFormat {
                            format_id,
                            searched_scopes,
                        });
                        result.creatives.push(CreativeOutcome {
                            creative_id: asset.creative_id.clone(),
                            status: CreativeStatus::Rejected,
                            package_id: None,
                            matched_slot: None,
                        });
                        continue;
                    }
                    Err(ResolutionError::Incomplete { format_id, detail }) => {
                        return Err(BrokerError::CorruptedRegistry { format_id, detail });
                    }
                }
            }

            match validate(asset, packages) {
                ValidationOutcome::Accepted { package_id, slot } => {
                    let slot_ref = SlotRef {
                        package_id: package_id.clone(),
                        slot: slot.clone(),
                    };
                    match self.ad_server.associate_creative(&asset.creative_id, &slot_ref) {
                        Ok(_) => {
                            metrics::counter!("broker.creatives", "outcome" => "approved")
                                .increment(1);
                            result.creatives.push(CreativeOutcome {
                                creative_id: asset.creative_id.clone(),
                                status: CreativeStatus::Approved,
                                package_id: Some(package_id),
                                matched_slot: Some(slot),
                            });
                        }
                        Err(detail) => {
                            // Retryable upstream failure: the creative
                            // stays pending rather than rejected.
                            warn!(creative_id = %asset.creative_id, error = %detail, "association failed");
                            metrics::counter!("broker.creatives", "outcome" => "upstream_error")
                                .increment(1);
                            result.errors.push(DomainError::UpstreamAdServer { detail });
                            result.creatives.push(CreativeOutcome {
                                creative_id: asset.creative_id.clone(),
                                status: CreativeStatus::Pending,
                                package_id: Some(package_id),
                                matched_slot: Some(slot),
                            });
                        }
                    }
                }
                ValidationOutcome::Rejected { reason, .. } => {
                    metrics::counter!("broker.creatives", "outcome" => "rejected").increment(1);
                    result.errors.push(reason);
                    result.creatives.push(CreativeOutcome {
                        creative_id: asset.creative_id.clone(),
                        status: CreativeStatus::Rejected,
                        package_id: None,
                        matched_slot: None,
                    });
                }
            }
        }

        info!(
            total = assets.len(),
            approved = result.accepted_count(),
            rejected = result.rejected_count(),
            "creative sync finished"
        );

        Ok(result)
    }
}

/// Derive the placeholder slot a resolved format produces on its line
/// items: the ad-server placement block wins, requirement dimensions are
/// the fallback, and a format with neither (untyped tag) becomes a 1x1
/// wildcard.
fn placeholder_for(resolved: &ResolvedFormat) -> PlaceholderSlot {
    let gam = resolved.definition.placement.get("gam");
    // A placement value that overflows u32 is corrupt; fall through to
    // the requirement dimensions instead of wrapping.
    let dim = |key: &str| {
        gam.and_then(|block| block.get(key))
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    };

    PlaceholderSlot {
        width: dim("width")
            .or(resolved.definition.requirements.width)
            .unwrap_or(1),
        height: dim("height")
            .or(resolved.definition.requirements.height)
            .unwrap_or(1),
        creative_template_id: gam
            .and_then(|block| block.get("creative_template_id"))
            .and_then(|v| v.as_u64()),
        expected_creative_count: None,
    }
}
