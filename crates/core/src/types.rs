use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media kind of a creative format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Display,
    Video,
    Audio,
    Native,
}

/// Creative requirements attached to a format. Every bound is optional:
/// display formats carry dimensions, video/audio formats carry durations,
/// and a layer in the override chain may supply only the fields it wants
/// to pin down.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormatRequirements {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub min_duration_secs: Option<u32>,
    pub max_duration_secs: Option<u32>,
    pub max_file_size_bytes: Option<u64>,
}

impl FormatRequirements {
    /// Overlay `self` on top of `base`: fields set here win, unset fields
    /// inherit from the lower layer.
    pub fn merged_over(&self, base: &FormatRequirements) -> FormatRequirements {
        FormatRequirements {
            width: self.width.or(base.width),
            height: self.height.or(base.height),
            min_duration_secs: self.min_duration_secs.or(base.min_duration_secs),
            max_duration_secs: self.max_duration_secs.or(base.max_duration_secs),
            max_file_size_bytes: self.max_file_size_bytes.or(base.max_file_size_bytes),
        }
    }
}

/// Scope a format definition (or partial override) was found at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionScope {
    Product,
    Tenant,
    Global,
}

/// A partial format definition as stored at one resolution scope.
///
/// Any field may be absent; a tenant can override only the ad-server
/// template identifier in the placement block while inheriting standard
/// requirements from the global registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatLayer {
    pub media_kind: Option<MediaKind>,
    #[serde(default)]
    pub requirements: FormatRequirements,
    /// Free-form placement configuration keyed by ad-server backend
    /// (e.g. `"gam": {"width": 300, "height": 250}`).
    #[serde(default)]
    pub placement: serde_json::Map<String, serde_json::Value>,
}

/// A fully resolved format: requirements plus ad-server placement
/// configuration. Identifiers are unique within their resolution scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDefinition {
    pub format_id: String,
    pub media_kind: MediaKind,
    pub requirements: FormatRequirements,
    pub placement: serde_json::Map<String, serde_json::Value>,
}

/// An ad-server-side reservation describing what creative shape a line
/// item expects. Owned by a campaign package; immutable once the
/// package's line items exist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceholderSlot {
    pub width: u32,
    pub height: u32,
    /// Native-rendering template bound to this slot, when present.
    pub creative_template_id: Option<u64>,
    pub expected_creative_count: Option<u32>,
}

impl PlaceholderSlot {
    pub fn exact(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            creative_template_id: None,
            expected_creative_count: None,
        }
    }

    /// Both 1x1 variants (native template and untyped programmatic tag)
    /// accept creatives of any real dimension.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind(), SlotKind::NativeTemplate { .. } | SlotKind::ProgrammaticWildcard)
    }

    pub fn kind(&self) -> SlotKind {
        if self.width == 1 && self.height == 1 {
            match self.creative_template_id {
                Some(template_id) => SlotKind::NativeTemplate { template_id },
                None => SlotKind::ProgrammaticWildcard,
            }
        } else {
            SlotKind::Exact {
                width: self.width,
                height: self.height,
            }
        }
    }
}

impl fmt::Display for PlaceholderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard() {
            write!(f, "{}x{}(wildcard)", self.width, self.height)
        } else {
            write!(f, "{}x{}", self.width, self.height)
        }
    }
}

/// Tagged slot semantics. The degenerate 1x1 slot represents two real
/// ad-server placements collapsed into one shape: a bound
/// native-rendering template and an untyped programmatic/third-party tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Exact { width: u32, height: u32 },
    NativeTemplate { template_id: u64 },
    ProgrammaticWildcard,
}

/// A campaign package together with the placeholder slots its line items
/// were created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagePlaceholders {
    pub package_id: String,
    pub slots: Vec<PlaceholderSlot>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreativeStatus {
    Pending,
    Approved,
    Rejected,
}

/// A submitted creative with measured dimensions, or declared ones when
/// the asset is not measurable (third-party tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeAsset {
    pub creative_id: String,
    pub name: String,
    /// Format the creative was submitted for; its resolved requirement
    /// bounds are enforced during sync.
    pub format_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub media_kind: MediaKind,
    pub snippet_url: Option<String>,
    pub duration_secs: Option<u32>,
    pub file_size_bytes: Option<u64>,
    pub status: CreativeStatus,
    pub created_at: DateTime<Utc>,
}

impl CreativeAsset {
    pub fn new(name: impl Into<String>, width: u32, height: u32, media_kind: MediaKind) -> Self {
        Self {
            creative_id: Uuid::new_v4().to_string(),
            name: name.into(),
            format_id: None,
            width,
            height,
            media_kind,
            snippet_url: None,
            duration_secs: None,
            file_size_bytes: None,
            status: CreativeStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn with_format(mut self, format_id: impl Into<String>) -> Self {
        self.format_id = Some(format_id.into());
        self
    }
}

/// A creative requirement bound the asset violates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequirementViolation {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

/// Access class of a targeting dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessClass {
    /// Caller-settable.
    Overlay,
    /// Only the trusted internal signal path may set it.
    ManagedOnly,
    /// Both; managed values win on conflict.
    Hybrid,
}

/// Targeting dimension name to value(s). A `BTreeMap` keeps serialized
/// output byte-identical across calls with identical inputs.
pub type TargetingOverlay = BTreeMap<String, serde_json::Value>;
