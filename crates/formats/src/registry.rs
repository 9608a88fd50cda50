//! Compiled-in standard format registry.

use serde_json::{json, Map, Value};

use adcp_core::types::{FormatLayer, FormatRequirements, MediaKind};

fn gam_placement(width: u32, height: u32) -> Map<String, Value> {
    let mut placement = Map::new();
    placement.insert("gam".into(), json!({ "width": width, "height": height }));
    placement
}

fn display(width: u32, height: u32) -> FormatLayer {
    FormatLayer {
        media_kind: Some(MediaKind::Display),
        requirements: FormatRequirements {
            width: Some(width),
            height: Some(height),
            max_file_size_bytes: Some(200_000),
            ..Default::default()
        },
        placement: gam_placement(width, height),
    }
}

fn video(max_duration_secs: u32) -> FormatLayer {
    FormatLayer {
        media_kind: Some(MediaKind::Video),
        requirements: FormatRequirements {
            min_duration_secs: Some(1),
            max_duration_secs: Some(max_duration_secs),
            max_file_size_bytes: Some(50_000_000),
            ..Default::default()
        },
        placement: gam_placement(640, 480),
    }
}

/// Standard registry entries. Tenant custom formats and product overrides
/// layer on top of these; the native entry deliberately omits a
/// `creative_template_id` so each tenant binds its own template.
pub fn standard_formats() -> Vec<(String, FormatLayer)> {
    let mut formats = vec![
        ("display_300x250".to_string(), display(300, 250)),
        ("display_728x90".to_string(), display(728, 90)),
        ("display_320x50".to_string(), display(320, 50)),
        ("display_300x600".to_string(), display(300, 600)),
        ("display_160x600".to_string(), display(160, 600)),
        ("video_15s".to_string(), video(15)),
        ("video_30s".to_string(), video(30)),
    ];

    formats.push((
        "audio_30s".to_string(),
        FormatLayer {
            media_kind: Some(MediaKind::Audio),
            requirements: FormatRequirements {
                min_duration_secs: Some(1),
                max_duration_secs: Some(30),
                max_file_size_bytes: Some(10_000_000),
                ..Default::default()
            },
            placement: Map::new(),
        },
    ));

    // Native rendering: real asset dimensions, 1x1 ad-server slot bound to
    // a tenant-supplied template.
    formats.push((
        "native_1200x627".to_string(),
        FormatLayer {
            media_kind: Some(MediaKind::Native),
            requirements: FormatRequirements {
                width: Some(1200),
                height: Some(627),
                ..Default::default()
            },
            placement: gam_placement(1, 1),
        },
    ));

    // Untyped third-party/programmatic tag: 1x1 wildcard slot, no
    // dimension requirements of its own.
    formats.push((
        "third_party_tag".to_string(),
        FormatLayer {
            media_kind: Some(MediaKind::Display),
            requirements: FormatRequirements::default(),
            placement: gam_placement(1, 1),
        },
    ));

    formats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_ids_are_unique() {
        let formats = standard_formats();
        let ids: HashSet<&str> = formats.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids.len(), formats.len());
    }

    #[test]
    fn test_every_standard_entry_is_complete() {
        for (id, layer) in standard_formats() {
            assert!(layer.media_kind.is_some(), "{id} missing media kind");
        }
    }
}
