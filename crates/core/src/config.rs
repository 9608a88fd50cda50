use serde::Deserialize;

use crate::types::AccessClass;

/// Root broker configuration. Loaded from environment variables with the
/// prefix `ADCP_BROKER__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ad_server: AdServerConfig,
    #[serde(default)]
    pub targeting: TargetingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdServerConfig {
    /// Ad-server network the broker operates against.
    #[serde(default = "default_network_code")]
    pub network_code: String,
    #[serde(default = "default_apply_timeout_ms")]
    pub apply_timeout_ms: u64,
    /// Orders created in paused state until externally approved.
    #[serde(default = "default_require_approval")]
    pub require_manual_approval: bool,
}

/// Declaration-ordered targeting dimension classification. Order matters:
/// access violations are reported against the first offending dimension
/// in declaration order so error messages are reproducible.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetingConfig {
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<DimensionClass>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionClass {
    pub name: String,
    pub class: AccessClass,
}

fn default_network_code() -> String {
    "0".to_string()
}

fn default_apply_timeout_ms() -> u64 {
    10_000
}

fn default_require_approval() -> bool {
    false
}

fn dim(name: &str, class: AccessClass) -> DimensionClass {
    DimensionClass {
        name: name.to_string(),
        class,
    }
}

/// Built-in classification covering the AdCP targeting dimensions.
/// Key-value pairs and AEE signals are reserved for the trusted internal
/// injection path.
fn default_dimensions() -> Vec<DimensionClass> {
    use AccessClass::*;
    vec![
        dim("geo_country_any_of", Overlay),
        dim("geo_region_any_of", Overlay),
        dim("geo_metro_any_of", Overlay),
        dim("geo_city_any_of", Overlay),
        dim("geo_zip_any_of", Overlay),
        dim("device_type_any_of", Overlay),
        dim("os_any_of", Overlay),
        dim("browser_any_of", Overlay),
        dim("language_any_of", Overlay),
        dim("content_cat_any_of", Overlay),
        dim("keyword_any_of", Overlay),
        dim("media_type_any_of", Overlay),
        dim("audience_segment_any_of", Overlay),
        dim("frequency_cap", Overlay),
        dim("signals", Hybrid),
        dim("key_value_pairs", ManagedOnly),
        dim("aee_signals", ManagedOnly),
    ]
}

impl Default for AdServerConfig {
    fn default() -> Self {
        Self {
            network_code: default_network_code(),
            apply_timeout_ms: default_apply_timeout_ms(),
            require_manual_approval: default_require_approval(),
        }
    }
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("ADCP_BROKER")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
