//! Targeting dimension classification table.

use std::collections::HashMap;

use adcp_core::config::{DimensionClass, TargetingConfig};
use adcp_core::error::{BrokerError, BrokerResult};
use adcp_core::types::AccessClass;

/// Immutable dimension-name to access-class mapping, loaded once per
/// process. Declaration order is preserved so violation reporting is
/// deterministic; lookup stays O(1) through a side index.
#[derive(Debug, Clone)]
pub struct ClassificationTable {
    ordered: Vec<DimensionClass>,
    index: HashMap<String, AccessClass>,
}

impl ClassificationTable {
    /// Build from configuration. A duplicate dimension name means the
    /// table is malformed and the process must not serve requests with it.
    pub fn from_config(config: &TargetingConfig) -> BrokerResult<Self> {
        let mut index = HashMap::with_capacity(config.dimensions.len());
        for dim in &config.dimensions {
            if index.insert(dim.name.clone(), dim.class).is_some() {
                return Err(BrokerError::ClassificationTable(format!(
                    "duplicate dimension '{}'",
                    dim.name
                )));
            }
        }
        Ok(Self {
            ordered: config.dimensions.clone(),
            index,
        })
    }

    pub fn class_of(&self, dimension: &str) -> Option<AccessClass> {
        self.index.get(dimension).copied()
    }

    /// Dimensions in declaration order.
    pub fn dimensions(&self) -> impl Iterator<Item = &DimensionClass> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
