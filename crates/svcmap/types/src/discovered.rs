//! Raw directory record returned by instance discovery

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An untyped instance record as the directory returns it.
///
/// Attribute keys are loosely schematized; the well-known ones are listed in
/// [`crate::attributes`]. Unknown keys are preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredInstance {
    pub instance_id: String,
    pub service_id: String,
    pub namespace_id: String,
    pub attributes: HashMap<String, String>,
}

impl DiscoveredInstance {
    pub fn new(
        instance_id: impl Into<String>,
        service_id: impl Into<String>,
        namespace_id: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            service_id: service_id.into(),
            namespace_id: namespace_id.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
