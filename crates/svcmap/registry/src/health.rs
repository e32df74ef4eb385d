//! Provider health strings to [`HealthStatus`].

use std::collections::HashMap;

use svcmap_types::HealthStatus;

/// Maps the directory's per-instance health strings to [`HealthStatus`].
///
/// Only the exact strings `HEALTHY` and `UNHEALTHY` are recognised; anything
/// else, including an absent entry, is [`HealthStatus::Unknown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthStatusTranslator;

impl HealthStatusTranslator {
    pub fn translate(raw: Option<&str>) -> HealthStatus {
        match raw {
            Some("HEALTHY") => HealthStatus::Healthy,
            Some("UNHEALTHY") => HealthStatus::Unhealthy,
            _ => HealthStatus::Unknown,
        }
    }

    /// Status of `instance_id` in a provider health map.
    pub fn from_map(statuses: &HashMap<String, String>, instance_id: &str) -> HealthStatus {
        Self::translate(statuses.get(instance_id).map(String::as_str))
    }
}
