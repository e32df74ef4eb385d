//! Health indicators and their aggregation.
//!
//! Indicators are checked by name and folded into one status. Names on the
//! exclusion list are reported but ignored by the fold, which is how an
//! indicator that itself reports aggregate health avoids counting twice.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use svcmap_directory::DirectoryClient;
use svcmap_types::HealthStatus;
use tracing::{debug, instrument};

/// Name of the directory connectivity indicator.
pub const DIRECTORY_INDICATOR: &str = "svcmap";

/// Outcome of one indicator check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub detail: Option<String>,
}

impl HealthReport {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            detail: None,
        }
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            detail: Some(detail.into()),
        }
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unknown,
            detail: Some(detail.into()),
        }
    }
}

/// A named source of health.
#[async_trait]
pub trait HealthIndicator: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> HealthReport;
}

/// Reports whether the discovery namespace is reachable in the directory.
pub struct DirectoryHealthIndicator {
    client: Option<Arc<dyn DirectoryClient>>,
    namespace: String,
}

impl DirectoryHealthIndicator {
    pub fn new(client: Arc<dyn DirectoryClient>, namespace: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            namespace: namespace.into(),
        }
    }

    /// Indicator with no directory wired in; always `Unknown`.
    pub fn detached(namespace: impl Into<String>) -> Self {
        Self {
            client: None,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl HealthIndicator for DirectoryHealthIndicator {
    fn name(&self) -> &str {
        DIRECTORY_INDICATOR
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn check(&self) -> HealthReport {
        let Some(client) = &self.client else {
            return HealthReport::unknown("directory client not configured");
        };

        match client.get_namespace(&self.namespace).await {
            Ok(_) => HealthReport::healthy(),
            Err(e) => {
                debug!(error = %e, "Directory health check failed");
                HealthReport::unhealthy(e.to_string())
            }
        }
    }
}

/// Combined result of every registered indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateHealth {
    pub status: HealthStatus,
    pub components: BTreeMap<String, HealthReport>,
}

/// Folds named indicator statuses into one.
///
/// Any included `Unhealthy` makes the aggregate `Unhealthy`; otherwise any
/// `Healthy` makes it `Healthy`; otherwise it is `Unknown`.
#[derive(Default)]
pub struct HealthAggregator {
    indicators: Vec<Arc<dyn HealthIndicator>>,
    excluded: HashSet<String>,
}

impl HealthAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indicator(mut self, indicator: Arc<dyn HealthIndicator>) -> Self {
        self.indicators.push(indicator);
        self
    }

    /// Leave `name` out of the aggregate status.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded.insert(name.into());
        self
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    /// Fold a name-to-status mapping, skipping excluded names.
    pub fn aggregate<'a>(
        &self,
        statuses: impl IntoIterator<Item = (&'a str, HealthStatus)>,
    ) -> HealthStatus {
        let mut any_healthy = false;
        for (name, status) in statuses {
            if self.is_excluded(name) {
                continue;
            }
            match status {
                HealthStatus::Unhealthy => return HealthStatus::Unhealthy,
                HealthStatus::Healthy => any_healthy = true,
                HealthStatus::Unknown => {}
            }
        }

        if any_healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unknown
        }
    }

    /// Check every indicator and fold the results.
    pub async fn check(&self) -> AggregateHealth {
        let mut components = BTreeMap::new();
        for indicator in &self.indicators {
            let report = indicator.check().await;
            components.insert(indicator.name().to_string(), report);
        }

        let status = self.aggregate(
            components
                .iter()
                .map(|(name, report)| (name.as_str(), report.status)),
        );
        AggregateHealth { status, components }
    }
}
