//! Discovery facade over a [`DirectoryClient`].

use std::sync::Arc;

use async_trait::async_trait;
use svcmap_directory::{DirectoryClient, HealthStatusFilter};
use svcmap_types::ServiceInstance;
use tracing::debug;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::resolver::ServiceInstanceResolver;

/// Human-readable label of the directory-backed discovery client.
pub const DESCRIPTION: &str = "svcmap service directory discovery client";

/// Query side of the service directory.
#[async_trait]
pub trait ServiceDiscovery: Send + Sync {
    fn description(&self) -> &'static str;

    /// Healthy instances of a service.
    async fn get_instances(&self, service_id: &str) -> DiscoveryResult<Vec<ServiceInstance>>;

    /// Names of all services in the discovery namespace.
    async fn get_services(&self) -> DiscoveryResult<Vec<String>>;
}

/// [`ServiceDiscovery`] bound to one namespace of a directory.
pub struct DirectoryServiceDiscovery {
    client: Arc<dyn DirectoryClient>,
    namespace: String,
}

impl DirectoryServiceDiscovery {
    pub fn new(client: Arc<dyn DirectoryClient>, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn configured_namespace(&self) -> DiscoveryResult<&str> {
        if self.namespace.trim().is_empty() {
            Err(DiscoveryError::NamespaceNotConfigured)
        } else {
            Ok(&self.namespace)
        }
    }
}

#[async_trait]
impl ServiceDiscovery for DirectoryServiceDiscovery {
    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    async fn get_instances(&self, service_id: &str) -> DiscoveryResult<Vec<ServiceInstance>> {
        let namespace = self.configured_namespace()?;
        let discovered = self
            .client
            .discover_instances(namespace, service_id, HealthStatusFilter::Healthy)
            .await?;

        debug!(
            namespace = %namespace,
            service_id = %service_id,
            count = discovered.len(),
            "Discovered instances"
        );
        Ok(ServiceInstanceResolver::resolve_all(&discovered))
    }

    async fn get_services(&self) -> DiscoveryResult<Vec<String>> {
        let namespace = self.configured_namespace()?;
        Ok(self.client.list_services(namespace).await?)
    }
}
