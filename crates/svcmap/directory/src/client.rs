//! Directory provider capability trait

use crate::error::DirectoryResult;
use crate::operation::{OperationId, OperationStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use svcmap_types::DiscoveredInstance;

/// Capability set of a namespace-scoped service directory.
///
/// Implementations are shared read-only across all engine calls, so every
/// method takes `&self`. Registration and deregistration complete when the
/// returned future resolves; callers bound the wait themselves.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Look up a namespace by id
    async fn get_namespace(&self, id: &str) -> DirectoryResult<NamespaceInfo>;

    /// Start creating a namespace; completion is tracked via [`Self::get_operation`]
    async fn create_namespace(&self, name: &str) -> DirectoryResult<OperationId>;

    /// Current status of an asynchronous operation
    async fn get_operation(&self, id: &OperationId) -> DirectoryResult<OperationStatus>;

    /// Look up a service by id
    async fn get_service(&self, id: &str) -> DirectoryResult<ServiceInfo>;

    /// Create a service inside a namespace
    async fn create_service(&self, namespace_id: &str, name: &str) -> DirectoryResult<ServiceInfo>;

    /// Register (or update) an instance with the given attributes
    async fn register_instance(
        &self,
        service_id: &str,
        instance_id: &str,
        attributes: &HashMap<String, String>,
    ) -> DirectoryResult<()>;

    /// Remove an instance from a service
    async fn deregister_instance(&self, service_id: &str, instance_id: &str) -> DirectoryResult<()>;

    /// Health status strings for the requested instances, keyed by instance id
    async fn get_instances_health_status(
        &self,
        service_id: &str,
        instance_ids: &[String],
    ) -> DirectoryResult<HashMap<String, String>>;

    /// Instances of a service, filtered by health
    async fn discover_instances(
        &self,
        namespace: &str,
        service_name: &str,
        health_filter: HealthStatusFilter,
    ) -> DirectoryResult<Vec<DiscoveredInstance>>;

    /// Names of the services in a namespace
    async fn list_services(&self, namespace_id: &str) -> DirectoryResult<Vec<String>>;

    /// Release provider connections. Later calls fail.
    fn shutdown(&self);
}

/// Health filter applied by instance discovery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatusFilter {
    #[default]
    Healthy,
    Unhealthy,
    All,
}

impl HealthStatusFilter {
    /// Whether an instance with the given provider health string passes
    pub fn matches(&self, health: &str) -> bool {
        match self {
            HealthStatusFilter::Healthy => health == "HEALTHY",
            HealthStatusFilter::Unhealthy => health == "UNHEALTHY",
            HealthStatusFilter::All => true,
        }
    }
}

/// Namespace summary returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    pub id: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Service summary returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub namespace_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
