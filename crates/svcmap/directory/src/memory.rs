//! In-memory directory provider
//!
//! Suitable for development, local runs and tests. Namespace ids equal their
//! names and service ids equal their names, so callers can address every
//! resource by the name they created it with. Asynchronous operations
//! complete as soon as they are submitted.

use crate::client::{DirectoryClient, HealthStatusFilter, NamespaceInfo, ServiceInfo};
use crate::error::{DirectoryError, DirectoryResult};
use crate::operation::{OperationId, OperationStatus};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use svcmap_types::{DiscoveredInstance, HealthStatus};
use tracing::debug;

#[derive(Debug, Clone)]
struct InstanceRecord {
    attributes: HashMap<String, String>,
    health: HealthStatus,
}

/// In-memory directory provider
pub struct InMemoryDirectory {
    namespaces: DashMap<String, NamespaceInfo>,
    services: DashMap<String, ServiceInfo>,
    /// Keyed by (service id, instance id)
    instances: DashMap<(String, String), InstanceRecord>,
    operations: DashMap<OperationId, OperationStatus>,
    service_limit: Option<usize>,
    shut_down: AtomicBool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            namespaces: DashMap::new(),
            services: DashMap::new(),
            instances: DashMap::new(),
            operations: DashMap::new(),
            service_limit: None,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Reject service creation once `limit` services exist
    pub fn with_service_limit(mut self, limit: usize) -> Self {
        self.service_limit = Some(limit);
        self
    }

    /// Seed a namespace without going through an operation
    pub fn insert_namespace(&self, name: impl Into<String>) {
        let name = name.into();
        self.namespaces.insert(
            name.clone(),
            NamespaceInfo {
                id: name.clone(),
                name,
                created_at: Utc::now(),
            },
        );
    }

    /// Override the health the directory reports for an instance
    pub fn set_instance_health(
        &self,
        service_id: &str,
        instance_id: &str,
        health: HealthStatus,
    ) -> DirectoryResult<()> {
        let key = (service_id.to_string(), instance_id.to_string());
        match self.instances.get_mut(&key) {
            Some(mut record) => {
                record.health = health;
                Ok(())
            }
            None => Err(DirectoryError::InstanceNotFound(instance_id.to_string())),
        }
    }

    /// Registered attributes of an instance
    pub fn instance_attributes(
        &self,
        service_id: &str,
        instance_id: &str,
    ) -> Option<HashMap<String, String>> {
        self.instances
            .get(&(service_id.to_string(), instance_id.to_string()))
            .map(|r| r.attributes.clone())
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> DirectoryResult<()> {
        if self.is_shut_down() {
            Err(DirectoryError::Shutdown)
        } else {
            Ok(())
        }
    }

    fn ensure_service(&self, service_id: &str) -> DirectoryResult<()> {
        if self.services.contains_key(service_id) {
            Ok(())
        } else {
            Err(DirectoryError::ServiceNotFound(service_id.to_string()))
        }
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(field: &str, value: &str) -> DirectoryResult<()> {
    if value.trim().is_empty() {
        return Err(DirectoryError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn get_namespace(&self, id: &str) -> DirectoryResult<NamespaceInfo> {
        self.ensure_open()?;
        validate("namespace id", id)?;
        self.namespaces
            .get(id)
            .map(|n| n.clone())
            .ok_or_else(|| DirectoryError::NamespaceNotFound(id.to_string()))
    }

    async fn create_namespace(&self, name: &str) -> DirectoryResult<OperationId> {
        self.ensure_open()?;
        validate("namespace name", name)?;
        if self.namespaces.contains_key(name) {
            return Err(DirectoryError::NamespaceAlreadyExists(name.to_string()));
        }

        self.insert_namespace(name);
        let operation = OperationId::generate();
        self.operations
            .insert(operation.clone(), OperationStatus::Success);
        debug!(namespace = %name, operation = %operation, "Namespace created");
        Ok(operation)
    }

    async fn get_operation(&self, id: &OperationId) -> DirectoryResult<OperationStatus> {
        self.ensure_open()?;
        self.operations
            .get(id)
            .map(|s| *s)
            .ok_or_else(|| DirectoryError::OperationNotFound(id.to_string()))
    }

    async fn get_service(&self, id: &str) -> DirectoryResult<ServiceInfo> {
        self.ensure_open()?;
        validate("service id", id)?;
        self.services
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| DirectoryError::ServiceNotFound(id.to_string()))
    }

    async fn create_service(&self, namespace_id: &str, name: &str) -> DirectoryResult<ServiceInfo> {
        self.ensure_open()?;
        validate("namespace id", namespace_id)?;
        validate("service name", name)?;

        if !self.namespaces.contains_key(namespace_id) {
            return Err(DirectoryError::NamespaceNotFound(namespace_id.to_string()));
        }
        if self.services.contains_key(name) {
            return Err(DirectoryError::ServiceAlreadyExists(name.to_string()));
        }
        if let Some(limit) = self.service_limit {
            if self.services.len() >= limit {
                return Err(DirectoryError::ResourceLimitExceeded(format!(
                    "at most {} services allowed",
                    limit
                )));
            }
        }

        let service = ServiceInfo {
            id: name.to_string(),
            name: name.to_string(),
            namespace_id: namespace_id.to_string(),
            created_at: Utc::now(),
        };
        self.services.insert(service.id.clone(), service.clone());
        debug!(namespace = %namespace_id, service = %name, "Service created");
        Ok(service)
    }

    async fn register_instance(
        &self,
        service_id: &str,
        instance_id: &str,
        attributes: &HashMap<String, String>,
    ) -> DirectoryResult<()> {
        self.ensure_open()?;
        validate("service id", service_id)?;
        validate("instance id", instance_id)?;
        self.ensure_service(service_id)?;

        self.instances
            .entry((service_id.to_string(), instance_id.to_string()))
            .and_modify(|record| record.attributes = attributes.clone())
            .or_insert_with(|| InstanceRecord {
                attributes: attributes.clone(),
                health: HealthStatus::Healthy,
            });
        Ok(())
    }

    async fn deregister_instance(&self, service_id: &str, instance_id: &str) -> DirectoryResult<()> {
        self.ensure_open()?;
        self.ensure_service(service_id)?;
        self.instances
            .remove(&(service_id.to_string(), instance_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| DirectoryError::InstanceNotFound(instance_id.to_string()))
    }

    async fn get_instances_health_status(
        &self,
        service_id: &str,
        instance_ids: &[String],
    ) -> DirectoryResult<HashMap<String, String>> {
        self.ensure_open()?;
        self.ensure_service(service_id)?;

        let mut statuses = HashMap::new();
        for instance_id in instance_ids {
            if let Some(record) = self
                .instances
                .get(&(service_id.to_string(), instance_id.clone()))
            {
                statuses.insert(instance_id.clone(), record.health.as_code().to_string());
            }
        }
        Ok(statuses)
    }

    async fn discover_instances(
        &self,
        namespace: &str,
        service_name: &str,
        health_filter: HealthStatusFilter,
    ) -> DirectoryResult<Vec<DiscoveredInstance>> {
        self.ensure_open()?;
        if !self.namespaces.contains_key(namespace) {
            return Err(DirectoryError::NamespaceNotFound(namespace.to_string()));
        }
        match self.services.get(service_name) {
            Some(service) if service.namespace_id == namespace => {}
            _ => return Err(DirectoryError::ServiceNotFound(service_name.to_string())),
        }

        let mut found: Vec<DiscoveredInstance> = self
            .instances
            .iter()
            .filter(|entry| entry.key().0 == service_name)
            .filter(|entry| health_filter.matches(entry.value().health.as_code()))
            .map(|entry| DiscoveredInstance {
                instance_id: entry.key().1.clone(),
                service_id: service_name.to_string(),
                namespace_id: namespace.to_string(),
                attributes: entry.value().attributes.clone(),
            })
            .collect();
        found.sort_by(|a, b| a.instance_id.cmp(&b.instance_id));
        Ok(found)
    }

    async fn list_services(&self, namespace_id: &str) -> DirectoryResult<Vec<String>> {
        self.ensure_open()?;
        let mut names: Vec<String> = self
            .services
            .iter()
            .filter(|s| s.namespace_id == namespace_id)
            .map(|s| s.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}
