//! Scripted, call-counting directory client for tests.
//!
//! Every capability can be told to succeed, fail with a given error, or never
//! complete, and every call is counted so tests can assert exactly which
//! provider calls a flow issued.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use svcmap_directory::{
    DirectoryClient, DirectoryError, DirectoryResult, HealthStatusFilter, NamespaceInfo,
    OperationId, OperationStatus, ServiceInfo,
};
use svcmap_types::DiscoveredInstance;

/// How a scripted call completes.
#[derive(Debug, Clone, Default)]
pub enum CallBehavior {
    #[default]
    Succeed,
    Fail(DirectoryError),
    /// The returned future never resolves.
    Hang,
}

/// Snapshot of how often each capability was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_namespace: usize,
    pub create_namespace: usize,
    pub get_operation: usize,
    pub get_service: usize,
    pub create_service: usize,
    pub register_instance: usize,
    pub deregister_instance: usize,
    pub get_instances_health_status: usize,
    pub discover_instances: usize,
    pub list_services: usize,
    pub shutdown: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.get_namespace
            + self.create_namespace
            + self.get_operation
            + self.get_service
            + self.create_service
            + self.register_instance
            + self.deregister_instance
            + self.get_instances_health_status
            + self.discover_instances
            + self.list_services
            + self.shutdown
    }
}

#[derive(Default)]
struct Counters {
    get_namespace: AtomicUsize,
    create_namespace: AtomicUsize,
    get_operation: AtomicUsize,
    get_service: AtomicUsize,
    create_service: AtomicUsize,
    register_instance: AtomicUsize,
    deregister_instance: AtomicUsize,
    get_instances_health_status: AtomicUsize,
    discover_instances: AtomicUsize,
    list_services: AtomicUsize,
    shutdown: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn complete(behavior: CallBehavior) -> DirectoryResult<()> {
    match behavior {
        CallBehavior::Succeed => Ok(()),
        CallBehavior::Fail(e) => Err(e),
        CallBehavior::Hang => std::future::pending().await,
    }
}

/// Directory test double with scripted outcomes.
#[derive(Default)]
pub struct ScriptedDirectory {
    namespaces: Mutex<HashSet<String>>,
    services: Mutex<HashSet<String>>,
    namespace_lookup_error: Option<DirectoryError>,
    service_lookup_error: Option<DirectoryError>,
    create_namespace_error: Option<DirectoryError>,
    create_service_error: Option<DirectoryError>,
    operation_error: Option<DirectoryError>,
    operation_script: Mutex<VecDeque<OperationStatus>>,
    register_behavior: CallBehavior,
    deregister_behavior: CallBehavior,
    health: HashMap<String, String>,
    health_error: Option<DirectoryError>,
    registered: Mutex<Vec<(String, String, HashMap<String, String>)>>,
    counters: Counters,
}

impl ScriptedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(self, id: &str) -> Self {
        lock(&self.namespaces).insert(id.to_string());
        self
    }

    pub fn with_service(self, id: &str) -> Self {
        lock(&self.services).insert(id.to_string());
        self
    }

    pub fn with_namespace_lookup_error(mut self, error: DirectoryError) -> Self {
        self.namespace_lookup_error = Some(error);
        self
    }

    pub fn with_service_lookup_error(mut self, error: DirectoryError) -> Self {
        self.service_lookup_error = Some(error);
        self
    }

    pub fn with_create_namespace_error(mut self, error: DirectoryError) -> Self {
        self.create_namespace_error = Some(error);
        self
    }

    pub fn with_create_service_error(mut self, error: DirectoryError) -> Self {
        self.create_service_error = Some(error);
        self
    }

    pub fn with_operation_error(mut self, error: DirectoryError) -> Self {
        self.operation_error = Some(error);
        self
    }

    /// Statuses returned by successive `get_operation` calls. The last one
    /// repeats forever; with no script every operation reports `Success`.
    pub fn with_operation_script(self, statuses: impl IntoIterator<Item = OperationStatus>) -> Self {
        *lock(&self.operation_script) = statuses.into_iter().collect();
        self
    }

    pub fn with_register_behavior(mut self, behavior: CallBehavior) -> Self {
        self.register_behavior = behavior;
        self
    }

    pub fn with_deregister_behavior(mut self, behavior: CallBehavior) -> Self {
        self.deregister_behavior = behavior;
        self
    }

    pub fn with_health(mut self, instance_id: &str, status: &str) -> Self {
        self.health
            .insert(instance_id.to_string(), status.to_string());
        self
    }

    pub fn with_health_error(mut self, error: DirectoryError) -> Self {
        self.health_error = Some(error);
        self
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            get_namespace: c.get_namespace.load(Ordering::SeqCst),
            create_namespace: c.create_namespace.load(Ordering::SeqCst),
            get_operation: c.get_operation.load(Ordering::SeqCst),
            get_service: c.get_service.load(Ordering::SeqCst),
            create_service: c.create_service.load(Ordering::SeqCst),
            register_instance: c.register_instance.load(Ordering::SeqCst),
            deregister_instance: c.deregister_instance.load(Ordering::SeqCst),
            get_instances_health_status: c.get_instances_health_status.load(Ordering::SeqCst),
            discover_instances: c.discover_instances.load(Ordering::SeqCst),
            list_services: c.list_services.load(Ordering::SeqCst),
            shutdown: c.shutdown.load(Ordering::SeqCst),
        }
    }

    /// (service id, instance id, attributes) of every registration submitted.
    pub fn registered(&self) -> Vec<(String, String, HashMap<String, String>)> {
        lock(&self.registered).clone()
    }

    pub fn has_namespace(&self, id: &str) -> bool {
        lock(&self.namespaces).contains(id)
    }

    pub fn has_service(&self, id: &str) -> bool {
        lock(&self.services).contains(id)
    }
}

#[async_trait]
impl DirectoryClient for ScriptedDirectory {
    async fn get_namespace(&self, id: &str) -> DirectoryResult<NamespaceInfo> {
        bump(&self.counters.get_namespace);
        if let Some(e) = &self.namespace_lookup_error {
            return Err(e.clone());
        }
        if lock(&self.namespaces).contains(id) {
            Ok(NamespaceInfo {
                id: id.to_string(),
                name: id.to_string(),
                created_at: Utc::now(),
            })
        } else {
            Err(DirectoryError::NamespaceNotFound(id.to_string()))
        }
    }

    async fn create_namespace(&self, name: &str) -> DirectoryResult<OperationId> {
        bump(&self.counters.create_namespace);
        if let Some(e) = &self.create_namespace_error {
            return Err(e.clone());
        }
        lock(&self.namespaces).insert(name.to_string());
        Ok(OperationId::generate())
    }

    async fn get_operation(&self, _id: &OperationId) -> DirectoryResult<OperationStatus> {
        bump(&self.counters.get_operation);
        if let Some(e) = &self.operation_error {
            return Err(e.clone());
        }
        let mut script = lock(&self.operation_script);
        let status = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().copied()
        };
        Ok(status.unwrap_or(OperationStatus::Success))
    }

    async fn get_service(&self, id: &str) -> DirectoryResult<ServiceInfo> {
        bump(&self.counters.get_service);
        if let Some(e) = &self.service_lookup_error {
            return Err(e.clone());
        }
        if lock(&self.services).contains(id) {
            Ok(ServiceInfo {
                id: id.to_string(),
                name: id.to_string(),
                namespace_id: String::new(),
                created_at: Utc::now(),
            })
        } else {
            Err(DirectoryError::ServiceNotFound(id.to_string()))
        }
    }

    async fn create_service(&self, namespace_id: &str, name: &str) -> DirectoryResult<ServiceInfo> {
        bump(&self.counters.create_service);
        if let Some(e) = &self.create_service_error {
            return Err(e.clone());
        }
        lock(&self.services).insert(name.to_string());
        Ok(ServiceInfo {
            id: name.to_string(),
            name: name.to_string(),
            namespace_id: namespace_id.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn register_instance(
        &self,
        service_id: &str,
        instance_id: &str,
        attributes: &HashMap<String, String>,
    ) -> DirectoryResult<()> {
        bump(&self.counters.register_instance);
        lock(&self.registered).push((
            service_id.to_string(),
            instance_id.to_string(),
            attributes.clone(),
        ));
        complete(self.register_behavior.clone()).await
    }

    async fn deregister_instance(&self, _service_id: &str, _instance_id: &str) -> DirectoryResult<()> {
        bump(&self.counters.deregister_instance);
        complete(self.deregister_behavior.clone()).await
    }

    async fn get_instances_health_status(
        &self,
        _service_id: &str,
        instance_ids: &[String],
    ) -> DirectoryResult<HashMap<String, String>> {
        bump(&self.counters.get_instances_health_status);
        if let Some(e) = &self.health_error {
            return Err(e.clone());
        }
        Ok(instance_ids
            .iter()
            .filter_map(|id| self.health.get(id).map(|s| (id.clone(), s.clone())))
            .collect())
    }

    async fn discover_instances(
        &self,
        _namespace: &str,
        _service_name: &str,
        _health_filter: HealthStatusFilter,
    ) -> DirectoryResult<Vec<DiscoveredInstance>> {
        bump(&self.counters.discover_instances);
        Ok(Vec::new())
    }

    async fn list_services(&self, _namespace_id: &str) -> DirectoryResult<Vec<String>> {
        bump(&self.counters.list_services);
        let mut names: Vec<String> = lock(&self.services).iter().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn shutdown(&self) {
        bump(&self.counters.shutdown);
    }
}
