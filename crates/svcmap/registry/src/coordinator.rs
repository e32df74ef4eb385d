//! Registration reconciliation.
//!
//! Per `register` call, terminal on the first error:
//!
//! ```text
//! CheckNamespace
//!   exists                          -> CheckService
//!   missing, create_namespace=false -> PolicyViolation
//!   missing, create_namespace=true  -> CreateNamespace -> wait -> CheckService
//! CheckService
//!   exists                          -> SubmitInstance
//!   missing, create_service=false   -> PolicyViolation
//!   missing, create_service=true    -> CreateService -> SubmitInstance
//! SubmitInstance (bounded wait)     -> done
//! ```
//!
//! At most one create attempt is made per missing resource per call. Nothing
//! about the registration is retained between calls; the directory is the
//! source of truth.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use svcmap_directory::{DirectoryClient, DirectoryError, OperationStatus};
use svcmap_types::{registration_attributes, HealthStatus, Registration};
use tracing::{debug, info, instrument};

use crate::config::WaitConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::existence::ResourceExistenceChecker;
use crate::health::HealthStatusTranslator;
use crate::registry::ServiceRegistry;
use crate::waiter::{AsyncOperationWaiter, WaitPolicy};

const NAMESPACE_CREATION: &str = "namespace creation";
const INSTANCE_REGISTRATION: &str = "instance registration";
const INSTANCE_DEREGISTRATION: &str = "instance deregistration";

/// [`ServiceRegistry`] implementation over a [`DirectoryClient`].
pub struct RegistrationCoordinator {
    client: Arc<dyn DirectoryClient>,
    checker: ResourceExistenceChecker,
    waiter: AsyncOperationWaiter,
    wait: WaitConfig,
    closed: AtomicBool,
}

impl RegistrationCoordinator {
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self::with_wait_config(client, WaitConfig::default())
    }

    pub fn with_wait_config(client: Arc<dyn DirectoryClient>, wait: WaitConfig) -> Self {
        Self {
            checker: ResourceExistenceChecker::new(Arc::clone(&client)),
            waiter: AsyncOperationWaiter::new(Arc::clone(&client)),
            client,
            wait,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> RegistryResult<()> {
        if self.is_closed() {
            Err(RegistryError::Closed)
        } else {
            Ok(())
        }
    }

    #[instrument(
        skip(self, registration),
        fields(service_id = %registration.service_id(), instance_id = %registration.instance_id())
    )]
    async fn reconcile(&self, registration: &Registration) -> RegistryResult<()> {
        self.ensure_open()?;

        if !registration.is_eligible() {
            return Err(RegistryError::PolicyViolation(format!(
                "instance {} has no assigned port ({})",
                registration.instance_id(),
                registration.port()
            )));
        }

        self.ensure_namespace(registration).await?;
        self.ensure_service(registration).await?;
        self.submit_registration(registration).await
    }

    async fn ensure_namespace(&self, registration: &Registration) -> RegistryResult<()> {
        let namespace = registration.namespace();
        if self.checker.namespace_exists(namespace).await? {
            return Ok(());
        }

        if !registration.create_namespace {
            return Err(RegistryError::PolicyViolation(format!(
                "namespace {} does not exist and namespace creation is disabled",
                namespace
            )));
        }

        info!(namespace = %namespace, "Creating namespace");
        let operation = match self.client.create_namespace(namespace).await {
            Ok(operation) => operation,
            Err(DirectoryError::NamespaceAlreadyExists(_)) => {
                debug!(namespace = %namespace, "Namespace created concurrently");
                return Ok(());
            }
            Err(e @ DirectoryError::InvalidInput(_)) => {
                return Err(RegistryError::InvalidConfiguration {
                    message: format!("namespace {} was rejected by the directory", namespace),
                    source: Some(e),
                });
            }
            Err(e @ DirectoryError::ResourceLimitExceeded(_)) => {
                return Err(RegistryError::QuotaExceeded {
                    resource: format!("namespace {}", namespace),
                    source: e,
                });
            }
            Err(e) => return Err(RegistryError::Directory(e)),
        };

        let status = self
            .waiter
            .wait_for(&operation, NAMESPACE_CREATION, WaitPolicy::for_namespace(&self.wait))
            .await?;

        if status == OperationStatus::Fail {
            return Err(RegistryError::OperationFailed {
                operation: format!("{} for {}", NAMESPACE_CREATION, namespace),
            });
        }

        info!(namespace = %namespace, "Namespace created");
        Ok(())
    }

    async fn ensure_service(&self, registration: &Registration) -> RegistryResult<()> {
        let service_id = registration.service_id();
        if self.checker.service_exists(service_id).await? {
            return Ok(());
        }

        if !registration.create_service {
            return Err(RegistryError::PolicyViolation(format!(
                "service {} does not exist and service creation is disabled",
                service_id
            )));
        }

        let namespace = registration.namespace();
        info!(namespace = %namespace, service_id = %service_id, "Creating service");

        match self.client.create_service(namespace, service_id).await {
            Ok(service) => {
                info!(service_id = %service.id, "Service created");
                Ok(())
            }
            Err(DirectoryError::ServiceAlreadyExists(_)) => {
                debug!(service_id = %service_id, "Service created concurrently");
                Ok(())
            }
            Err(e @ DirectoryError::InvalidInput(_)) => Err(RegistryError::InvalidConfiguration {
                message: format!("service {} was rejected by the directory", service_id),
                source: Some(e),
            }),
            Err(e @ DirectoryError::ResourceLimitExceeded(_)) => {
                Err(RegistryError::QuotaExceeded {
                    resource: format!("service {}", service_id),
                    source: e,
                })
            }
            Err(e @ DirectoryError::NamespaceNotFound(_)) => Err(RegistryError::Inconsistent {
                message: format!(
                    "namespace {} disappeared while creating service {}",
                    namespace, service_id
                ),
                source: e,
            }),
            Err(e) => Err(RegistryError::Directory(e)),
        }
    }

    async fn submit_registration(&self, registration: &Registration) -> RegistryResult<()> {
        let service_id = registration.service_id();
        let instance_id = registration.instance_id();
        let attributes = registration_attributes(registration.instance());
        let timeout = self.wait.instance_operation_timeout();

        let submit = self
            .client
            .register_instance(service_id, instance_id, &attributes);

        match tokio::time::timeout(timeout, submit).await {
            Ok(Ok(())) => {
                info!(uri = %registration.uri(), "Instance registered");
                Ok(())
            }
            Ok(Err(source)) => Err(RegistryError::RegistrationFailed {
                service_id: service_id.to_string(),
                instance_id: instance_id.to_string(),
                source,
            }),
            Err(_) => Err(RegistryError::OperationTimeout {
                operation: INSTANCE_REGISTRATION.to_string(),
                timeout,
            }),
        }
    }

    #[instrument(
        skip(self, registration),
        fields(service_id = %registration.service_id(), instance_id = %registration.instance_id())
    )]
    async fn remove(&self, registration: &Registration) -> RegistryResult<()> {
        self.ensure_open()?;

        let service_id = registration.service_id();
        let instance_id = registration.instance_id();
        let timeout = self.wait.instance_operation_timeout();

        let submit = self.client.deregister_instance(service_id, instance_id);

        match tokio::time::timeout(timeout, submit).await {
            Ok(Ok(())) => {
                info!("Instance deregistered");
                Ok(())
            }
            Ok(Err(source)) => Err(RegistryError::DeregistrationFailed {
                service_id: service_id.to_string(),
                instance_id: instance_id.to_string(),
                source,
            }),
            Err(_) => Err(RegistryError::OperationTimeout {
                operation: INSTANCE_DEREGISTRATION.to_string(),
                timeout,
            }),
        }
    }
}

#[async_trait]
impl ServiceRegistry for RegistrationCoordinator {
    async fn register(&self, registration: &Registration) -> RegistryResult<()> {
        self.reconcile(registration).await
    }

    async fn deregister(&self, registration: &Registration) -> RegistryResult<()> {
        self.remove(registration).await
    }

    async fn set_status(
        &self,
        registration: &Registration,
        status: HealthStatus,
    ) -> RegistryResult<()> {
        Err(RegistryError::NotSupported(format!(
            "cannot set status {} on instance {}: the directory does not accept status updates",
            status,
            registration.instance_id()
        )))
    }

    async fn get_status(&self, registration: &Registration) -> RegistryResult<HealthStatus> {
        self.ensure_open()?;

        let instance_id = registration.instance_id();
        let statuses = self
            .client
            .get_instances_health_status(registration.service_id(), &[instance_id.to_string()])
            .await?;

        Ok(HealthStatusTranslator::from_map(&statuses, instance_id))
    }

    fn close(&self) {
        if self
            .closed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.client.shutdown();
            info!("Registry closed");
        }
    }
}
