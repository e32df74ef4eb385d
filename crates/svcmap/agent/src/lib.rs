//! svcmap Agent - Registers the local process with a service directory
//!
//! The agent wires the engine together for one process:
//! - Builds the local registration from [`AgentConfig`]
//! - Registers on [`Agent::start`] and deregisters on [`Agent::stop`]
//! - Exposes discovery and aggregated health over the same directory

pub mod config;
pub mod error;
pub mod logging;
pub mod registration;

use std::future::Future;
use std::sync::Arc;

use svcmap_directory::DirectoryClient;
use svcmap_discovery::{
    AggregateHealth, DirectoryHealthIndicator, DirectoryServiceDiscovery, HealthAggregator,
    ServiceDiscovery,
};
use svcmap_registry::{
    AutoServiceRegistration, RegistrationCoordinator, RegistrationEvent, ServiceRegistry,
};
use svcmap_types::{HealthStatus, Registration};
use tokio::sync::broadcast;
use tracing::{info, warn};

pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};

/// One process's registration, discovery and health over a directory.
pub struct Agent {
    registry: Arc<RegistrationCoordinator>,
    lifecycle: AutoServiceRegistration,
    discovery: DirectoryServiceDiscovery,
    health: HealthAggregator,
}

impl Agent {
    /// Validate `config` and wire the engine over `client`.
    ///
    /// `fallback_host` is advertised when the configuration names no host.
    pub fn new(
        config: &AgentConfig,
        client: Arc<dyn DirectoryClient>,
        fallback_host: &str,
    ) -> AgentResult<Self> {
        config.validate()?;

        let namespace = config.registry.service.namespace.clone();
        let registry = Arc::new(RegistrationCoordinator::with_wait_config(
            Arc::clone(&client),
            config.registry.wait.clone(),
        ));

        let registration = registration::build_registration(config, fallback_host);
        let registry_dyn: Arc<dyn ServiceRegistry> = registry.clone();
        let lifecycle = AutoServiceRegistration::new(registry_dyn, registration)
            .with_register_enabled(config.registry.enabled && config.registry.register);

        let discovery = DirectoryServiceDiscovery::new(Arc::clone(&client), namespace.clone());
        let health = HealthAggregator::new()
            .with_indicator(Arc::new(DirectoryHealthIndicator::new(client, namespace)));

        Ok(Self {
            registry,
            lifecycle,
            discovery,
            health,
        })
    }

    pub fn registration(&self) -> &Registration {
        self.lifecycle.registration()
    }

    pub fn is_registered(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn discovery(&self) -> &DirectoryServiceDiscovery {
        &self.discovery
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistrationEvent> {
        self.lifecycle.subscribe()
    }

    /// Register the local instance.
    pub async fn start(&self) -> AgentResult<()> {
        self.lifecycle.start().await?;
        Ok(())
    }

    /// Directory-reported status of the local instance.
    pub async fn status(&self) -> AgentResult<HealthStatus> {
        Ok(self.registry.get_status(self.registration()).await?)
    }

    pub async fn health(&self) -> AggregateHealth {
        self.health.check().await
    }

    /// Log what the namespace holds and the local instance's status.
    pub async fn report(&self) -> AgentResult<()> {
        let service_id = self.registration().service_id();
        let services = self.discovery.get_services().await?;
        info!(
            description = self.discovery.description(),
            services = ?services,
            "Namespace services"
        );

        let instances = self.discovery.get_instances(service_id).await?;
        for instance in &instances {
            info!(instance_id = %instance.instance_id(), uri = %instance.uri(), "Discovered instance");
        }

        let status = self.status().await?;
        let health = self.health().await;
        info!(status = %status, health = %health.status, "Registration active");
        Ok(())
    }

    /// Register, report, wait for `shutdown`, then deregister and close.
    ///
    /// Directory failures are logged and never skip the stop path.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if let Err(e) = self.start().await {
            warn!(error = %e, "Service registration failed");
        }

        if self.is_registered() {
            if let Err(e) = self.report().await {
                warn!(error = %e, "Could not query the directory after registering");
            }
        }

        shutdown.await;
        info!("Shutdown signal received");

        if let Err(e) = self.stop().await {
            warn!(error = %e, "Deregistration failed");
        }
    }

    /// Deregister, then release the directory client.
    pub async fn stop(&self) -> AgentResult<()> {
        let result = self.lifecycle.stop().await;
        self.registry.close();
        info!("Agent stopped");
        result.map_err(AgentError::from)
    }
}
