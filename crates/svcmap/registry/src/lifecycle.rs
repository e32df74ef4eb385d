//! Start/stop lifecycle for the local instance's registration.
//!
//! The owning process calls [`AutoServiceRegistration::start`] once its
//! listener is up and [`AutoServiceRegistration::stop`] during shutdown. The
//! running flag only changes through compare-and-set, so a second `start`
//! or `stop` is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use svcmap_types::Registration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::RegistryResult;
use crate::registry::ServiceRegistry;

/// Events emitted on registration state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationEvent {
    /// The instance was registered with the directory.
    Registered {
        service_id: String,
        instance_id: String,
        at: DateTime<Utc>,
    },

    /// The instance was removed from the directory.
    Deregistered {
        service_id: String,
        instance_id: String,
        at: DateTime<Utc>,
    },
}

impl RegistrationEvent {
    pub fn instance_id(&self) -> &str {
        match self {
            RegistrationEvent::Registered { instance_id, .. }
            | RegistrationEvent::Deregistered { instance_id, .. } => instance_id,
        }
    }
}

/// Drives one registration through its start/stop lifecycle.
pub struct AutoServiceRegistration {
    registry: Arc<dyn ServiceRegistry>,
    registration: Registration,
    register_enabled: bool,
    running: AtomicBool,
    event_tx: broadcast::Sender<RegistrationEvent>,
}

impl AutoServiceRegistration {
    pub fn new(registry: Arc<dyn ServiceRegistry>, registration: Registration) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            registry,
            registration,
            register_enabled: true,
            running: AtomicBool::new(false),
            event_tx,
        }
    }

    /// When disabled, `start` leaves the directory untouched.
    pub fn with_register_enabled(mut self, enabled: bool) -> Self {
        self.register_enabled = enabled;
        self
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Subscribe to registration events.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistrationEvent> {
        self.event_tx.subscribe()
    }

    /// Register the instance.
    ///
    /// An instance without an assigned port is skipped with a warning and
    /// `Ok(())`; the registration is not marked running. On failure the
    /// running flag is reverted and the error returned.
    pub async fn start(&self) -> RegistryResult<()> {
        if !self.registration.is_eligible() {
            warn!(
                instance_id = %self.registration.instance_id(),
                port = self.registration.port(),
                "No port assigned, skipping service registration"
            );
            return Ok(());
        }

        if !self.register_enabled {
            debug!("Registration disabled, not registering");
            return Ok(());
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Registration already running");
            return Ok(());
        }

        if let Err(e) = self.registry.register(&self.registration).await {
            self.running.store(false, Ordering::SeqCst);
            return Err(e);
        }

        info!(
            service_id = %self.registration.service_id(),
            instance_id = %self.registration.instance_id(),
            "Registration started"
        );
        let _ = self.event_tx.send(RegistrationEvent::Registered {
            service_id: self.registration.service_id().to_string(),
            instance_id: self.registration.instance_id().to_string(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Deregister the instance if it was registered by [`Self::start`].
    ///
    /// On failure the instance stays marked running, so `stop` can be
    /// called again to retry.
    pub async fn stop(&self) -> RegistryResult<()> {
        if self
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        if let Err(e) = self.registry.deregister(&self.registration).await {
            self.running.store(true, Ordering::SeqCst);
            return Err(e);
        }

        info!(
            service_id = %self.registration.service_id(),
            instance_id = %self.registration.instance_id(),
            "Registration stopped"
        );
        let _ = self.event_tx.send(RegistrationEvent::Deregistered {
            service_id: self.registration.service_id().to_string(),
            instance_id: self.registration.instance_id().to_string(),
            at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::RegistrationCoordinator;
    use crate::error::ErrorKind;
    use crate::testing::{CallBehavior, ScriptedDirectory};
    use svcmap_directory::{DirectoryClient, DirectoryError};
    use svcmap_types::ServiceInstance;

    fn registration(port: i32) -> Registration {
        let instance = ServiceInstance::builder()
            .instance_id("web-1")
            .service_id("web")
            .namespace("prod")
            .host("web-1.internal")
            .port(port)
            .build();
        Registration::new(instance)
    }

    fn lifecycle(directory: &Arc<ScriptedDirectory>, port: i32) -> AutoServiceRegistration {
        let client: Arc<dyn DirectoryClient> = directory.clone();
        let registry = Arc::new(RegistrationCoordinator::new(client));
        AutoServiceRegistration::new(registry, registration(port))
    }

    fn directory() -> Arc<ScriptedDirectory> {
        Arc::new(ScriptedDirectory::new().with_namespace("prod").with_service("web"))
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let directory = directory();
        let auto = lifecycle(&directory, 8080);
        let mut events = auto.subscribe();

        auto.start().await.unwrap();
        assert!(auto.is_running());
        assert!(matches!(
            events.recv().await.unwrap(),
            RegistrationEvent::Registered { .. }
        ));

        auto.stop().await.unwrap();
        assert!(!auto.is_running());
        let event = events.recv().await.unwrap();
        assert!(matches!(event, RegistrationEvent::Deregistered { .. }));
        assert_eq!(event.instance_id(), "web-1");

        let calls = directory.calls();
        assert_eq!(calls.register_instance, 1);
        assert_eq!(calls.deregister_instance, 1);
    }

    #[tokio::test]
    async fn test_unassigned_port_is_skipped() {
        let directory = directory();
        let auto = lifecycle(&directory, -1);

        auto.start().await.unwrap();

        assert!(!auto.is_running());
        assert_eq!(directory.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_register_disabled() {
        let directory = directory();
        let auto = lifecycle(&directory, 8080).with_register_enabled(false);

        auto.start().await.unwrap();

        assert!(!auto.is_running());
        assert_eq!(directory.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_second_start_is_noop() {
        let directory = directory();
        let auto = lifecycle(&directory, 8080);

        auto.start().await.unwrap();
        auto.start().await.unwrap();

        assert_eq!(directory.calls().register_instance, 1);
    }

    #[tokio::test]
    async fn test_failed_start_reverts_running_flag() {
        let directory = Arc::new(
            ScriptedDirectory::new()
                .with_namespace("prod")
                .with_service("web")
                .with_register_behavior(CallBehavior::Fail(DirectoryError::Unavailable(
                    "down".into(),
                ))),
        );
        let auto = lifecycle(&directory, 8080);

        let err = auto.start().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegistrationFailed);
        assert!(!auto.is_running());

        // Nothing was registered, so stop does not deregister.
        auto.stop().await.unwrap();
        assert_eq!(directory.calls().deregister_instance, 0);
    }

    #[tokio::test]
    async fn test_failed_stop_can_be_retried() {
        let directory = Arc::new(
            ScriptedDirectory::new()
                .with_namespace("prod")
                .with_service("web")
                .with_deregister_behavior(CallBehavior::Fail(DirectoryError::Unavailable(
                    "down".into(),
                ))),
        );
        let auto = lifecycle(&directory, 8080);
        let mut events = auto.subscribe();

        auto.start().await.unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            RegistrationEvent::Registered { .. }
        ));

        let err = auto.stop().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeregistrationFailed);
        assert!(auto.is_running());

        let err = auto.stop().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeregistrationFailed);
        assert_eq!(directory.calls().deregister_instance, 2);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let directory = directory();
        let auto = lifecycle(&directory, 8080);

        auto.stop().await.unwrap();
        assert_eq!(directory.calls().total(), 0);
    }
}
