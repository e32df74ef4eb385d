//! Registration = instance + auto-creation policy
//!
//! A Registration is what the lifecycle owner hands to the registry. It is
//! created once at startup and only borrowed by each register/deregister call.

use crate::instance::ServiceInstance;
use serde::{Deserialize, Serialize};

/// A service instance plus the policy for creating its parents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    instance: ServiceInstance,

    /// Create the namespace when it does not exist
    pub create_namespace: bool,

    /// Create the service when it does not exist
    pub create_service: bool,
}

impl Registration {
    /// Wrap an instance with the default policy: never create namespaces,
    /// create services on demand.
    pub fn new(instance: ServiceInstance) -> Self {
        Self {
            instance,
            create_namespace: false,
            create_service: true,
        }
    }

    pub fn with_policy(
        instance: ServiceInstance,
        create_namespace: bool,
        create_service: bool,
    ) -> Self {
        Self {
            instance,
            create_namespace,
            create_service,
        }
    }

    pub fn instance(&self) -> &ServiceInstance {
        &self.instance
    }

    pub fn instance_id(&self) -> &str {
        self.instance.instance_id()
    }

    pub fn service_id(&self) -> &str {
        self.instance.service_id()
    }

    pub fn namespace(&self) -> &str {
        self.instance.namespace()
    }

    pub fn port(&self) -> i32 {
        self.instance.port()
    }

    pub fn uri(&self) -> String {
        self.instance.uri()
    }

    /// Only instances with an assigned port may be registered.
    pub fn is_eligible(&self) -> bool {
        self.instance.port() > 0
    }
}
