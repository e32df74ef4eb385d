//! Registry facade consumed by the lifecycle owner.

use async_trait::async_trait;
use svcmap_types::{HealthStatus, Registration};

use crate::error::RegistryResult;

/// Register, deregister and query one instance in a service directory.
///
/// Callers serialize `register`/`deregister` for the same instance id; no
/// lock is held per registration. `close` must not race an in-flight call.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Ensure the namespace and service exist, then register the instance.
    async fn register(&self, registration: &Registration) -> RegistryResult<()>;

    /// Remove the instance. Existence is not checked first.
    async fn deregister(&self, registration: &Registration) -> RegistryResult<()>;

    /// Always fails with `NotSupported`; the directory model has no way to
    /// push an instance out of rotation.
    async fn set_status(
        &self,
        registration: &Registration,
        status: HealthStatus,
    ) -> RegistryResult<()>;

    /// Current health of the instance as reported by the directory.
    async fn get_status(&self, registration: &Registration) -> RegistryResult<HealthStatus>;

    /// Release the provider client. Idempotent.
    fn close(&self);
}
