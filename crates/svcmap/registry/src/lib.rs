//! svcmap Registry - Registration reconciliation engine
//!
//! Given a [`Registration`](svcmap_types::Registration), the engine makes the
//! directory hold it:
//!
//! - **ResourceExistenceChecker**: checks for the namespace and service
//! - **AsyncOperationWaiter**: waits on provider-side asynchronous creates
//! - **RegistrationCoordinator**: creates what is missing (when policy
//!   allows) and submits the instance
//! - **HealthStatusTranslator**: provider health strings to `HealthStatus`
//!
//! ## Lifecycle
//!
//! [`AutoServiceRegistration`] wraps the coordinator with an explicit
//! `start`/`stop` pair for the owning process.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use svcmap_directory::InMemoryDirectory;
//! use svcmap_registry::{RegistrationCoordinator, ServiceRegistry};
//!
//! let registry = RegistrationCoordinator::new(Arc::new(InMemoryDirectory::new()));
//! registry.register(&registration).await?;
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod existence;
pub mod health;
pub mod lifecycle;
pub mod registry;
pub mod waiter;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use config::{InstanceConfig, RegistryConfig, ServiceConfig, WaitConfig};
pub use coordinator::RegistrationCoordinator;
pub use error::{ErrorKind, RegistryError, RegistryResult};
pub use existence::ResourceExistenceChecker;
pub use health::HealthStatusTranslator;
pub use lifecycle::{AutoServiceRegistration, RegistrationEvent};
pub use registry::ServiceRegistry;
pub use waiter::{AsyncOperationWaiter, WaitPolicy};
