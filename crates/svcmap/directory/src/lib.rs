//! svcmap Directory - Capability interface over the directory provider
//!
//! The directory provider is the system of record for namespace, service and
//! instance state. This crate defines what the engine needs from it:
//!
//! - **DirectoryClient**: the provider capability set, one async method per call
//! - **OperationStatus**: lifecycle of provider-side asynchronous operations
//! - **DirectoryError**: the provider's error taxonomy
//!
//! ## In-Memory Provider
//!
//! [`InMemoryDirectory`] implements the full capability set and is suitable for
//! development, local runs and tests. Real providers implement the same trait.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod client;
pub mod error;
pub mod memory;
pub mod operation;

// Re-exports
pub use client::{DirectoryClient, HealthStatusFilter, NamespaceInfo, ServiceInfo};
pub use error::{DirectoryError, DirectoryResult};
pub use memory::InMemoryDirectory;
pub use operation::{OperationId, OperationStatus};
