//! svcmap Types - Core types for directory-backed service registration
//!
//! A service directory partitions its state into three levels:
//!
//! - **Namespace**: top-level partition owned by the directory provider
//! - **Service**: a named collection of instances inside a namespace
//! - **Instance**: one reachable process endpoint inside a service
//!
//! This crate holds the values that travel between those levels and the
//! engine: the immutable [`ServiceInstance`], the [`Registration`] policy
//! wrapper, the raw [`DiscoveredInstance`] record, and the three-valued
//! [`HealthStatus`].

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod attributes;
pub mod discovered;
pub mod health;
pub mod instance;
pub mod registration;

// Re-export main types
pub use attributes::registration_attributes;
pub use discovered::DiscoveredInstance;
pub use health::HealthStatus;
pub use instance::{ServiceInstance, ServiceInstanceBuilder, DEFAULT_CONTEXT_PATH, UNASSIGNED_PORT};
pub use registration::Registration;
