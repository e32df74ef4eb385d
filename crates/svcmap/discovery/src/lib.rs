//! svcmap Discovery - Read path over the service directory
//!
//! - **ServiceInstanceResolver**: raw directory records to typed instances
//! - **ServiceDiscovery**: list instances of a service and services of the
//!   configured namespace
//! - **HealthAggregator**: named health indicators folded into one status

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod client;
pub mod error;
pub mod health;
pub mod resolver;

// Re-exports
pub use client::{DirectoryServiceDiscovery, ServiceDiscovery, DESCRIPTION};
pub use error::{DiscoveryError, DiscoveryResult};
pub use health::{
    AggregateHealth, DirectoryHealthIndicator, HealthAggregator, HealthIndicator, HealthReport,
    DIRECTORY_INDICATOR,
};
pub use resolver::ServiceInstanceResolver;
