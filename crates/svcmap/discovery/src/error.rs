//! Error types for svcmap-discovery.

use svcmap_directory::DirectoryError;
use thiserror::Error;

/// Errors raised by discovery queries.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Directory query failed.
    #[error("directory query failed: {0}")]
    Directory(#[from] DirectoryError),

    /// Discovery was not configured with a namespace.
    #[error("no namespace configured for discovery")]
    NamespaceNotConfigured,
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
