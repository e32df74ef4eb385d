//! Error types for svcmap-agent

use svcmap_discovery::DiscoveryError;
use svcmap_registry::RegistryError;
use thiserror::Error;

/// Agent-level errors
#[derive(Debug, Error)]
pub enum AgentError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration sources could not be read or merged
    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    /// Registration engine error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Discovery query error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
