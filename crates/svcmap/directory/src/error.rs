//! Directory provider error taxonomy

use thiserror::Error;

/// Errors reported by a directory provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("instance not found: {0}")]
    InstanceNotFound(String),

    #[error("operation not found: {0}")]
    OperationNotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    #[error("namespace already exists: {0}")]
    NamespaceAlreadyExists(String),

    #[error("service already exists: {0}")]
    ServiceAlreadyExists(String),

    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("directory client has been shut down")]
    Shutdown,
}

impl DirectoryError {
    /// The requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DirectoryError::NamespaceNotFound(_)
                | DirectoryError::ServiceNotFound(_)
                | DirectoryError::InstanceNotFound(_)
                | DirectoryError::OperationNotFound(_)
        )
    }

    /// A create call raced with another creator
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            DirectoryError::NamespaceAlreadyExists(_) | DirectoryError::ServiceAlreadyExists(_)
        )
    }
}

/// Result type for directory calls
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;
