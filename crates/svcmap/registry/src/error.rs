//! Error types for svcmap-registry.
//!
//! Every failure the engine surfaces carries one [`ErrorKind`]. None of them
//! is retried internally; the only local recoveries are the fail-open
//! existence check and swallowing `AlreadyExists` on create.

use std::time::Duration;

use svcmap_directory::DirectoryError;
use thiserror::Error;

/// Classification of registry failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidConfiguration,
    QuotaExceeded,
    AlreadyExists,
    PolicyViolation,
    Inconsistent,
    OperationTimeout,
    OperationCancelled,
    OperationFailed,
    NotSupported,
    RegistrationFailed,
    DeregistrationFailed,
    Provider,
    Closed,
}

/// Errors raised by registration, deregistration and status calls.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Create request rejected as malformed.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
        #[source]
        source: Option<DirectoryError>,
    },

    /// Provider resource limits reached.
    #[error(
        "could not create {resource}: provider resource limit exceeded; \
         request a limit increase from the directory provider"
    )]
    QuotaExceeded {
        resource: String,
        #[source]
        source: DirectoryError,
    },

    /// Resource is missing and policy forbids creating it.
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    /// A resource that must exist vanished mid-flow.
    #[error("inconsistent directory state: {message}")]
    Inconsistent {
        message: String,
        #[source]
        source: DirectoryError,
    },

    /// An asynchronous operation or bounded wait ran past its deadline.
    #[error("{operation} did not complete within {}ms", .timeout.as_millis())]
    OperationTimeout { operation: String, timeout: Duration },

    /// The provider cancelled an asynchronous operation.
    #[error("{operation} was cancelled by the directory")]
    OperationCancelled { operation: String },

    /// An asynchronous operation reached the FAIL state.
    #[error("{operation} failed in the directory")]
    OperationFailed { operation: String },

    /// Operation the directory model does not allow.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Provider rejected the instance registration.
    #[error("failed to register instance {instance_id} of service {service_id}")]
    RegistrationFailed {
        service_id: String,
        instance_id: String,
        #[source]
        source: DirectoryError,
    },

    /// Provider rejected the instance deregistration.
    #[error("failed to deregister instance {instance_id} of service {service_id}")]
    DeregistrationFailed {
        service_id: String,
        instance_id: String,
        #[source]
        source: DirectoryError,
    },

    /// Directory error propagated unmodified.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Registry was closed.
    #[error("registry has been closed")]
    Closed,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
            RegistryError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            RegistryError::PolicyViolation(_) => ErrorKind::PolicyViolation,
            RegistryError::Inconsistent { .. } => ErrorKind::Inconsistent,
            RegistryError::OperationTimeout { .. } => ErrorKind::OperationTimeout,
            RegistryError::OperationCancelled { .. } => ErrorKind::OperationCancelled,
            RegistryError::OperationFailed { .. } => ErrorKind::OperationFailed,
            RegistryError::NotSupported(_) => ErrorKind::NotSupported,
            RegistryError::RegistrationFailed { .. } => ErrorKind::RegistrationFailed,
            RegistryError::DeregistrationFailed { .. } => ErrorKind::DeregistrationFailed,
            RegistryError::Directory(e) if e.is_not_found() => ErrorKind::NotFound,
            RegistryError::Directory(e) if e.is_already_exists() => ErrorKind::AlreadyExists,
            RegistryError::Directory(DirectoryError::InvalidInput(_)) => {
                ErrorKind::InvalidConfiguration
            }
            RegistryError::Directory(_) => ErrorKind::Provider,
            RegistryError::Closed => ErrorKind::Closed,
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message_carries_remediation_hint() {
        let err = RegistryError::QuotaExceeded {
            resource: "service orders".into(),
            source: DirectoryError::ResourceLimitExceeded("100 services".into()),
        };
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert!(err.to_string().contains("limit increase"));
    }

    #[test]
    fn test_directory_errors_classified() {
        let not_found = RegistryError::from(DirectoryError::NamespaceNotFound("prod".into()));
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let unavailable = RegistryError::from(DirectoryError::Unavailable("reset".into()));
        assert_eq!(unavailable.kind(), ErrorKind::Provider);
    }

    #[test]
    fn test_timeout_message() {
        let err = RegistryError::OperationTimeout {
            operation: "instance registration".into(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "instance registration did not complete within 30000ms"
        );
    }
}
