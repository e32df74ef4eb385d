//! Namespace and service existence checks.
//!
//! A check is a get-by-id call whose error decides the answer:
//!
//! - not found: the resource is missing
//! - invalid input: logged, then treated as present (fail open, so no create
//!   is attempted against malformed input)
//! - anything else: propagated unmodified

use std::sync::Arc;

use svcmap_directory::{DirectoryClient, DirectoryError, DirectoryResult};
use tracing::warn;

use crate::error::{RegistryError, RegistryResult};

/// Checks the directory for namespaces and services.
pub struct ResourceExistenceChecker {
    client: Arc<dyn DirectoryClient>,
}

impl ResourceExistenceChecker {
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self { client }
    }

    pub async fn namespace_exists(&self, id: &str) -> RegistryResult<bool> {
        let lookup = self.client.get_namespace(id).await.map(|_| ());
        interpret("namespace", id, lookup)
    }

    pub async fn service_exists(&self, id: &str) -> RegistryResult<bool> {
        let lookup = self.client.get_service(id).await.map(|_| ());
        interpret("service", id, lookup)
    }
}

fn interpret(resource: &str, id: &str, lookup: DirectoryResult<()>) -> RegistryResult<bool> {
    match lookup {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(DirectoryError::InvalidInput(reason)) => {
            warn!(
                resource = resource,
                id = %id,
                reason = %reason,
                "Invalid input when looking up {}, assuming it exists",
                resource
            );
            Ok(true)
        }
        Err(e) => Err(RegistryError::Directory(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedDirectory;

    fn checker(directory: &Arc<ScriptedDirectory>) -> ResourceExistenceChecker {
        ResourceExistenceChecker::new(directory.clone())
    }

    #[tokio::test]
    async fn test_existing_namespace() {
        let directory = Arc::new(ScriptedDirectory::new().with_namespace("prod"));
        assert!(checker(&directory).namespace_exists("prod").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_namespace() {
        let directory = Arc::new(ScriptedDirectory::new());
        assert!(!checker(&directory).namespace_exists("prod").await.unwrap());
    }

    // Fail-open on InvalidInput is intentional: the lookup answers "exists"
    // so that no create call is issued with malformed input.
    #[tokio::test]
    async fn test_invalid_input_fails_open() {
        let directory = Arc::new(
            ScriptedDirectory::new()
                .with_namespace_lookup_error(DirectoryError::InvalidInput("bad id".into()))
                .with_service_lookup_error(DirectoryError::InvalidInput("bad id".into())),
        );
        let checker = checker(&directory);

        assert!(checker.namespace_exists("??").await.unwrap());
        assert!(checker.service_exists("??").await.unwrap());
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let directory = Arc::new(
            ScriptedDirectory::new()
                .with_service_lookup_error(DirectoryError::Unavailable("throttled".into())),
        );

        let err = checker(&directory)
            .service_exists("orders")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Directory(DirectoryError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_service_lookup() {
        let directory = Arc::new(
            ScriptedDirectory::new()
                .with_namespace("prod")
                .with_service("orders"),
        );
        let checker = checker(&directory);

        assert!(checker.service_exists("orders").await.unwrap());
        assert!(!checker.service_exists("billing").await.unwrap());
    }
}
