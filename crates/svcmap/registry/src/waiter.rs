//! Waiting on provider-side asynchronous operations.
//!
//! The waiter polls operation status until it leaves `Submitted`/`Pending`
//! or the deadline passes. On timeout it stops polling; the provider may
//! still complete the operation later and nothing here observes that.

use std::sync::Arc;
use std::time::Duration;

use svcmap_directory::{DirectoryClient, OperationId, OperationStatus};
use tracing::debug;

use crate::config::WaitConfig;
use crate::error::{RegistryError, RegistryResult};

/// Poll interval and overall deadline for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub deadline: Duration,
}

impl WaitPolicy {
    pub fn new(poll_interval: Duration, deadline: Duration) -> Self {
        Self {
            poll_interval,
            deadline,
        }
    }

    /// Policy for namespace creation.
    pub fn for_namespace(config: &WaitConfig) -> Self {
        Self::new(config.namespace_poll_interval(), config.namespace_deadline())
    }
}

/// Blocks the calling flow until an operation reaches a terminal state.
pub struct AsyncOperationWaiter {
    client: Arc<dyn DirectoryClient>,
}

impl AsyncOperationWaiter {
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self { client }
    }

    /// Wait for `operation` to finish.
    ///
    /// Returns the terminal status (`Success` or `Fail`). `Cancelled` becomes
    /// [`RegistryError::OperationCancelled`], a passed deadline becomes
    /// [`RegistryError::OperationTimeout`], and status lookup errors propagate.
    pub async fn wait_for(
        &self,
        operation: &OperationId,
        description: &str,
        policy: WaitPolicy,
    ) -> RegistryResult<OperationStatus> {
        let poll = self.poll_until_terminal(operation, description, policy.poll_interval);

        match tokio::time::timeout(policy.deadline, poll).await {
            Ok(result) => result,
            Err(_) => Err(RegistryError::OperationTimeout {
                operation: description.to_string(),
                timeout: policy.deadline,
            }),
        }
    }

    async fn poll_until_terminal(
        &self,
        operation: &OperationId,
        description: &str,
        poll_interval: Duration,
    ) -> RegistryResult<OperationStatus> {
        loop {
            let status = self.client.get_operation(operation).await?;
            if !status.is_terminal() {
                debug!(
                    operation = %operation,
                    status = %status,
                    "Operation still in progress"
                );
                tokio::time::sleep(poll_interval).await;
                continue;
            }

            if status == OperationStatus::Cancelled {
                return Err(RegistryError::OperationCancelled {
                    operation: description.to_string(),
                });
            }
            return Ok(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::ScriptedDirectory;
    use svcmap_directory::DirectoryError;

    fn policy() -> WaitPolicy {
        WaitPolicy::new(Duration::from_secs(5), Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_success() {
        let directory = Arc::new(ScriptedDirectory::new().with_operation_script([
            OperationStatus::Submitted,
            OperationStatus::Pending,
            OperationStatus::Success,
        ]));
        let waiter = AsyncOperationWaiter::new(directory.clone());

        let status = waiter
            .wait_for(&OperationId::new("op-1"), "namespace creation", policy())
            .await
            .unwrap();

        assert_eq!(status, OperationStatus::Success);
        assert_eq!(directory.calls().get_operation, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_is_returned_as_terminal_state() {
        let directory =
            Arc::new(ScriptedDirectory::new().with_operation_script([OperationStatus::Fail]));
        let waiter = AsyncOperationWaiter::new(directory);

        let status = waiter
            .wait_for(&OperationId::new("op-1"), "namespace creation", policy())
            .await
            .unwrap();
        assert_eq!(status, OperationStatus::Fail);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_operation() {
        let directory = Arc::new(ScriptedDirectory::new().with_operation_script([
            OperationStatus::Pending,
            OperationStatus::Cancelled,
        ]));
        let waiter = AsyncOperationWaiter::new(directory);

        let err = waiter
            .wait_for(&OperationId::new("op-1"), "namespace creation", policy())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationCancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_polling() {
        let directory =
            Arc::new(ScriptedDirectory::new().with_operation_script([OperationStatus::Pending]));
        let waiter = AsyncOperationWaiter::new(directory.clone());

        let started = tokio::time::Instant::now();
        let err = waiter
            .wait_for(&OperationId::new("op-1"), "namespace creation", policy())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OperationTimeout);
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert!(started.elapsed() < Duration::from_secs(66));

        let polls = directory.calls().get_operation;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(directory.calls().get_operation, polls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_lookup_error_propagates() {
        let directory = Arc::new(
            ScriptedDirectory::new()
                .with_operation_error(DirectoryError::OperationNotFound("op-1".into())),
        );
        let waiter = AsyncOperationWaiter::new(directory);

        let err = waiter
            .wait_for(&OperationId::new("op-1"), "namespace creation", policy())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
