//! Provider-side asynchronous operations
//!
//! Some create calls (namespaces in particular) return immediately with an
//! operation handle. The operation then moves from `Submitted`/`Pending` to
//! exactly one terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque handle for a provider-side operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op:{}", self.0)
    }
}

/// Lifecycle state of an asynchronous operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationStatus {
    Submitted,
    Pending,
    Success,
    Fail,
    Cancelled,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::Submitted | OperationStatus::Pending)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::Submitted => write!(f, "SUBMITTED"),
            OperationStatus::Pending => write!(f, "PENDING"),
            OperationStatus::Success => write!(f, "SUCCESS"),
            OperationStatus::Fail => write!(f, "FAIL"),
            OperationStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}
