//! Registry configuration.
//!
//! Defines what to register, the auto-creation policy, and the bounds on
//! every wait the engine performs.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Top-level registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Master switch for registration and discovery.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Register this process on start.
    #[serde(default = "default_true")]
    pub register: bool,

    /// Provider region, if the provider is regional.
    #[serde(default)]
    pub region: Option<String>,

    /// Create the namespace when missing.
    #[serde(default)]
    pub create_namespace: bool,

    /// Create the service when missing.
    #[serde(default = "default_true")]
    pub create_service: bool,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub instance: InstanceConfig,

    #[serde(default)]
    pub wait: WaitConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            register: true,
            region: None,
            create_namespace: false,
            create_service: true,
            service: ServiceConfig::default(),
            instance: InstanceConfig::default(),
            wait: WaitConfig::default(),
        }
    }
}

/// Namespace and service naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Service name; falls back to the application name when unset.
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            name: None,
        }
    }
}

/// How this instance describes itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Explicit instance id; defaults to `host:service:port`.
    #[serde(default)]
    pub instance_id: Option<String>,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub ip_address: Option<String>,

    /// Advertise the IP address even when a hostname is configured.
    #[serde(default)]
    pub prefer_ip_address: bool,

    #[serde(default)]
    pub secure_port_enabled: bool,

    #[serde(default)]
    pub context_path: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Bounds on polling and waiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Interval between namespace-creation status polls.
    #[serde(default = "default_namespace_poll_interval")]
    pub namespace_poll_interval_secs: u64,

    /// Overall deadline for namespace creation.
    #[serde(default = "default_namespace_deadline")]
    pub namespace_deadline_secs: u64,

    /// Bound on instance registration and deregistration.
    #[serde(default = "default_instance_operation_timeout")]
    pub instance_operation_timeout_secs: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            namespace_poll_interval_secs: default_namespace_poll_interval(),
            namespace_deadline_secs: default_namespace_deadline(),
            instance_operation_timeout_secs: default_instance_operation_timeout(),
        }
    }
}

impl WaitConfig {
    pub fn namespace_poll_interval(&self) -> Duration {
        Duration::from_secs(self.namespace_poll_interval_secs)
    }

    pub fn namespace_deadline(&self) -> Duration {
        Duration::from_secs(self.namespace_deadline_secs)
    }

    pub fn instance_operation_timeout(&self) -> Duration {
        Duration::from_secs(self.instance_operation_timeout_secs)
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    "application".to_string()
}

fn default_namespace_poll_interval() -> u64 {
    5
}

fn default_namespace_deadline() -> u64 {
    300
}

fn default_instance_operation_timeout() -> u64 {
    30
}

fn namespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][-a-zA-Z0-9_]{3,1022}[a-zA-Z]$").expect("namespace pattern is valid")
    })
}

fn service_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:[a-zA-Z0-9_][a-zA-Z0-9\-_]{0,61}[a-zA-Z0-9_]|[a-zA-Z0-9])(?:\.(?:[a-zA-Z0-9_][a-zA-Z0-9\-_]{0,61}[a-zA-Z0-9_]|[a-zA-Z0-9]))*$|^\.$",
        )
        .expect("service name pattern is valid")
    })
}

impl RegistryConfig {
    /// Check names against the provider's naming rules.
    pub fn validate(&self) -> Result<(), String> {
        if !namespace_pattern().is_match(&self.service.namespace) {
            return Err(format!(
                "namespace '{}' must start and end with a letter and be 5-1024 characters of letters, digits, '-' or '_'",
                self.service.namespace
            ));
        }

        if let Some(name) = &self.service.name {
            if name.len() > 127 || !service_name_pattern().is_match(name) {
                return Err(format!("service name '{}' is not a valid DNS name", name));
            }
        }

        if self.wait.namespace_poll_interval_secs == 0 {
            return Err("namespace poll interval must be greater than zero".to_string());
        }

        if self.wait.namespace_deadline_secs == 0 {
            return Err("namespace deadline must be greater than zero".to_string());
        }

        if self.wait.instance_operation_timeout_secs == 0 {
            return Err("instance operation timeout must be greater than zero".to_string());
        }

        Ok(())
    }
}
