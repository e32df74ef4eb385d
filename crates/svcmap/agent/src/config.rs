//! Agent configuration
//!
//! Layered lowest to highest: built-in defaults, an optional config file,
//! `SVCMAP_`-prefixed environment variables, then CLI flags applied by the
//! binary. Nested keys use a double underscore in the environment, e.g.
//! `SVCMAP_REGISTRY__CREATE_NAMESPACE=true`.

use serde::{Deserialize, Serialize};
use svcmap_registry::RegistryConfig;
use svcmap_types::UNASSIGNED_PORT;

use crate::error::{AgentError, AgentResult};

/// Agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The process being registered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name, used as the service name unless one is configured
    #[serde(default = "default_application_name")]
    pub name: String,

    /// Port the application listens on; unassigned skips registration
    #[serde(default = "default_port")]
    pub port: i32,

    /// Host to advertise when neither hostname nor IP is configured
    #[serde(default)]
    pub host: Option<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_application_name(),
            port: default_port(),
            host: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_application_name() -> String {
    "application".to_string()
}

fn default_port() -> i32 {
    UNASSIGNED_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AgentConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> AgentResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&AgentConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SVCMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AgentConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Service name: the configured one, else the application name
    pub fn service_name(&self) -> &str {
        self.registry
            .service
            .name
            .as_deref()
            .unwrap_or(&self.application.name)
    }

    pub fn validate(&self) -> AgentResult<()> {
        if self.application.name.trim().is_empty() {
            return Err(AgentError::Config("application name must not be empty".into()));
        }
        self.registry.validate().map_err(AgentError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.application.name, "application");
        assert_eq!(config.application.port, UNASSIGNED_PORT);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.registry.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_service_name_falls_back_to_application() {
        let mut config = AgentConfig::default();
        config.application.name = "orders".into();
        assert_eq!(config.service_name(), "orders");

        config.registry.service.name = Some("orders-api".into());
        assert_eq!(config.service_name(), "orders-api");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AgentConfig::load(Some("/nonexistent/svcmap/agent.toml")).unwrap();
        assert_eq!(config.application.name, "application");
        assert_eq!(config.registry.service.namespace, "application");
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("svcmap-agent-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[application]
name = "orders"
port = 8443

[registry]
create_namespace = true
region = "eu-west-1"

[registry.service]
namespace = "production"

[registry.instance]
secure_port_enabled = true
"#
        )
        .unwrap();

        let config = AgentConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.application.name, "orders");
        assert_eq!(config.application.port, 8443);
        assert!(config.registry.create_namespace);
        assert!(config.registry.create_service);
        assert_eq!(config.registry.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.registry.service.namespace, "production");
        assert!(config.registry.instance.secure_port_enabled);
        assert_eq!(config.registry.wait.instance_operation_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_namespace_rejected() {
        let mut config = AgentConfig::default();
        config.registry.service.namespace = "ns".into();
        assert!(matches!(config.validate(), Err(AgentError::Config(_))));
    }
}
