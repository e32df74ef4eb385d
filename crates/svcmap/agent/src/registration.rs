//! Building the local [`Registration`] from configuration.

use svcmap_types::{Registration, ServiceInstance};

use crate::config::AgentConfig;

/// Advertised host, by precedence:
///
/// 1. IP address when `prefer_ip_address` is set and an IP is configured
/// 2. configured hostname
/// 3. configured IP address
/// 4. `application.host`, else `fallback_host`
pub fn advertised_host(config: &AgentConfig, fallback_host: &str) -> String {
    let instance = &config.registry.instance;

    let preferred_ip = instance
        .ip_address
        .as_deref()
        .filter(|_| instance.prefer_ip_address);

    preferred_ip
        .or(instance.hostname.as_deref())
        .or(instance.ip_address.as_deref())
        .or(config.application.host.as_deref())
        .unwrap_or(fallback_host)
        .to_string()
}

/// Registration for this process.
pub fn build_registration(config: &AgentConfig, fallback_host: &str) -> Registration {
    let host = advertised_host(config, fallback_host);
    let service_id = config.service_name().to_string();
    let port = config.application.port;
    let instance_config = &config.registry.instance;

    let instance_id = instance_config
        .instance_id
        .clone()
        .unwrap_or_else(|| format!("{}:{}:{}", host, service_id, port));

    let mut builder = ServiceInstance::builder()
        .instance_id(instance_id)
        .service_id(service_id)
        .namespace(config.registry.service.namespace.as_str())
        .host(host)
        .port(port)
        .secure(instance_config.secure_port_enabled)
        .metadata(instance_config.metadata.iter());

    if let Some(path) = &instance_config.context_path {
        builder = builder.context_path(path.as_str());
    }

    Registration::with_policy(
        builder.build(),
        config.registry.create_namespace,
        config.registry.create_service,
    )
}
