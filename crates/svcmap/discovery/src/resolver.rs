//! Raw directory records to [`ServiceInstance`].
//!
//! Host resolution is strict precedence: CNAME, then IPv4, then IPv6. With
//! none of them the host stays empty and the instance is not reachable;
//! callers check [`ServiceInstance::has_host`] rather than fail.

use svcmap_types::attributes::{
    AWS_INSTANCE_CNAME, AWS_INSTANCE_IPV4, AWS_INSTANCE_IPV6, AWS_INSTANCE_PORT, CONTEXT_PATH,
    SECURE,
};
use svcmap_types::{DiscoveredInstance, ServiceInstance, UNASSIGNED_PORT};
use tracing::warn;

/// Builds typed instances from discovery records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceInstanceResolver;

impl ServiceInstanceResolver {
    pub fn resolve(discovered: &DiscoveredInstance) -> ServiceInstance {
        let mut builder = ServiceInstance::builder()
            .instance_id(discovered.instance_id.as_str())
            .service_id(discovered.service_id.as_str())
            .namespace(discovered.namespace_id.as_str())
            .port(resolve_port(discovered))
            .secure(
                discovered
                    .attribute(SECURE)
                    .map(|v| v.trim().eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            )
            .metadata(discovered.attributes.iter());

        if let Some(host) = resolve_host(discovered) {
            builder = builder.host(host);
        }
        if let Some(path) = discovered.attribute(CONTEXT_PATH) {
            builder = builder.context_path(path);
        }

        builder.build()
    }

    pub fn resolve_all(discovered: &[DiscoveredInstance]) -> Vec<ServiceInstance> {
        discovered.iter().map(Self::resolve).collect()
    }
}

fn resolve_host(discovered: &DiscoveredInstance) -> Option<&str> {
    [AWS_INSTANCE_CNAME, AWS_INSTANCE_IPV4, AWS_INSTANCE_IPV6]
        .into_iter()
        .find_map(|key| discovered.attribute(key))
}

fn resolve_port(discovered: &DiscoveredInstance) -> i32 {
    let Some(raw) = discovered.attribute(AWS_INSTANCE_PORT) else {
        return UNASSIGNED_PORT;
    };

    match raw.trim().parse::<i32>() {
        Ok(port) => port,
        Err(e) => {
            warn!(
                instance_id = %discovered.instance_id,
                value = %raw,
                error = %e,
                "Ignoring unparseable instance port"
            );
            UNASSIGNED_PORT
        }
    }
}
