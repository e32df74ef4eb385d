//! Service instance descriptor
//!
//! A ServiceInstance is an immutable description of one reachable endpoint.
//! It is only ever produced through [`ServiceInstanceBuilder`], which fills
//! defaults so that two instances describing the same endpoint compare equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv6Addr;

/// Port value meaning "not yet assigned".
pub const UNASSIGNED_PORT: i32 = -1;

/// Context path used when none (or only whitespace) is given.
pub const DEFAULT_CONTEXT_PATH: &str = "/";

/// An immutable, addressable service instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceInstance {
    instance_id: String,
    service_id: String,
    namespace: String,
    host: String,
    port: i32,
    secure: bool,
    context_path: String,
    metadata: BTreeMap<String, String>,
}

impl ServiceInstance {
    pub fn builder() -> ServiceInstanceBuilder {
        ServiceInstanceBuilder::default()
    }

    /// Identifier, unique within the owning service
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Host name or address; empty when discovery could not resolve one
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port, or [`UNASSIGNED_PORT`]
    pub fn port(&self) -> i32 {
        self.port
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Context path, never empty
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Whether discovery resolved an address for this instance
    pub fn has_host(&self) -> bool {
        !self.host.is_empty()
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// `scheme://host:port` followed by the context path.
    ///
    /// IPv6 literals are bracketed so the result stays a valid authority.
    pub fn uri(&self) -> String {
        let host = if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!(
            "{}://{}:{}{}",
            self.scheme(),
            host,
            self.port,
            self.context_path
        )
    }
}

impl fmt::Display for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} ({})",
            self.namespace,
            self.service_id,
            self.instance_id,
            self.uri()
        )
    }
}

/// Builder for [`ServiceInstance`]
#[derive(Debug, Clone)]
pub struct ServiceInstanceBuilder {
    instance_id: String,
    service_id: String,
    namespace: String,
    host: String,
    port: i32,
    secure: bool,
    context_path: Option<String>,
    metadata: BTreeMap<String, String>,
}

impl Default for ServiceInstanceBuilder {
    fn default() -> Self {
        Self {
            instance_id: String::new(),
            service_id: String::new(),
            namespace: String::new(),
            host: String::new(),
            port: UNASSIGNED_PORT,
            secure: false,
            context_path: None,
            metadata: BTreeMap::new(),
        }
    }
}

impl ServiceInstanceBuilder {
    pub fn instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = instance_id.into();
        self
    }

    pub fn service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = service_id.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: i32) -> Self {
        self.port = port;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = Some(context_path.into());
        self
    }

    /// Replace the metadata wholesale
    pub fn metadata<K, V>(mut self, metadata: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata = metadata
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn metadata_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> ServiceInstance {
        let context_path = match self.context_path {
            Some(path) if !path.trim().is_empty() => path,
            _ => DEFAULT_CONTEXT_PATH.to_string(),
        };

        ServiceInstance {
            instance_id: self.instance_id,
            service_id: self.service_id,
            namespace: self.namespace,
            host: self.host,
            port: self.port,
            secure: self.secure,
            context_path,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(instance: &ServiceInstance) -> u64 {
        let mut hasher = DefaultHasher::new();
        instance.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_builder_defaults() {
        let instance = ServiceInstance::builder()
            .instance_id("i-1")
            .service_id("orders")
            .build();

        assert_eq!(instance.port(), UNASSIGNED_PORT);
        assert!(!instance.is_secure());
        assert_eq!(instance.context_path(), "/");
        assert!(instance.metadata().is_empty());
        assert!(!instance.has_host());
    }

    #[test]
    fn test_secure_uri_with_empty_context_path() {
        let instance = ServiceInstance::builder()
            .host("svc.local")
            .port(443)
            .secure(true)
            .context_path("")
            .build();

        assert_eq!(instance.uri(), "https://svc.local:443/");
    }

    #[test]
    fn test_whitespace_context_path_defaults() {
        let instance = ServiceInstance::builder()
            .host("10.0.0.4")
            .port(8080)
            .context_path("   ")
            .build();

        assert_eq!(instance.context_path(), "/");
        assert_eq!(instance.uri(), "http://10.0.0.4:8080/");
    }

    #[test]
    fn test_uri_keeps_explicit_context_path() {
        let instance = ServiceInstance::builder()
            .host("orders.internal")
            .port(9000)
            .context_path("/api")
            .build();

        assert_eq!(instance.uri(), "http://orders.internal:9000/api");
    }

    #[test]
    fn test_uri_brackets_ipv6_host() {
        let instance = ServiceInstance::builder()
            .host("fd00::1")
            .port(8080)
            .build();

        assert_eq!(instance.uri(), "http://[fd00::1]:8080/");
    }

    #[test]
    fn test_equality_uses_defaulted_context_path() {
        let implicit = ServiceInstance::builder()
            .instance_id("i-1")
            .service_id("orders")
            .build();
        let explicit = ServiceInstance::builder()
            .instance_id("i-1")
            .service_id("orders")
            .context_path("/")
            .build();

        assert_eq!(implicit, explicit);
        assert_eq!(hash_of(&implicit), hash_of(&explicit));
    }

    #[test]
    fn test_metadata_order_irrelevant() {
        let a = ServiceInstance::builder()
            .metadata_entry("zone", "a")
            .metadata_entry("tier", "web")
            .build();
        let b = ServiceInstance::builder()
            .metadata([("tier", "web"), ("zone", "a")])
            .build();

        assert_eq!(a, b);
    }

    #[test]
    fn test_namespace_participates_in_equality() {
        let a = ServiceInstance::builder().namespace("prod").build();
        let b = ServiceInstance::builder().namespace("staging").build();
        assert_ne!(a, b);
    }
}
