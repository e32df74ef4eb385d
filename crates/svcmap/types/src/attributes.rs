//! Well-known directory attribute keys
//!
//! Registration writes these keys and discovery reads them back. Everything
//! else in an instance's attribute map is treated as free-form metadata.

use crate::instance::ServiceInstance;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

pub const AWS_INSTANCE_PORT: &str = "AWS_INSTANCE_PORT";
pub const AWS_INSTANCE_CNAME: &str = "AWS_INSTANCE_CNAME";
pub const AWS_INSTANCE_IPV4: &str = "AWS_INSTANCE_IPV4";
pub const AWS_INSTANCE_IPV6: &str = "AWS_INSTANCE_IPV6";
pub const SECURE: &str = "SECURE";
pub const CONTEXT_PATH: &str = "CONTEXT_PATH";

/// Attribute map submitted alongside an instance registration.
///
/// The host lands under the IPv4, IPv6 or CNAME key depending on its form.
/// Metadata is copied in first so it can never shadow a derived key.
pub fn registration_attributes(instance: &ServiceInstance) -> HashMap<String, String> {
    let mut attributes: HashMap<String, String> = instance
        .metadata()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let host = instance.host();
    if !host.is_empty() {
        let key = if host.parse::<Ipv4Addr>().is_ok() {
            AWS_INSTANCE_IPV4
        } else if host.parse::<Ipv6Addr>().is_ok() {
            AWS_INSTANCE_IPV6
        } else {
            AWS_INSTANCE_CNAME
        };
        attributes.insert(key.to_string(), host.to_string());
    }

    if instance.port() > 0 {
        attributes.insert(AWS_INSTANCE_PORT.to_string(), instance.port().to_string());
    }
    attributes.insert(SECURE.to_string(), instance.is_secure().to_string());
    attributes.insert(
        CONTEXT_PATH.to_string(),
        instance.context_path().to_string(),
    );

    attributes
}
