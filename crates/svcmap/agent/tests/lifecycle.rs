//! End-to-end agent flow over the in-memory and scripted directories.

use std::sync::Arc;

use svcmap_agent::{Agent, AgentConfig, AgentError};
use svcmap_directory::{DirectoryClient, DirectoryError, InMemoryDirectory};
use svcmap_discovery::ServiceDiscovery;
use svcmap_registry::testing::{CallBehavior, ScriptedDirectory};
use svcmap_registry::{ErrorKind, RegistrationEvent};
use svcmap_types::attributes::{AWS_INSTANCE_IPV4, AWS_INSTANCE_PORT};
use svcmap_types::HealthStatus;

fn config() -> AgentConfig {
    let mut config = AgentConfig::default();
    config.application.name = "orders".into();
    config.application.port = 8080;
    config.registry.service.namespace = "production".into();
    config.registry.create_namespace = true;
    config.registry.instance.ip_address = Some("10.1.0.4".into());
    config
        .registry
        .instance
        .metadata
        .insert("version".into(), "1.4.2".into());
    config
}

#[tokio::test]
async fn test_register_discover_deregister() {
    let directory = Arc::new(InMemoryDirectory::new());
    let agent = Agent::new(&config(), directory.clone(), "node-a").unwrap();
    let mut events = agent.subscribe();

    agent.start().await.unwrap();
    assert!(agent.is_registered());
    assert!(matches!(
        events.recv().await.unwrap(),
        RegistrationEvent::Registered { .. }
    ));

    let attributes = directory
        .instance_attributes("orders", "10.1.0.4:orders:8080")
        .unwrap();
    assert_eq!(attributes.get(AWS_INSTANCE_IPV4).map(String::as_str), Some("10.1.0.4"));
    assert_eq!(attributes.get(AWS_INSTANCE_PORT).map(String::as_str), Some("8080"));

    let instances = agent.discovery().get_instances("orders").await.unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].uri(), "http://10.1.0.4:8080/");
    assert_eq!(
        instances[0].metadata().get("version").map(String::as_str),
        Some("1.4.2")
    );
    assert_eq!(
        agent.discovery().get_services().await.unwrap(),
        vec!["orders".to_string()]
    );

    assert_eq!(agent.status().await.unwrap(), HealthStatus::Healthy);
    assert_eq!(agent.health().await.status, HealthStatus::Healthy);

    agent.stop().await.unwrap();
    assert!(!agent.is_registered());
    assert!(matches!(
        events.recv().await.unwrap(),
        RegistrationEvent::Deregistered { .. }
    ));
    assert_eq!(directory.instance_count(), 0);
    assert!(directory.is_shut_down());
}

#[tokio::test]
async fn test_second_registration_reuses_resources() {
    let directory = Arc::new(InMemoryDirectory::new());

    let first = Agent::new(&config(), directory.clone(), "node-a").unwrap();
    first.start().await.unwrap();

    let mut second_config = config();
    second_config.registry.instance.ip_address = Some("10.1.0.5".into());
    let second = Agent::new(&second_config, directory.clone(), "node-b").unwrap();
    second.start().await.unwrap();

    assert_eq!(directory.instance_count(), 2);
    assert_eq!(directory.list_services("production").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unhealthy_instance_hidden_from_discovery() {
    let directory = Arc::new(InMemoryDirectory::new());
    let agent = Agent::new(&config(), directory.clone(), "node-a").unwrap();
    agent.start().await.unwrap();

    directory
        .set_instance_health("orders", "10.1.0.4:orders:8080", HealthStatus::Unhealthy)
        .unwrap();

    assert!(agent.discovery().get_instances("orders").await.unwrap().is_empty());
    assert_eq!(agent.status().await.unwrap(), HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_missing_namespace_without_create_policy() {
    let mut config = config();
    config.registry.create_namespace = false;

    let directory = Arc::new(InMemoryDirectory::new());
    let agent = Agent::new(&config, directory.clone(), "node-a").unwrap();

    let err = agent.start().await.unwrap_err();
    match err {
        AgentError::Registry(e) => assert_eq!(e.kind(), ErrorKind::PolicyViolation),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!agent.is_registered());
    assert_eq!(directory.instance_count(), 0);
}

#[tokio::test]
async fn test_unassigned_port_skips_registration() {
    let mut config = config();
    config.application.port = -1;

    let directory = Arc::new(InMemoryDirectory::new());
    let agent = Agent::new(&config, directory.clone(), "node-a").unwrap();

    agent.start().await.unwrap();

    assert!(!agent.is_registered());
    assert!(directory.get_namespace("production").await.is_err());
}

#[tokio::test]
async fn test_query_failure_after_registration_still_deregisters() {
    let directory = Arc::new(
        ScriptedDirectory::new()
            .with_namespace("production")
            .with_service("orders")
            .with_health_error(DirectoryError::Unavailable("throttled".into())),
    );
    let agent = Agent::new(&config(), directory.clone(), "node-a").unwrap();

    agent.run_until(async {}).await;

    let calls = directory.calls();
    assert_eq!(calls.register_instance, 1);
    assert_eq!(calls.get_instances_health_status, 1);
    assert_eq!(calls.deregister_instance, 1);
    assert_eq!(calls.shutdown, 1);
    assert!(!agent.is_registered());
}

#[tokio::test]
async fn test_report_surfaces_directory_errors() {
    let directory = Arc::new(
        ScriptedDirectory::new()
            .with_namespace("production")
            .with_service("orders")
            .with_health_error(DirectoryError::Unavailable("throttled".into())),
    );
    let agent = Agent::new(&config(), directory, "node-a").unwrap();
    agent.start().await.unwrap();

    assert!(matches!(agent.report().await, Err(AgentError::Registry(_))));
    assert!(agent.is_registered());
}

#[tokio::test]
async fn test_failed_registration_still_runs_shutdown() {
    let directory = Arc::new(
        ScriptedDirectory::new()
            .with_namespace("production")
            .with_service("orders")
            .with_register_behavior(CallBehavior::Fail(DirectoryError::Unavailable(
                "down".into(),
            ))),
    );
    let agent = Agent::new(&config(), directory.clone(), "node-a").unwrap();

    agent.run_until(async {}).await;

    let calls = directory.calls();
    assert_eq!(calls.register_instance, 1);
    assert_eq!(calls.discover_instances, 0);
    assert_eq!(calls.deregister_instance, 0);
    assert_eq!(calls.shutdown, 1);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = config();
    config.registry.service.name = Some("not a dns name".into());

    let result = Agent::new(&config, Arc::new(InMemoryDirectory::new()), "node-a");
    assert!(matches!(result, Err(AgentError::Config(_))));
}
