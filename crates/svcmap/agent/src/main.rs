//! svcmapd - Service registration agent
//!
//! Registers this process with the service directory on startup, logs what
//! the namespace currently holds, and deregisters on Ctrl-C.

use std::sync::Arc;

use clap::Parser;
use svcmap_agent::{logging, Agent, AgentConfig};
use svcmap_directory::InMemoryDirectory;
use tracing::{info, warn};

/// svcmap agent CLI
#[derive(Parser)]
#[command(name = "svcmapd")]
#[command(about = "svcmap agent - register this process with a service directory", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SVCMAP_CONFIG")]
    config: Option<String>,

    /// Application name
    #[arg(short, long, env = "SVCMAP_APPLICATION_NAME")]
    name: Option<String>,

    /// Port the application listens on
    #[arg(short, long, env = "SVCMAP_APPLICATION_PORT")]
    port: Option<i32>,

    /// Namespace to register in
    #[arg(long, env = "SVCMAP_NAMESPACE")]
    namespace: Option<String>,

    /// Create the namespace when it does not exist
    #[arg(long)]
    create_namespace: bool,

    /// Log level
    #[arg(long, env = "SVCMAP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "SVCMAP_LOG_JSON")]
    json: bool,
}

fn fallback_host() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AgentConfig::load(cli.config.as_deref())?;

    // Override with CLI args
    if let Some(name) = cli.name {
        config.application.name = name;
    }
    if let Some(port) = cli.port {
        config.application.port = port;
    }
    if let Some(namespace) = cli.namespace {
        config.registry.service.namespace = namespace;
    }
    if cli.create_namespace {
        config.registry.create_namespace = true;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    logging::init(&config.logging.level, config.logging.json);

    let directory = Arc::new(InMemoryDirectory::new());
    let agent = Agent::new(&config, directory, &fallback_host())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        region = config.registry.region.as_deref().unwrap_or("default"),
        namespace = %config.registry.service.namespace,
        service = %config.service_name(),
        "Starting svcmapd"
    );

    agent
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Could not listen for Ctrl-C, shutting down");
            }
        })
        .await;

    Ok(())
}
