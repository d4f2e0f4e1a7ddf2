//! cbdc-node - one issuer or participant node
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│  Ledger  │───▶│ Orchestrators│───▶│ Gateway  │
//! │  (YAML)  │    │ (session)│    │  (by role)   │    │  (HTTP)  │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Usage: `cbdc-node --env rbi [--port 7999]`

use cbdc_relay::config::AppConfig;
use cbdc_relay::{gateway, logging, node};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.node.port = port;
    }
    let _log_guard = logging::init_logging(&app_config);

    tracing::info!(
        "Starting cbdc-node ({}) in {} mode, build {}",
        app_config.node.role.as_str(),
        env,
        env!("GIT_HASH")
    );

    if let Err(e) = run(&app_config).await {
        tracing::error!("FATAL: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let ledger = node::connect_ledger(config)?;
    let state = node::build_state(config, ledger).await?;
    gateway::run_server(&config.node.host, config.node.port, state).await
}
