//! Node assembly
//!
//! ```text
//! AppConfig ──▶ ledger session ──▶ LedgerClient ──▶ orchestrators ──▶ AppState
//! ```
//!
//! Each node owns exactly one ledger session, handed explicitly to every
//! orchestrator it builds.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::bootstrap;
use crate::config::{AppConfig, LedgerMode, NodeRole};
use crate::gateway::state::AppState;
use crate::ledger::{HttpLedgerConfig, HttpLedgerGateway, LedgerClient, LedgerGateway};
use crate::settlement::{
    AccountProvisioner, BankWhitelist, FundingOrchestrator, HttpIssuerClient,
    MintRelayOrchestrator, PendingRelayJournal, TransferEngine,
};

/// Open this node's ledger session
pub fn connect_ledger(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerGateway>> {
    match config.ledger.mode {
        LedgerMode::Gateway => {
            let gateway = HttpLedgerGateway::new(HttpLedgerConfig {
                url: config.ledger.gateway_url.clone(),
                channel: config.ledger.channel.clone(),
                chaincode: config.ledger.chaincode.clone(),
            })
            .context("Failed to create ledger gateway client")?;
            info!(
                url = %config.ledger.gateway_url,
                channel = %config.ledger.channel,
                chaincode = %config.ledger.chaincode,
                "Ledger gateway configured"
            );
            Ok(Arc::new(gateway))
        }
        LedgerMode::Memory => memory_ledger(config),
    }
}

#[cfg(feature = "mock-ledger")]
fn memory_ledger(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerGateway>> {
    use crate::ledger::InMemoryLedger;
    use crate::settlement::whitelist::RBI_ISSUER_ACCOUNT;

    tracing::warn!("Using in-process memory ledger; state is lost on exit");
    let account = config.node.bank_account.as_str();
    let ledger = match config.node.role {
        NodeRole::Issuer if config.bootstrap.enabled => InMemoryLedger::uninitialized(account),
        NodeRole::Issuer => InMemoryLedger::with_minter(account),
        NodeRole::Participant => {
            let ledger = InMemoryLedger::with_minter(RBI_ISSUER_ACCOUNT);
            ledger.seed(account, config.bootstrap.bank_allocation);
            ledger
        }
    };
    Ok(Arc::new(ledger.session(account)))
}

#[cfg(not(feature = "mock-ledger"))]
fn memory_ledger(_config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerGateway>> {
    anyhow::bail!("ledger.mode `memory` requires the `mock-ledger` feature")
}

/// Wire orchestrators for the configured role and run startup checks
pub async fn build_state(
    config: &AppConfig,
    gateway: Arc<dyn LedgerGateway>,
) -> anyhow::Result<Arc<AppState>> {
    let ledger = LedgerClient::with_timeouts(gateway, config.ledger.timeouts.to_timeouts());
    let engine = Arc::new(TransferEngine::new(ledger.clone()));
    let account = config.node.bank_account.as_str();
    let provisioner = Arc::new(AccountProvisioner::new(
        engine.clone(),
        account,
        config.provisioning.seed_amount,
    ));

    let state = match config.node.role {
        NodeRole::Issuer => {
            let whitelist = BankWhitelist::new(account, config.whitelist.iter().cloned());
            if config.bootstrap.enabled {
                bootstrap::initialize_ledger(&engine, account, &whitelist, &config.bootstrap)
                    .await
                    .context("Ledger bootstrap failed")?;
            } else {
                bootstrap::probe_identity(&ledger).await?;
            }
            info!(banks = whitelist.len(), "Bank whitelist loaded");

            let minter = Arc::new(MintRelayOrchestrator::new(
                ledger,
                engine.clone(),
                whitelist,
                Arc::new(PendingRelayJournal::new()),
            ));
            AppState::issuer(account, engine, provisioner, minter)
        }
        NodeRole::Participant => {
            bootstrap::probe_identity(&ledger).await?;

            let issuer_config = config
                .issuer
                .as_ref()
                .context("participant nodes need an `issuer` section")?;
            let issuer = HttpIssuerClient::new(&issuer_config.url, issuer_config.timeout())
                .context("Failed to create issuer client")?;
            info!(url = %issuer_config.url, "Issuer endpoint configured");

            let funding = Arc::new(FundingOrchestrator::new(
                Arc::new(issuer),
                engine.clone(),
                account,
            ));
            AppState::participant(account, engine, provisioner, funding)
        }
    };

    Ok(Arc::new(state))
}
