//! Startup ledger checks
//!
//! The issuer initialises the token on a fresh ledger; a participant probes
//! its identity. Either failing aborts startup.

use anyhow::{Context, bail};
use tracing::info;

use crate::config::BootstrapConfig;
use crate::ledger::{LedgerClient, LedgerError, functions};
use crate::settlement::{BankWhitelist, TransferEngine};

/// Initialise the token if the ledger has none yet.
///
/// Returns `false` when the ledger was already initialised.
pub async fn initialize_ledger(
    engine: &TransferEngine,
    issuer_account: &str,
    whitelist: &BankWhitelist,
    config: &BootstrapConfig,
) -> anyhow::Result<bool> {
    let ledger = engine.ledger();
    match ledger.evaluate_string(functions::SYMBOL, &[]).await {
        Ok(symbol) if !symbol.is_empty() => {
            info!(%symbol, "Ledger already initialised");
            return Ok(false);
        }
        Ok(_) | Err(LedgerError::Endorsement { .. }) => {}
        Err(e) => return Err(e).context("Failed to query token symbol"),
    }

    info!(
        name = %config.token_name,
        symbol = %config.token_symbol,
        decimals = config.decimals,
        "Initialising ledger"
    );
    submit_and_confirm(
        ledger,
        functions::INITIALIZE,
        &[
            config.token_name.clone(),
            config.token_symbol.clone(),
            config.decimals.to_string(),
        ],
    )
    .await?;
    submit_and_confirm(ledger, functions::MINT, &[config.initial_supply.to_string()]).await?;

    if config.bank_allocation > 0 {
        for bank in whitelist.banks() {
            let result = engine
                .transfer_from(issuer_account, bank, &config.bank_allocation.to_string())
                .await
                .with_context(|| format!("Failed to allocate initial funds to {}", bank))?;
            if !result.success {
                bail!("Initial allocation to {} failed: {}", bank, result.message);
            }
            info!(bank = %bank, amount = config.bank_allocation, tx_id = %result.tx_id, "Bank allocation committed");
        }
    }

    Ok(true)
}

/// Evaluate `ClientAccountID` to confirm the ledger identity is usable
pub async fn probe_identity(ledger: &LedgerClient) -> anyhow::Result<String> {
    let id = ledger
        .evaluate_string(functions::CLIENT_ACCOUNT_ID, &[])
        .await
        .context("Failed to evaluate ClientAccountID")?;
    info!(client_account_id = %id, "Ledger identity confirmed");
    Ok(id)
}

async fn submit_and_confirm(
    ledger: &LedgerClient,
    function: &str,
    args: &[String],
) -> anyhow::Result<()> {
    let commit = ledger
        .submit(function, args)
        .await
        .with_context(|| format!("Failed to submit {}", function))?;
    let outcome = commit
        .wait()
        .await
        .with_context(|| format!("Failed to confirm {}", function))?;
    if !outcome.successful {
        bail!(
            "{} transaction {} failed to commit with status: {}",
            function,
            outcome.transaction_id,
            outcome.code
        );
    }
    info!(function, tx_id = %outcome.transaction_id, "Bootstrap transaction committed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Fault, InMemoryLedger};
    use std::sync::Arc;

    fn setup(ledger: &InMemoryLedger) -> (Arc<crate::ledger::MemorySession>, TransferEngine) {
        let session = Arc::new(ledger.session("rbi.cbdc"));
        let engine = TransferEngine::new(LedgerClient::new(session.clone()));
        (session, engine)
    }

    fn whitelist() -> BankWhitelist {
        BankWhitelist::new("rbi.cbdc", BankWhitelist::default_banks())
    }

    #[tokio::test]
    async fn test_initializes_fresh_ledger() {
        let ledger = InMemoryLedger::uninitialized("rbi.cbdc");
        let (_, engine) = setup(&ledger);

        let initialized =
            initialize_ledger(&engine, "rbi.cbdc", &whitelist(), &BootstrapConfig::default())
                .await
                .unwrap();

        assert!(initialized);
        assert!(ledger.is_initialized());
        assert_eq!(ledger.balance("hdfc.cbdc"), 10_000);
        assert_eq!(ledger.balance("axis.cbdc"), 10_000);
        assert_eq!(ledger.balance("rbi.cbdc"), 0);
    }

    #[tokio::test]
    async fn test_initialized_ledger_is_left_alone() {
        let ledger = InMemoryLedger::with_minter("rbi.cbdc");
        let (session, engine) = setup(&ledger);

        let initialized =
            initialize_ledger(&engine, "rbi.cbdc", &whitelist(), &BootstrapConfig::default())
                .await
                .unwrap();

        assert!(!initialized);
        assert_eq!(session.submit_count(functions::INITIALIZE), 0);
        assert_eq!(session.submit_count(functions::MINT), 0);
    }

    #[tokio::test]
    async fn test_unreachable_ledger_aborts() {
        let ledger = InMemoryLedger::uninitialized("rbi.cbdc");
        let (session, engine) = setup(&ledger);
        session.inject(functions::SYMBOL, Fault::Connectivity);

        let result =
            initialize_ledger(&engine, "rbi.cbdc", &whitelist(), &BootstrapConfig::default()).await;

        assert!(result.is_err());
        assert!(!ledger.is_initialized());
    }

    #[tokio::test]
    async fn test_probe_identity() {
        let ledger = InMemoryLedger::with_minter("rbi.cbdc");
        let session = Arc::new(ledger.session("axis.cbdc"));
        let client = LedgerClient::new(session.clone());

        assert_eq!(probe_identity(&client).await.unwrap(), "axis.cbdc");

        session.inject(functions::CLIENT_ACCOUNT_ID, Fault::Connectivity);
        assert!(probe_identity(&client).await.is_err());
    }
}
