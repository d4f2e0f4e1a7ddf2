//! Funding Orchestrator (participant side)
//!
//! Two-hop saga funding an end user:
//!
//! 1. Issuer mints and relays `amount` to this participant's bank account (RPC).
//! 2. Bank account → end user (local Transfer Engine).
//!
//! Each hop commits independently. Hop 2 only runs after hop 1 reported
//! success; a hop-1 failure is surfaced verbatim and never retried here.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::error::{SettlementError, parse_amount};
use super::issuer::IssuerClient;
use super::transfer::TransferEngine;
use super::types::{Account, Amount, FundResult};

pub struct FundingOrchestrator {
    issuer: Arc<dyn IssuerClient>,
    engine: Arc<TransferEngine>,
    bank_account: Account,
}

impl FundingOrchestrator {
    pub fn new(
        issuer: Arc<dyn IssuerClient>,
        engine: Arc<TransferEngine>,
        bank_account: impl Into<Account>,
    ) -> Self {
        Self {
            issuer,
            engine,
            bank_account: bank_account.into(),
        }
    }

    pub fn bank_account(&self) -> &str {
        &self.bank_account
    }

    pub async fn fund(&self, end_user: &str, amount: Amount) -> Result<FundResult, SettlementError> {
        if let Err(e) = parse_amount(&amount.to_string()) {
            return Ok(FundResult::rejected(end_user, amount, e.to_string()));
        }
        if end_user.trim().is_empty() {
            return Ok(FundResult::rejected(
                end_user,
                amount,
                "Invalid Account: end user account must be non-empty",
            ));
        }

        // Hop 1: issuer → this bank
        let minted = self.issuer.mint(&self.bank_account, amount).await.map_err(|e| {
            error!(bank = %self.bank_account, amount, error = %e, "Issuer hop failed");
            e
        })?;
        if !minted.success {
            warn!(
                tx_id = %minted.tx_id,
                message = %minted.message,
                "Issuer did not fund bank; second hop skipped"
            );
            return Ok(FundResult::from(minted));
        }
        info!(tx_id = %minted.tx_id, bank = %self.bank_account, amount, "Issuer hop committed");

        // Hop 2: bank → end user
        let transferred = self
            .engine
            .transfer_from(&self.bank_account, end_user, &amount.to_string())
            .await
            .map_err(|e| {
                error!(
                    mint_tx_id = %minted.tx_id,
                    end_user,
                    amount,
                    error = %e,
                    "Bank funded but transfer to end user failed"
                );
                e
            })?;
        if !transferred.success {
            error!(
                mint_tx_id = %minted.tx_id,
                tx_id = %transferred.tx_id,
                end_user,
                "Bank funded but end user transfer rejected"
            );
        }

        Ok(FundResult::from(transferred))
    }
}
