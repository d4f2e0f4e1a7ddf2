//! Mint-and-Relay Orchestrator (issuer side)
//!
//! # Protocol
//!
//! ```text
//! AUTHORIZE ──✗──▶ "Not Authorized to Mint!" (xxxxx, no ledger call)
//!     │
//!     ▼
//!   MINT ────✗──▶ success=false (sentinel id on submit failure, mint id on rejected commit)
//!     │
//!     ▼
//!   RELAY ───✗──▶ "Failed to transfer" (mint id) + pending-relay journal entry
//!     │
//!     ▼
//!  "Success!" (mint id)
//! ```
//!
//! The mint and the relay are two independently committed transactions. A
//! failed relay after a committed mint is a terminal partial failure: it is
//! reported, journaled, and never reversed automatically.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::error::{SettlementError, parse_amount};
use super::reconcile::{PendingRelay, PendingRelayJournal, RelayFailure};
use super::transfer::TransferEngine;
use super::types::{Amount, MintResult, TransferResult, commit_rejected_message, messages};
use super::whitelist::{BankWhitelist, RelayRoute};
use crate::ledger::{LedgerClient, functions};

pub struct MintRelayOrchestrator {
    ledger: LedgerClient,
    engine: Arc<TransferEngine>,
    whitelist: BankWhitelist,
    journal: Arc<PendingRelayJournal>,
}

impl MintRelayOrchestrator {
    pub fn new(
        ledger: LedgerClient,
        engine: Arc<TransferEngine>,
        whitelist: BankWhitelist,
        journal: Arc<PendingRelayJournal>,
    ) -> Self {
        Self {
            ledger,
            engine,
            whitelist,
            journal,
        }
    }

    pub fn whitelist(&self) -> &BankWhitelist {
        &self.whitelist
    }

    pub fn journal(&self) -> &Arc<PendingRelayJournal> {
        &self.journal
    }

    /// Mint `amount` into the issuer's balance and relay it to `account`
    pub async fn mint_request(
        &self,
        account: &str,
        amount: Amount,
    ) -> Result<MintResult, SettlementError> {
        // 1. Authorization
        let Some(route) = self.whitelist.route(account) else {
            warn!(account, amount, "Mint refused: account not whitelisted");
            return Ok(MintResult::rejected(
                account,
                amount,
                messages::NOT_AUTHORIZED_TO_MINT,
            ));
        };

        if let Err(e) = parse_amount(&amount.to_string()) {
            return Ok(MintResult::rejected(account, amount, e.to_string()));
        }

        // 2. Mint
        let commit = match self
            .ledger
            .submit(functions::MINT, &[amount.to_string()])
            .await
        {
            Ok(commit) => commit,
            Err(e) if e.is_outcome_unknown() => {
                error!(account, amount, error = %e, "Mint submission outcome unknown");
                return Err(e.into());
            }
            Err(e) => {
                warn!(account, amount, error = %e, "Mint submission failed");
                return Ok(MintResult::rejected(
                    account,
                    amount,
                    format!("Failed to Submit due to error: {}", e),
                ));
            }
        };

        let outcome = commit.wait().await?;
        if !outcome.successful {
            warn!(
                tx_id = %outcome.transaction_id,
                code = outcome.code,
                "Mint failed to commit"
            );
            return Ok(MintResult {
                message: commit_rejected_message(&outcome.transaction_id, outcome.code),
                tx_id: outcome.transaction_id,
                account: account.to_string(),
                amount,
                success: false,
            });
        }
        info!(tx_id = %outcome.transaction_id, amount, "Mint committed");

        // 3. Relay
        let mint_tx_id = outcome.transaction_id;
        if let Some(failure) = self.relay(route, amount).await {
            self.journal
                .record(&route.bank, &route.source, amount, &mint_tx_id, failure);
            return Ok(MintResult {
                tx_id: mint_tx_id,
                account: account.to_string(),
                amount,
                success: false,
                message: messages::RELAY_FAILED.to_string(),
            });
        }

        // 4. Both hops committed
        Ok(MintResult {
            tx_id: mint_tx_id,
            account: account.to_string(),
            amount,
            success: true,
            message: messages::MINT_SUCCESS.to_string(),
        })
    }

    /// Relay minted funds along `route`; `None` when the relay committed
    async fn relay(&self, route: &RelayRoute, amount: Amount) -> Option<RelayFailure> {
        info!("Transferring {} to {}", amount, route.bank);
        match self
            .engine
            .transfer_from(&route.source, &route.bank, &amount.to_string())
            .await
        {
            Ok(result) if result.success => None,
            Ok(result) => Some(RelayFailure::Rejected {
                relay_tx_id: (!result.never_submitted()).then_some(result.tx_id),
                message: result.message,
            }),
            Err(e) => Some(relay_error(&e)),
        }
    }

    /// Re-attempt a journaled relay the ledger explicitly rejected
    pub async fn retry_relay(&self, id: &str) -> Result<TransferResult, SettlementError> {
        // Claim first so concurrent retries cannot relay twice
        let pending = self
            .journal
            .claim(id)
            .ok_or_else(|| SettlementError::PendingRelayNotFound(id.to_string()))?;
        if !pending.failure.is_retryable() {
            self.journal.release(pending);
            return Err(SettlementError::RelayNotRetryable(id.to_string()));
        }

        info!(id, mint_tx_id = %pending.mint_tx_id, attempt = pending.attempts + 1, "Retrying relay");
        match self
            .engine
            .transfer_from(&pending.source, &pending.bank, &pending.amount.to_string())
            .await
        {
            Ok(result) if result.success => {
                info!(id, tx_id = %result.tx_id, "Pending relay settled");
                Ok(result)
            }
            Ok(result) => {
                let failure = RelayFailure::Rejected {
                    relay_tx_id: (!result.never_submitted()).then(|| result.tx_id.clone()),
                    message: result.message.clone(),
                };
                self.journal.restore(pending, failure);
                Ok(result)
            }
            Err(e) => {
                self.journal.restore(pending, relay_error(&e));
                Err(e)
            }
        }
    }

    /// Operator confirms a pending relay was settled out of band
    pub fn resolve_relay(&self, id: &str) -> Result<PendingRelay, SettlementError> {
        self.journal
            .resolve(id)
            .ok_or_else(|| SettlementError::PendingRelayNotFound(id.to_string()))
    }
}

fn relay_error(e: &SettlementError) -> RelayFailure {
    let relay_tx_id = match e {
        SettlementError::Ledger(le) => le.transaction_id().map(str::to_string),
        _ => None,
    };
    if e.is_outcome_unknown() {
        RelayFailure::OutcomeUnknown {
            relay_tx_id,
            message: e.to_string(),
        }
    } else {
        RelayFailure::Rejected {
            relay_tx_id,
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::MVCC_READ_CONFLICT;
    use crate::ledger::{Fault, InMemoryLedger, MemorySession};
    use crate::settlement::types::SENTINEL_TX_ID;

    struct Harness {
        ledger: InMemoryLedger,
        session: Arc<MemorySession>,
        minter: MintRelayOrchestrator,
    }

    fn harness() -> Harness {
        let ledger = InMemoryLedger::with_minter("rbi.cbdc");
        let session = Arc::new(ledger.session("rbi.cbdc"));
        let client = LedgerClient::new(session.clone());
        let engine = Arc::new(TransferEngine::new(client.clone()));
        let minter = MintRelayOrchestrator::new(
            client,
            engine,
            BankWhitelist::new("rbi.cbdc", BankWhitelist::default_banks()),
            Arc::new(PendingRelayJournal::new()),
        );
        Harness {
            ledger,
            session,
            minter,
        }
    }

    #[tokio::test]
    async fn test_mint_and_relay_success() {
        let h = harness();

        let result = h.minter.mint_request("hdfc.cbdc", 100).await.unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Success!");
        assert_eq!(result.account, "hdfc.cbdc");
        assert_eq!(h.ledger.balance("hdfc.cbdc"), 100);
        assert_eq!(h.ledger.balance("rbi.cbdc"), 0);
        assert_eq!(h.session.submit_count(functions::MINT), 1);
        assert_eq!(h.session.submit_count(functions::TRANSFER_FROM), 1);
    }

    #[tokio::test]
    async fn test_unwhitelisted_account_never_touches_ledger() {
        let h = harness();

        for account in ["unknown.cbdc", "alice.cbdc", "rbi.cbdc", ""] {
            let result = h.minter.mint_request(account, 100).await.unwrap();
            assert!(!result.success);
            assert_eq!(result.tx_id, "xxxxx");
            assert_eq!(result.message, "Not Authorized to Mint!");
        }
        assert_eq!(h.session.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_amount_rejected_before_ledger() {
        let h = harness();

        let result = h.minter.mint_request("axis.cbdc", 0).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.tx_id, SENTINEL_TX_ID);
        assert!(result.message.contains("Invalid Amount"));
        assert_eq!(h.session.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_mint_submit_failure_reports_sentinel() {
        let h = harness();
        h.session.inject(
            functions::MINT,
            Fault::Endorsement("chaincode unavailable".into()),
        );

        let result = h.minter.mint_request("axis.cbdc", 100).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.tx_id, SENTINEL_TX_ID);
        assert!(result.message.starts_with("Failed to Submit due to error"));
        assert_eq!(h.session.submit_count(functions::TRANSFER_FROM), 0);
    }

    #[tokio::test]
    async fn test_mint_commit_rejected_carries_mint_tx_id() {
        let h = harness();
        h.session
            .inject(functions::MINT, Fault::CommitRejected(MVCC_READ_CONFLICT));

        let result = h.minter.mint_request("axis.cbdc", 100).await.unwrap();

        assert!(!result.success);
        assert_ne!(result.tx_id, SENTINEL_TX_ID);
        assert!(result.message.contains(&result.tx_id));
        assert_eq!(h.session.submit_count(functions::TRANSFER_FROM), 0);
        assert_eq!(h.ledger.balance("axis.cbdc"), 0);
    }

    #[tokio::test]
    async fn test_mint_outcome_unknown_is_error() {
        let h = harness();
        h.session.inject(functions::MINT, Fault::CommitStatusError);

        let err = h.minter.mint_request("axis.cbdc", 100).await.unwrap_err();

        assert!(err.is_outcome_unknown());
        assert_eq!(h.session.submit_count(functions::TRANSFER_FROM), 0);
    }

    #[tokio::test]
    async fn test_relay_failure_is_partial_failure() {
        let h = harness();
        h.session.inject(
            functions::TRANSFER_FROM,
            Fault::CommitRejected(MVCC_READ_CONFLICT),
        );

        let result = h.minter.mint_request("hdfc.cbdc", 100).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.message, "Failed to transfer");
        assert_ne!(result.tx_id, SENTINEL_TX_ID);
        // Mint moved issuer state; the bank got nothing
        assert_eq!(h.ledger.balance("rbi.cbdc"), 100);
        assert_eq!(h.ledger.balance("hdfc.cbdc"), 0);

        let pending = h.minter.journal().list();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].mint_tx_id, result.tx_id);
        assert!(pending[0].failure.is_retryable());
    }

    #[tokio::test]
    async fn test_retry_rejected_relay() {
        let h = harness();
        h.session.inject(
            functions::TRANSFER_FROM,
            Fault::CommitRejected(MVCC_READ_CONFLICT),
        );
        h.minter.mint_request("hdfc.cbdc", 100).await.unwrap();
        let id = h.minter.journal().list()[0].id.clone();

        let relay = h.minter.retry_relay(&id).await.unwrap();

        assert!(relay.success);
        assert_eq!(h.ledger.balance("hdfc.cbdc"), 100);
        assert!(h.minter.journal().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_relay_outcome_cannot_be_retried() {
        let h = harness();
        h.session
            .inject(functions::TRANSFER_FROM, Fault::CommitStatusError);
        let result = h.minter.mint_request("axis.cbdc", 40).await.unwrap();
        assert_eq!(result.message, "Failed to transfer");

        let id = h.minter.journal().list()[0].id.clone();
        let err = h.minter.retry_relay(&id).await.unwrap_err();
        assert!(matches!(err, SettlementError::RelayNotRetryable(_)));

        // Still journaled exactly as recorded, and nothing was re-sent
        let kept = h.minter.journal().get(&id).unwrap();
        assert_eq!(kept.attempts, 1);
        assert!(matches!(kept.failure, RelayFailure::OutcomeUnknown { .. }));
        assert_eq!(h.session.submit_count(functions::TRANSFER_FROM), 1);

        let resolved = h.minter.resolve_relay(&id).unwrap();
        assert_eq!(resolved.bank, "axis.cbdc");
        assert!(h.minter.journal().is_empty());
        assert!(matches!(
            h.minter.resolve_relay(&id),
            Err(SettlementError::PendingRelayNotFound(_))
        ));
    }
}
