//! Transfer Engine
//!
//! Executes a single point-to-point value transfer between two existing
//! accounts. The unit of ledger interaction for every hop of every flow.

use tracing::{debug, info, warn};

use super::error::{SettlementError, parse_amount};
use super::types::{TransferResult, commit_rejected_message, messages};
use crate::ledger::{LedgerClient, LedgerError, functions};

pub struct TransferEngine {
    ledger: LedgerClient,
}

impl TransferEngine {
    pub fn new(ledger: LedgerClient) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &LedgerClient {
        &self.ledger
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Invalid input yields a `success = false` result without touching the
    /// ledger. Ledger failures are returned as errors: the transfer may or
    /// may not have happened and must not be reported as a plain failure.
    pub async fn transfer_from(
        &self,
        from: &str,
        to: &str,
        amount: &str,
    ) -> Result<TransferResult, SettlementError> {
        debug!(from, to, amount, "Transfer requested");

        let value = match parse_amount(amount) {
            Ok(v) => v,
            Err(e) => {
                warn!(from, to, amount, "Rejected transfer: {}", e);
                return Ok(TransferResult::rejected(from, to, 0, e.to_string()));
            }
        };

        if from.trim().is_empty() || to.trim().is_empty() {
            return Ok(TransferResult::rejected(
                from,
                to,
                value,
                "Invalid Account: source and target must be non-empty",
            ));
        }

        let commit = self
            .ledger
            .submit(
                functions::TRANSFER_FROM,
                &[from.to_string(), to.to_string(), value.to_string()],
            )
            .await?;
        let outcome = commit.wait().await?;

        if !outcome.successful {
            warn!(
                tx_id = %outcome.transaction_id,
                code = outcome.code,
                "Transfer {} -> {} failed to commit", from, to
            );
            return Ok(TransferResult {
                message: commit_rejected_message(&outcome.transaction_id, outcome.code),
                tx_id: outcome.transaction_id,
                from: from.to_string(),
                to: to.to_string(),
                amount: value,
                success: false,
            });
        }

        info!(tx_id = %outcome.transaction_id, amount = value, "Transfer committed: {} -> {}", from, to);
        Ok(TransferResult {
            tx_id: outcome.transaction_id,
            from: from.to_string(),
            to: to.to_string(),
            amount: value,
            success: true,
            message: messages::TRANSACTION_COMMITTED.to_string(),
        })
    }

    /// Read-only balance lookup (`BalanceOf`)
    pub async fn balance_of(&self, account: &str) -> Result<u64, SettlementError> {
        let raw = self
            .ledger
            .evaluate_string(functions::BALANCE_OF, &[account.to_string()])
            .await?;
        let balance = raw.trim().parse::<u64>().map_err(|e| {
            LedgerError::MalformedResponse(format!(
                "balance of {} is not an integer ({:?}): {}",
                account, raw, e
            ))
        })?;
        debug!(account, balance, "Balance evaluated");
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::MVCC_READ_CONFLICT;
    use crate::ledger::{Fault, InMemoryLedger, MemorySession};
    use crate::settlement::types::SENTINEL_TX_ID;
    use std::sync::Arc;

    fn setup() -> (InMemoryLedger, Arc<MemorySession>, TransferEngine) {
        let ledger = InMemoryLedger::with_minter("rbi.cbdc");
        ledger.seed("rbi.cbdc", 10_000);
        let session = Arc::new(ledger.session("rbi.cbdc"));
        let engine = TransferEngine::new(LedgerClient::new(session.clone()));
        (ledger, session, engine)
    }

    #[tokio::test]
    async fn test_transfer_committed() {
        let (ledger, _, engine) = setup();

        let result = engine
            .transfer_from("rbi.cbdc", "axis.cbdc", "250")
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Transaction Committed Successfully");
        assert_ne!(result.tx_id, SENTINEL_TX_ID);
        assert_eq!(result.amount, 250);
        assert_eq!(ledger.balance("axis.cbdc"), 250);
    }

    #[tokio::test]
    async fn test_invalid_amounts_never_reach_ledger() {
        let (_, session, engine) = setup();

        for amount in ["-5", "0", "abc", "", "12.5", "-0"] {
            let result = engine
                .transfer_from("rbi.cbdc", "axis.cbdc", amount)
                .await
                .unwrap();
            assert!(!result.success, "amount {:?} should be rejected", amount);
            assert_eq!(result.tx_id, SENTINEL_TX_ID);
            assert!(result.message.contains("Invalid Amount"));
        }

        assert_eq!(session.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_commit_rejected_embeds_tx_id_and_code() {
        let (ledger, session, engine) = setup();
        session.inject(
            functions::TRANSFER_FROM,
            Fault::CommitRejected(MVCC_READ_CONFLICT),
        );

        let result = engine
            .transfer_from("rbi.cbdc", "axis.cbdc", "10")
            .await
            .unwrap();

        assert!(!result.success);
        assert_ne!(result.tx_id, SENTINEL_TX_ID);
        assert!(result.message.contains(&result.tx_id));
        assert!(result.message.contains("11"));
        assert_eq!(ledger.balance("axis.cbdc"), 0);
    }

    #[tokio::test]
    async fn test_unreachable_ledger_is_propagated() {
        let (_, session, engine) = setup();
        session.inject(functions::TRANSFER_FROM, Fault::Connectivity);

        let err = engine
            .transfer_from("rbi.cbdc", "axis.cbdc", "10")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Ledger(LedgerError::Connectivity(_))
        ));
    }

    #[tokio::test]
    async fn test_commit_status_failure_is_outcome_unknown() {
        let (_, session, engine) = setup();
        session.inject(functions::TRANSFER_FROM, Fault::CommitStatusError);

        let err = engine
            .transfer_from("rbi.cbdc", "axis.cbdc", "10")
            .await
            .unwrap_err();
        assert!(err.is_outcome_unknown());
    }

    #[tokio::test]
    async fn test_balance_of() {
        let (_, _, engine) = setup();
        assert_eq!(engine.balance_of("rbi.cbdc").await.unwrap(), 10_000);
    }

    #[tokio::test]
    async fn test_empty_account_rejected() {
        let (_, session, engine) = setup();
        let result = engine.transfer_from("rbi.cbdc", "", "10").await.unwrap();
        assert!(!result.success);
        assert_eq!(session.total_calls(), 0);
    }
}
