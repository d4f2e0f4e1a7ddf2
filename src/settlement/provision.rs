//! Account provisioning
//!
//! The token chaincode has no "ensure account exists" call: a recipient record
//! only appears once value is transferred to it. Provisioning therefore makes
//! two seed transfers from the bank pool. The first brings the record into
//! existence; only the second one's outcome is reported.

use std::sync::Arc;

use tracing::{info, warn};

use super::error::SettlementError;
use super::transfer::TransferEngine;
use super::types::{Account, Amount, CreateAccountResult};

/// Seed transferred by each provisioning call
pub const DEFAULT_SEED_AMOUNT: Amount = 100;

pub struct AccountProvisioner {
    engine: Arc<TransferEngine>,
    bank_pool: Account,
    seed_amount: Amount,
}

impl AccountProvisioner {
    pub fn new(engine: Arc<TransferEngine>, bank_pool: impl Into<Account>, seed_amount: Amount) -> Self {
        Self {
            engine,
            bank_pool: bank_pool.into(),
            seed_amount,
        }
    }

    pub async fn create_account(&self, account: &str) -> Result<CreateAccountResult, SettlementError> {
        if account.trim().is_empty() {
            return Ok(CreateAccountResult {
                account: account.to_string(),
                success: false,
                message: "Invalid Account: account must be non-empty".to_string(),
            });
        }
        let seed = self.seed_amount.to_string();

        let probe = self
            .engine
            .transfer_from(&self.bank_pool, account, &seed)
            .await?;
        if !probe.success {
            warn!(account, tx_id = %probe.tx_id, message = %probe.message, "Seed transfer did not commit");
        }

        let result = self
            .engine
            .transfer_from(&self.bank_pool, account, &seed)
            .await?;
        if result.success {
            info!(account, tx_id = %result.tx_id, "Account provisioned");
        }

        Ok(CreateAccountResult {
            account: account.to_string(),
            success: result.success,
            message: result.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::MVCC_READ_CONFLICT;
    use crate::ledger::{Fault, InMemoryLedger, LedgerClient, MemorySession, functions};

    fn setup() -> (InMemoryLedger, Arc<MemorySession>, AccountProvisioner) {
        let ledger = InMemoryLedger::with_minter("rbi.cbdc");
        ledger.seed("axis.cbdc", 10_000);
        let session = Arc::new(ledger.session("axis.cbdc"));
        let engine = Arc::new(TransferEngine::new(LedgerClient::new(session.clone())));
        let provisioner = AccountProvisioner::new(engine, "axis.cbdc", DEFAULT_SEED_AMOUNT);
        (ledger, session, provisioner)
    }

    #[tokio::test]
    async fn test_create_account_makes_two_seed_transfers() {
        let (ledger, session, provisioner) = setup();

        let result = provisioner.create_account("bob.cbdc").await.unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Transaction Committed Successfully");
        assert_eq!(session.submit_count(functions::TRANSFER_FROM), 2);
        assert_eq!(ledger.balance("bob.cbdc"), 200);
        assert_eq!(ledger.balance("axis.cbdc"), 9_800);
    }

    #[tokio::test]
    async fn test_only_second_transfer_decides() {
        let (_, session, provisioner) = setup();
        session.inject(
            functions::TRANSFER_FROM,
            Fault::CommitRejected(MVCC_READ_CONFLICT),
        );

        let result = provisioner.create_account("bob.cbdc").await.unwrap();

        assert!(result.success);
        assert_eq!(session.submit_count(functions::TRANSFER_FROM), 2);
    }

    #[tokio::test]
    async fn test_seed_ledger_error_aborts() {
        let (_, session, provisioner) = setup();
        session.inject(functions::TRANSFER_FROM, Fault::Submit);
        // First call errors: provisioning aborts before the second submit
        let err = provisioner.create_account("bob.cbdc").await.unwrap_err();
        assert!(err.is_outcome_unknown());
        assert_eq!(session.submit_count(functions::TRANSFER_FROM), 1);
    }

    #[tokio::test]
    async fn test_empty_account_rejected() {
        let (_, session, provisioner) = setup();
        let result = provisioner.create_account(" ").await.unwrap();
        assert!(!result.success);
        assert_eq!(session.total_calls(), 0);
    }
}
