//! Ledger transport seam
//!
//! A `LedgerGateway` is one identity's session against the shared ledger.
//! Implementations only move bytes; deadlines live in [`super::LedgerClient`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Chaincode function names understood by the CBDC contract
pub mod functions {
    pub const INITIALIZE: &str = "Initialize";
    pub const NAME: &str = "Name";
    pub const SYMBOL: &str = "Symbol";
    pub const DECIMALS: &str = "Decimals";
    pub const CLIENT_ACCOUNT_ID: &str = "ClientAccountID";
    pub const CLIENT_ACCOUNT_BALANCE: &str = "ClientAccountBalance";
    pub const BALANCE_OF: &str = "BalanceOf";
    pub const MINT: &str = "Mint";
    pub const TRANSFER: &str = "Transfer";
    pub const TRANSFER_FROM: &str = "TransferFrom";
}

/// Returned once a transaction has been endorsed and sent for ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTransaction {
    pub transaction_id: String,
}

/// Final commit status reported by the ledger.
///
/// The only authority on whether a submitted transaction is durable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub transaction_id: String,
    pub successful: bool,
    /// Ledger validation code (0 = VALID)
    pub code: i32,
}

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Transport name for logging
    fn name(&self) -> &'static str;

    /// Read-only query, nothing is committed
    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError>;

    /// Endorse and send a state-changing transaction to ordering.
    ///
    /// Returns as soon as ordering accepted it; commit is observed separately.
    async fn submit(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<SubmittedTransaction, LedgerError>;

    /// Block until the ledger reports the commit status of `transaction_id`
    async fn commit_status(&self, transaction_id: &str) -> Result<CommitOutcome, LedgerError>;
}
