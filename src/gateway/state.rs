use std::sync::Arc;

use crate::config::NodeRole;
use crate::ledger::LedgerClient;
use crate::settlement::{
    Account, AccountProvisioner, FundingOrchestrator, MintRelayOrchestrator, TransferEngine,
};

/// Shared state of one node's facade
#[derive(Clone)]
pub struct AppState {
    pub role: NodeRole,
    /// Account owned by this node's ledger identity
    pub bank_account: Account,
    pub ledger: LedgerClient,
    pub engine: Arc<TransferEngine>,
    pub provisioner: Arc<AccountProvisioner>,
    /// Issuer only
    pub minter: Option<Arc<MintRelayOrchestrator>>,
    /// Participants only
    pub funding: Option<Arc<FundingOrchestrator>>,
}

impl AppState {
    pub fn issuer(
        bank_account: impl Into<Account>,
        engine: Arc<TransferEngine>,
        provisioner: Arc<AccountProvisioner>,
        minter: Arc<MintRelayOrchestrator>,
    ) -> Self {
        Self {
            role: NodeRole::Issuer,
            bank_account: bank_account.into(),
            ledger: engine.ledger().clone(),
            engine,
            provisioner,
            minter: Some(minter),
            funding: None,
        }
    }

    pub fn participant(
        bank_account: impl Into<Account>,
        engine: Arc<TransferEngine>,
        provisioner: Arc<AccountProvisioner>,
        funding: Arc<FundingOrchestrator>,
    ) -> Self {
        Self {
            role: NodeRole::Participant,
            bank_account: bank_account.into(),
            ledger: engine.ledger().clone(),
            engine,
            provisioner,
            minter: None,
            funding: Some(funding),
        }
    }
}
