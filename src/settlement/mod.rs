//! Settlement orchestration
//!
//! # Flows
//!
//! ```text
//! Fund (participant) ──RPC──▶ MintRequest (issuer) ──▶ TransferEngine ──▶ Ledger
//!        │
//!        └──────────────▶ TransferEngine (bank → end user) ──▶ Ledger
//! ```
//!
//! Every hop is an independently committed ledger transaction. There is no
//! cross-hop atomicity: a failed hop is reported under its own transaction id
//! and never compensated automatically.

pub mod error;
pub mod funding;
pub mod issuer;
pub mod mint;
pub mod provision;
pub mod reconcile;
pub mod transfer;
pub mod types;
pub mod whitelist;

pub use error::{SettlementError, parse_amount};
pub use funding::FundingOrchestrator;
pub use issuer::{HttpIssuerClient, IssuerClient, LocalIssuer, MintRequest};
pub use mint::MintRelayOrchestrator;
pub use provision::AccountProvisioner;
pub use reconcile::{PendingRelay, PendingRelayJournal, RelayFailure};
pub use transfer::TransferEngine;
pub use types::{
    Account, Amount, CreateAccountResult, FundResult, MintResult, SENTINEL_TX_ID, TransferResult,
};
pub use whitelist::BankWhitelist;
