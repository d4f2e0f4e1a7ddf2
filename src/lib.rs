//! CBDC Relay - issuance and settlement relay for a permissioned retail CBDC
//!
//! One issuer (central bank) mints currency and relays it to whitelisted
//! commercial banks; each bank funds its end users out of what it received.
//! Balances live on an external replicated ledger.
//!
//! # Modules
//!
//! - [`ledger`] - Ledger gateway client (evaluate / submit / commit wait)
//! - [`settlement`] - Transfer engine, mint-and-relay and funding orchestrators
//! - [`bootstrap`] - Startup ledger initialisation and identity probe
//! - [`gateway`] - HTTP/JSON service facade
//! - [`node`] - Wiring of a node from its configuration
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod bootstrap;
pub mod config;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod node;
pub mod settlement;

// Convenient re-exports at crate root
pub use config::{AppConfig, NodeRole};
pub use ledger::{LedgerClient, LedgerError, LedgerGateway};
pub use settlement::{
    FundResult, FundingOrchestrator, MintRelayOrchestrator, MintResult, SettlementError,
    TransferEngine, TransferResult,
};
