//! Ledger Gateway Client
//!
//! The shared replicated ledger is an external collaborator. This module is
//! the only place that talks to it.
//!
//! # Layers
//!
//! ```text
//! LedgerClient (deadlines, commit wait)
//!      │
//!      ▼
//! dyn LedgerGateway ──┬── HttpLedgerGateway  (REST gateway, production)
//!                     └── MemorySession      (simulated chaincode, dev/tests)
//! ```
//!
//! # Rules
//!
//! 1. **No retries**: a failed submit may already be recorded
//! 2. **Commit is the authority**: success only after `CommitOutcome.successful`
//! 3. **Per-stage deadlines**: evaluate, endorse+submit and commit-wait time out independently

pub mod client;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

pub use client::{CommitHandle, LedgerClient, LedgerTimeouts};
pub use error::{LedgerError, LedgerStage};
pub use gateway::{CommitOutcome, LedgerGateway, SubmittedTransaction, functions};
pub use http::{HttpLedgerConfig, HttpLedgerGateway};
pub use memory::{Fault, InMemoryLedger, MemorySession};
