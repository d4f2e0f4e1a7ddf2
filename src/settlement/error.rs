//! Settlement Error Types
//!
//! `InvalidAmount` and `NotAuthorized` never leave the orchestrators as errors:
//! they are folded into `success = false` results because no ledger state
//! changed. Everything else reaches the caller as a failure of the whole
//! operation.

use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Error, Debug, Clone)]
pub enum SettlementError {
    // === Resolved locally ===
    #[error("Invalid Amount {0}")]
    InvalidAmount(String),

    #[error("Not Authorized to Mint!")]
    NotAuthorized(String),

    // === Ledger ===
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // === Issuer hop ===
    #[error("Issuer request failed: {0}")]
    Issuer(String),

    // === Reconciliation ===
    #[error("Pending relay not found: {0}")]
    PendingRelayNotFound(String),

    #[error("Pending relay {0} has an unknown outcome and cannot be retried")]
    RelayNotRetryable(String),
}

impl SettlementError {
    pub fn code(&self) -> &'static str {
        match self {
            SettlementError::InvalidAmount(_) => "INVALID_AMOUNT",
            SettlementError::NotAuthorized(_) => "NOT_AUTHORIZED",
            SettlementError::Ledger(e) if e.is_outcome_unknown() => "LEDGER_OUTCOME_UNKNOWN",
            SettlementError::Ledger(e) => e.code(),
            SettlementError::Issuer(_) => "ISSUER_UNAVAILABLE",
            SettlementError::PendingRelayNotFound(_) => "PENDING_RELAY_NOT_FOUND",
            SettlementError::RelayNotRetryable(_) => "RELAY_NOT_RETRYABLE",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            SettlementError::InvalidAmount(_) => 400,
            SettlementError::NotAuthorized(_) => 403,
            SettlementError::PendingRelayNotFound(_) => 404,
            SettlementError::RelayNotRetryable(_) => 409,
            SettlementError::Ledger(e) if e.is_outcome_unknown() => 504,
            SettlementError::Ledger(LedgerError::Endorsement { .. }) => 422,
            SettlementError::Ledger(LedgerError::MalformedResponse(_)) => 502,
            SettlementError::Ledger(_) => 503,
            SettlementError::Issuer(_) => 502,
        }
    }

    /// True when the caller cannot know whether value moved
    pub fn is_outcome_unknown(&self) -> bool {
        match self {
            SettlementError::Ledger(e) => e.is_outcome_unknown(),
            SettlementError::Issuer(_) => true,
            _ => false,
        }
    }
}

/// Parse a transfer amount; it must be a positive integer
pub fn parse_amount(raw: &str) -> Result<u64, SettlementError> {
    match raw.trim().parse::<i128>() {
        Ok(value) if value > 0 => u64::try_from(value).map_err(|_| {
            SettlementError::InvalidAmount(format!("{}; generated error: exceeds u64", raw))
        }),
        Ok(_) => Err(SettlementError::InvalidAmount(format!(
            "{}; generated error: must be positive",
            raw
        ))),
        Err(e) => Err(SettlementError::InvalidAmount(format!(
            "{}; generated error: {}",
            raw, e
        ))),
    }
}
