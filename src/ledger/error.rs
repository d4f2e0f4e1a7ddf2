//! Ledger Error Types
//!
//! Classifies every failure the ledger boundary can produce by the stage at
//! which it happened. The stage decides whether the ledger state is known.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Stage of a ledger interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStage {
    Connect,
    Evaluate,
    Endorse,
    Submit,
    CommitStatus,
}

impl LedgerStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStage::Connect => "CONNECT",
            LedgerStage::Evaluate => "EVALUATE",
            LedgerStage::Endorse => "ENDORSE",
            LedgerStage::Submit => "SUBMIT",
            LedgerStage::CommitStatus => "COMMIT_STATUS",
        }
    }
}

impl fmt::Display for LedgerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    /// The gateway/peer could not be reached at all
    #[error("Ledger unreachable: {0}")]
    Connectivity(String),

    /// Peers refused to endorse (chaincode error, policy failure)
    #[error("Endorsement refused: {message}")]
    Endorsement {
        transaction_id: Option<String>,
        message: String,
    },

    /// Ordering/broadcast failed after endorsement
    #[error("Failed to submit transaction: {message}")]
    Submit {
        transaction_id: Option<String>,
        message: String,
    },

    #[error("Failed to get commit status for transaction {transaction_id}: {message}")]
    CommitStatus {
        transaction_id: String,
        message: String,
    },

    #[error("Timeout after {timeout:?} waiting for commit of transaction {transaction_id}")]
    CommitTimeout {
        transaction_id: String,
        timeout: Duration,
    },

    /// Ledger answered with something we cannot interpret
    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),
}

impl LedgerError {
    pub fn stage(&self) -> LedgerStage {
        match self {
            LedgerError::Connectivity(_) => LedgerStage::Connect,
            LedgerError::MalformedResponse(_) => LedgerStage::Evaluate,
            LedgerError::Endorsement { .. } => LedgerStage::Endorse,
            LedgerError::Submit { .. } => LedgerStage::Submit,
            LedgerError::CommitStatus { .. } | LedgerError::CommitTimeout { .. } => {
                LedgerStage::CommitStatus
            }
        }
    }

    /// True when the transaction may or may not have been recorded.
    ///
    /// Callers must not re-submit in this case: a second submission can
    /// duplicate value movement.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(
            self,
            LedgerError::Submit { .. }
                | LedgerError::CommitStatus { .. }
                | LedgerError::CommitTimeout { .. }
        )
    }

    /// Transaction id attached to the failure, when the ledger assigned one
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            LedgerError::Endorsement { transaction_id, .. }
            | LedgerError::Submit { transaction_id, .. } => transaction_id.as_deref(),
            LedgerError::CommitStatus { transaction_id, .. }
            | LedgerError::CommitTimeout { transaction_id, .. } => Some(transaction_id),
            LedgerError::Connectivity(_) | LedgerError::MalformedResponse(_) => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Connectivity(_) => "LEDGER_UNREACHABLE",
            LedgerError::Endorsement { .. } => "LEDGER_ENDORSEMENT_FAILED",
            LedgerError::Submit { .. } => "LEDGER_SUBMIT_FAILED",
            LedgerError::CommitStatus { .. } => "LEDGER_COMMIT_STATUS_FAILED",
            LedgerError::CommitTimeout { .. } => "LEDGER_COMMIT_TIMEOUT",
            LedgerError::MalformedResponse(_) => "LEDGER_MALFORMED_RESPONSE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_unknown_classification() {
        assert!(!LedgerError::Connectivity("down".into()).is_outcome_unknown());
        assert!(
            !LedgerError::Endorsement {
                transaction_id: None,
                message: "policy".into()
            }
            .is_outcome_unknown()
        );
        assert!(
            LedgerError::Submit {
                transaction_id: Some("tx1".into()),
                message: "orderer".into()
            }
            .is_outcome_unknown()
        );
        assert!(
            LedgerError::CommitTimeout {
                transaction_id: "tx1".into(),
                timeout: Duration::from_secs(60)
            }
            .is_outcome_unknown()
        );
    }

    #[test]
    fn test_stage_and_transaction_id() {
        let err = LedgerError::CommitStatus {
            transaction_id: "abc".into(),
            message: "stream closed".into(),
        };
        assert_eq!(err.stage(), LedgerStage::CommitStatus);
        assert_eq!(err.transaction_id(), Some("abc"));
        let err = LedgerError::Connectivity("x".into());
        assert_eq!(err.stage(), LedgerStage::Connect);
        assert_eq!(err.stage().to_string(), "CONNECT");
        assert_eq!(err.transaction_id(), None);
    }

    #[test]
    fn test_display() {
        let err = LedgerError::Submit {
            transaction_id: None,
            message: "broadcast rejected".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to submit transaction: broadcast rejected"
        );
    }
}
