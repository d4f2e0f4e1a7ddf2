//! Pending-relay journal
//!
//! A mint that committed while its relay to the bank did not leaves the
//! issuer holding value the bank never received. No automatic reversal is
//! attempted; the partial failure is reported to the caller and recorded here
//! for an operator.
//!
//! Only relays the ledger explicitly rejected may be retried. A relay with an
//! unknown outcome may already be on the ledger and has to be checked by hand.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use super::types::{Account, Amount};

/// How the relay hop failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayFailure {
    /// Ledger reported the relay invalid; no value moved
    Rejected {
        relay_tx_id: Option<String>,
        message: String,
    },
    /// Relay may or may not be on the ledger
    OutcomeUnknown {
        relay_tx_id: Option<String>,
        message: String,
    },
}

impl RelayFailure {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayFailure::Rejected { .. })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRelay {
    /// Journal entry id (ULID)
    pub id: String,
    pub bank: Account,
    pub source: Account,
    pub amount: Amount,
    pub mint_tx_id: String,
    pub failure: RelayFailure,
    pub attempts: u32,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct PendingRelayJournal {
    entries: DashMap<String, PendingRelay>,
}

impl PendingRelayJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a relay that failed after its mint committed
    pub fn record(
        &self,
        bank: &str,
        source: &str,
        amount: Amount,
        mint_tx_id: &str,
        failure: RelayFailure,
    ) -> PendingRelay {
        let entry = PendingRelay {
            id: ulid::Ulid::new().to_string(),
            bank: bank.to_string(),
            source: source.to_string(),
            amount,
            mint_tx_id: mint_tx_id.to_string(),
            failure,
            attempts: 1,
            recorded_at: Utc::now(),
        };
        error!(
            id = %entry.id,
            mint_tx_id = %entry.mint_tx_id,
            bank = %entry.bank,
            amount,
            failure = ?entry.failure,
            "Mint committed but relay failed; recorded for operator resolution"
        );
        self.entries.insert(entry.id.clone(), entry.clone());
        entry
    }

    /// Open entries, oldest first
    pub fn list(&self) -> Vec<PendingRelay> {
        let mut entries: Vec<PendingRelay> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    pub fn get(&self, id: &str) -> Option<PendingRelay> {
        self.entries.get(id).map(|e| e.value().clone())
    }

    /// Remove an entry so exactly one caller can act on it
    pub fn claim(&self, id: &str) -> Option<PendingRelay> {
        self.entries.remove(id).map(|(_, entry)| entry)
    }

    /// Put a claimed entry back after another failed attempt
    pub fn restore(&self, mut entry: PendingRelay, failure: RelayFailure) {
        entry.attempts += 1;
        entry.failure = failure;
        self.entries.insert(entry.id.clone(), entry);
    }

    /// Put a claimed entry back untouched
    pub fn release(&self, entry: PendingRelay) {
        self.entries.insert(entry.id.clone(), entry);
    }

    /// Operator confirmed the entry was settled out of band
    pub fn resolve(&self, id: &str) -> Option<PendingRelay> {
        let resolved = self.claim(id);
        if let Some(ref entry) = resolved {
            info!(id = %entry.id, mint_tx_id = %entry.mint_tx_id, "Pending relay resolved by operator");
        }
        resolved
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> RelayFailure {
        RelayFailure::Rejected {
            relay_tx_id: Some("relay1".into()),
            message: "transaction relay1 failed to commit with status: 11".into(),
        }
    }

    #[test]
    fn test_record_and_list() {
        let journal = PendingRelayJournal::new();
        let first = journal.record("hdfc.cbdc", "rbi.cbdc", 100, "mint1", rejected());
        let second = journal.record("axis.cbdc", "rbi.cbdc", 50, "mint2", rejected());

        let entries = journal.list();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.id == first.id));
        assert!(entries.iter().any(|e| e.id == second.id));
        assert_eq!(journal.get(&first.id).unwrap().mint_tx_id, "mint1");
    }

    #[test]
    fn test_claim_is_exclusive() {
        let journal = PendingRelayJournal::new();
        let entry = journal.record("hdfc.cbdc", "rbi.cbdc", 100, "mint1", rejected());

        assert!(journal.claim(&entry.id).is_some());
        assert!(journal.claim(&entry.id).is_none());
        assert!(journal.is_empty());
    }

    #[test]
    fn test_restore_bumps_attempts() {
        let journal = PendingRelayJournal::new();
        let entry = journal.record("hdfc.cbdc", "rbi.cbdc", 100, "mint1", rejected());
        let claimed = journal.claim(&entry.id).unwrap();

        journal.restore(
            claimed,
            RelayFailure::OutcomeUnknown {
                relay_tx_id: None,
                message: "timeout".into(),
            },
        );

        let restored = journal.get(&entry.id).unwrap();
        assert_eq!(restored.attempts, 2);
        assert!(!restored.failure.is_retryable());
    }

    #[test]
    fn test_failure_serialization() {
        let json = serde_json::to_value(rejected()).unwrap();
        assert_eq!(json["kind"], "REJECTED");
        assert_eq!(json["relay_tx_id"], "relay1");
    }
}
