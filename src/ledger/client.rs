//! Ledger Gateway Client
//!
//! Uniform evaluate / submit / commit-wait primitive over any [`LedgerGateway`].
//! Each stage runs under its own deadline. Nothing here retries: a ledger
//! transaction is not always safe to re-submit.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::LedgerError;
use super::gateway::{CommitOutcome, LedgerGateway};

/// Per-stage deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerTimeouts {
    pub evaluate: Duration,
    pub endorse: Duration,
    pub submit: Duration,
    pub commit_status: Duration,
}

impl Default for LedgerTimeouts {
    fn default() -> Self {
        Self {
            evaluate: Duration::from_secs(5),
            endorse: Duration::from_secs(15),
            submit: Duration::from_secs(5),
            commit_status: Duration::from_secs(60),
        }
    }
}

/// Explicitly owned ledger session, shared by handle between orchestrators
#[derive(Clone)]
pub struct LedgerClient {
    gateway: Arc<dyn LedgerGateway>,
    timeouts: LedgerTimeouts,
}

impl LedgerClient {
    pub fn new(gateway: Arc<dyn LedgerGateway>) -> Self {
        Self::with_timeouts(gateway, LedgerTimeouts::default())
    }

    pub fn with_timeouts(gateway: Arc<dyn LedgerGateway>, timeouts: LedgerTimeouts) -> Self {
        Self { gateway, timeouts }
    }

    pub fn timeouts(&self) -> LedgerTimeouts {
        self.timeouts
    }

    /// Read-only ledger query
    pub async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        debug!(function, gateway = self.gateway.name(), "Evaluate transaction");
        match tokio::time::timeout(self.timeouts.evaluate, self.gateway.evaluate(function, args))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Connectivity(format!(
                "evaluate {} timed out after {:?}",
                function, self.timeouts.evaluate
            ))),
        }
    }

    /// Evaluate and decode the response as UTF-8 text
    pub async fn evaluate_string(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<String, LedgerError> {
        let bytes = self.evaluate(function, args).await?;
        String::from_utf8(bytes).map_err(|e| {
            LedgerError::MalformedResponse(format!("{} returned non UTF-8 data: {}", function, e))
        })
    }

    /// Submit a state-changing transaction.
    ///
    /// The returned handle must be waited on before any result is reported.
    pub async fn submit(&self, function: &str, args: &[String]) -> Result<CommitHandle, LedgerError> {
        debug!(function, gateway = self.gateway.name(), "Submit transaction");
        let deadline = self.timeouts.endorse + self.timeouts.submit;
        let submitted = match tokio::time::timeout(deadline, self.gateway.submit(function, args))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(function, ?deadline, "Submit timed out; outcome unknown");
                return Err(LedgerError::Submit {
                    transaction_id: None,
                    message: format!("{} timed out after {:?}", function, deadline),
                });
            }
        };

        Ok(CommitHandle {
            gateway: Arc::clone(&self.gateway),
            transaction_id: submitted.transaction_id,
            timeout: self.timeouts.commit_status,
        })
    }
}

/// Pending commit of a submitted transaction
pub struct CommitHandle {
    gateway: Arc<dyn LedgerGateway>,
    transaction_id: String,
    timeout: Duration,
}

impl std::fmt::Debug for CommitHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitHandle")
            .field("transaction_id", &self.transaction_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CommitHandle {
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Wait for the commit outcome, bounded by the commit-status deadline
    pub async fn wait(self) -> Result<CommitOutcome, LedgerError> {
        debug!(tx_id = %self.transaction_id, "Waiting for transaction commit");
        match tokio::time::timeout(self.timeout, self.gateway.commit_status(&self.transaction_id))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(LedgerError::CommitTimeout {
                transaction_id: self.transaction_id,
                timeout: self.timeout,
            }),
        }
    }
}
