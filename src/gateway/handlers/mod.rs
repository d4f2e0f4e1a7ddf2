//! HTTP handlers
//!
//! Pure request/response marshalling over the settlement orchestrators.

mod funding;
mod health;
mod issuer;
mod ledger;

pub use funding::*;
pub use health::*;
pub use issuer::*;
pub use ledger::*;

use std::future::Future;

use super::types::ApiError;
use crate::settlement::SettlementError;

/// Run `op` on its own task.
///
/// A client hanging up must not cancel a submitted transaction's commit wait;
/// the spawned task runs to completion and logs its outcome either way.
pub(crate) async fn detached<F, T>(name: &'static str, op: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, SettlementError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(op).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            let stage = match &e {
                SettlementError::Ledger(le) => le.stage().as_str(),
                _ => "-",
            };
            if e.is_outcome_unknown() {
                tracing::error!(operation = name, stage, error = %e, "Operation outcome unknown");
            } else {
                tracing::warn!(operation = name, stage, error = %e, "Operation failed");
            }
            Err(e.into())
        }
        Err(e) => {
            tracing::error!(operation = name, error = %e, "Operation task aborted");
            Err(ApiError::internal(format!("{} aborted", name)))
        }
    }
}
