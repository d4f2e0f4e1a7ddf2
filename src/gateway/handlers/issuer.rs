//! Issuer-only operations: Mint and pending-relay administration

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use super::super::state::AppState;
use super::super::types::{AmountRequest, ApiError, ApiResult, ok};
use super::detached;
use crate::settlement::types::messages;
use crate::settlement::{
    MintRelayOrchestrator, MintResult, PendingRelay, TransferResult, parse_amount,
};

fn minter(state: &AppState) -> Result<Arc<MintRelayOrchestrator>, ApiError> {
    state
        .minter
        .clone()
        .ok_or_else(|| ApiError::not_found("Mint is served by the issuer only"))
}

/// Mint and relay funds to a whitelisted bank
///
/// POST /v1/mint
#[utoipa::path(
    post,
    path = "/v1/mint",
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Mint result; success only if mint and relay committed", body = MintResult),
        (status = 503, description = "Ledger unreachable"),
        (status = 504, description = "Mint outcome unknown")
    ),
    tag = "Issuer"
)]
pub async fn mint(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AmountRequest>,
) -> ApiResult<MintResult> {
    let minter = minter(&state)?;
    let amount = match parse_amount(&req.amount.as_raw()) {
        Ok(v) => v,
        Err(e) => {
            // Authorization is checked before the amount
            let message = if minter.whitelist().contains(&req.account) {
                e.to_string()
            } else {
                messages::NOT_AUTHORIZED_TO_MINT.to_string()
            };
            return ok(MintResult::rejected(&req.account, 0, message));
        }
    };

    let result = detached("mint", async move {
        minter.mint_request(&req.account, amount).await
    })
    .await?;
    ok(result)
}

/// Relays that failed after their mint committed
///
/// GET /v1/admin/pendingRelays
#[utoipa::path(
    get,
    path = "/v1/admin/pendingRelays",
    responses(
        (status = 200, description = "Open journal entries, oldest first", body = Vec<PendingRelay>)
    ),
    tag = "Issuer"
)]
pub async fn list_pending_relays(State(state): State<Arc<AppState>>) -> ApiResult<Vec<PendingRelay>> {
    let minter = minter(&state)?;
    ok(minter.journal().list())
}

/// Re-attempt a relay the ledger explicitly rejected
///
/// POST /v1/admin/pendingRelays/{id}/retry
#[utoipa::path(
    post,
    path = "/v1/admin/pendingRelays/{id}/retry",
    params(
        ("id" = String, Path, description = "Journal entry id (ULID)")
    ),
    responses(
        (status = 200, description = "Relay attempt result; the entry is removed on success", body = TransferResult),
        (status = 404, description = "No such entry"),
        (status = 409, description = "Relay outcome unknown; resolve manually")
    ),
    tag = "Issuer"
)]
pub async fn retry_pending_relay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TransferResult> {
    let minter = minter(&state)?;
    let result = detached("retryRelay", async move { minter.retry_relay(&id).await }).await?;
    ok(result)
}

/// Operator confirms a relay was settled out of band
///
/// POST /v1/admin/pendingRelays/{id}/resolve
#[utoipa::path(
    post,
    path = "/v1/admin/pendingRelays/{id}/resolve",
    params(
        ("id" = String, Path, description = "Journal entry id (ULID)")
    ),
    responses(
        (status = 200, description = "The removed entry", body = PendingRelay),
        (status = 404, description = "No such entry")
    ),
    tag = "Issuer"
)]
pub async fn resolve_pending_relay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<PendingRelay> {
    let minter = minter(&state)?;
    ok(minter.resolve_relay(&id)?)
}
