//! Operations served by every node: GetBalance, CreateAccount, Tx

use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::{
    AccountRequest, ApiError, ApiResult, BalanceResponse, TxRequest, ok,
};
use super::detached;
use crate::settlement::{CreateAccountResult, TransferResult};

/// Balance of an account
///
/// POST /v1/getBalance
#[utoipa::path(
    post,
    path = "/v1/getBalance",
    request_body = AccountRequest,
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 400, description = "Missing account"),
        (status = 422, description = "Ledger refused the query (unknown account)"),
        (status = 503, description = "Ledger unreachable")
    ),
    tag = "Ledger"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccountRequest>,
) -> ApiResult<BalanceResponse> {
    if req.account.trim().is_empty() {
        return Err(ApiError::bad_request("account must be non-empty"));
    }
    let balance = state.engine.balance_of(&req.account).await?;
    ok(BalanceResponse { balance })
}

/// Provision an end-user account from this node's bank pool
///
/// POST /v1/createAccount
#[utoipa::path(
    post,
    path = "/v1/createAccount",
    request_body = AccountRequest,
    responses(
        (status = 200, description = "Provisioning result", body = CreateAccountResult),
        (status = 503, description = "Ledger unreachable"),
        (status = 504, description = "Ledger outcome unknown")
    ),
    tag = "Ledger"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccountRequest>,
) -> ApiResult<CreateAccountResult> {
    let provisioner = state.provisioner.clone();
    let result = detached("createAccount", async move {
        provisioner.create_account(&req.account).await
    })
    .await?;
    ok(result)
}

/// Direct point-to-point transfer
///
/// POST /v1/tx
#[utoipa::path(
    post,
    path = "/v1/tx",
    request_body = TxRequest,
    responses(
        (status = 200, description = "Transfer result (success may be false)", body = TransferResult),
        (status = 503, description = "Ledger unreachable"),
        (status = 504, description = "Ledger outcome unknown")
    ),
    tag = "Ledger"
)]
pub async fn tx(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TxRequest>,
) -> ApiResult<TransferResult> {
    let engine = state.engine.clone();
    let amount = req.amount.as_raw();
    let result = detached("tx", async move {
        engine.transfer_from(&req.from, &req.to, &amount).await
    })
    .await?;
    ok(result)
}
