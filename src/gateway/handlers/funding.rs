//! Participant-only operation: Fund

use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::{AmountRequest, ApiError, ApiResult, ok};
use super::detached;
use crate::settlement::{FundResult, parse_amount};

/// Fund an end user through the issuer
///
/// POST /v1/fund
#[utoipa::path(
    post,
    path = "/v1/fund",
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Result of the final hop, or the issuer's result verbatim", body = FundResult),
        (status = 502, description = "Issuer unreachable or failed"),
        (status = 503, description = "Ledger unreachable"),
        (status = 504, description = "Ledger outcome unknown")
    ),
    tag = "Participant"
)]
pub async fn fund(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AmountRequest>,
) -> ApiResult<FundResult> {
    let funding = state
        .funding
        .clone()
        .ok_or_else(|| ApiError::not_found("Fund is served by participants only"))?;

    let amount = match parse_amount(&req.amount.as_raw()) {
        Ok(v) => v,
        Err(e) => return ok(FundResult::rejected(&req.account, 0, e.to_string())),
    };

    let result = detached("fund", async move { funding.fund(&req.account, amount).await }).await?;
    ok(result)
}
