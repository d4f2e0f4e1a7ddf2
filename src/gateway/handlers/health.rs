//! Health check handler

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Json, extract::State};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResponse};
use crate::ledger::functions;

/// Health check response data
#[derive(serde::Serialize, serde::Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "participant")]
    pub role: String,
    #[schema(example = "axis.cbdc")]
    pub account: String,
    /// Build revision
    pub version: String,
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
}

/// Health check endpoint
///
/// Evaluates `ClientAccountID` to confirm the ledger session is usable.
///
/// - Healthy: 200 OK + {code: 0, data: {...}}
/// - Unhealthy: 503 Service Unavailable + {code: 5001, msg: "unavailable"}
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Ledger unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    match state
        .ledger
        .evaluate(functions::CLIENT_ACCOUNT_ID, &[])
        .await
    {
        Ok(_) => Ok(Json(ApiResponse::success(HealthResponse {
            role: state.role.as_str().to_string(),
            account: state.bank_account.clone(),
            version: env!("GIT_HASH").to_string(),
            timestamp_ms: now_ms,
        }))),
        Err(e) => {
            tracing::error!(stage = %e.stage(), "[HEALTH] Ledger probe failed: {}", e);
            Err(ApiError::service_unavailable("unavailable"))
        }
    }
}
