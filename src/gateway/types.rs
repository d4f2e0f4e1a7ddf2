//! API request/response types and error codes
//!
//! Successful calls return the settlement DTOs directly (camelCase JSON).
//! Failures use the unified `ApiResponse` body with a numeric code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::settlement::SettlementError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    #[schema(example = 0)]
    pub code: i32,
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error rendered as `ApiResponse<()>`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }
}

impl From<SettlementError> for ApiError {
    fn from(e: SettlementError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match e.code() {
            "INVALID_AMOUNT" => error_codes::INVALID_AMOUNT,
            "NOT_AUTHORIZED" => error_codes::NOT_AUTHORIZED,
            "PENDING_RELAY_NOT_FOUND" => error_codes::PENDING_RELAY_NOT_FOUND,
            "RELAY_NOT_RETRYABLE" => error_codes::RELAY_NOT_RETRYABLE,
            "LEDGER_ENDORSEMENT_FAILED" => error_codes::LEDGER_REJECTED,
            "LEDGER_OUTCOME_UNKNOWN" => error_codes::LEDGER_OUTCOME_UNKNOWN,
            "LEDGER_UNREACHABLE" => error_codes::SERVICE_UNAVAILABLE,
            "ISSUER_UNAVAILABLE" | "LEDGER_MALFORMED_RESPONSE" => error_codes::BAD_GATEWAY,
            _ => error_codes::INTERNAL_ERROR,
        };
        Self::new(status, code, format!("{}: {}", e.code(), e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

/// Standard API error codes
pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INVALID_AMOUNT: i32 = 1002;

    // Auth errors (2xxx)
    pub const NOT_AUTHORIZED: i32 = 2003;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4004;
    pub const PENDING_RELAY_NOT_FOUND: i32 = 4005;
    pub const RELAY_NOT_RETRYABLE: i32 = 4009;
    pub const LEDGER_REJECTED: i32 = 4022;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const BAD_GATEWAY: i32 = 5002;
    pub const LEDGER_OUTCOME_UNKNOWN: i32 = 5004;
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Amount as sent by clients: a JSON number or a decimal string.
///
/// Any JSON number is accepted here (fractions, out-of-range values) and
/// left to `parse_amount`, so it gets the same `Invalid Amount` result as text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    pub fn as_raw(&self) -> String {
        match self {
            AmountInput::Number(n) => n.to_string(),
            AmountInput::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AccountRequest {
    #[schema(example = "alice.cbdc")]
    pub account: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TxRequest {
    #[schema(example = "axis.cbdc")]
    pub from: String,
    #[schema(example = "alice.cbdc")]
    pub to: String,
    #[schema(value_type = String, example = "50")]
    pub amount: AmountInput,
}

/// Body of `/v1/fund` and `/v1/mint`
#[derive(Debug, Deserialize, ToSchema)]
pub struct AmountRequest {
    #[schema(example = "alice.cbdc")]
    pub account: String,
    #[schema(value_type = String, example = "50")]
    pub amount: AmountInput,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 10000)]
    pub balance: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;

    #[test]
    fn test_amount_input_accepts_number_and_string() {
        let req: TxRequest =
            serde_json::from_str(r#"{"from":"a","to":"b","amount":"-5"}"#).unwrap();
        assert_eq!(req.amount.as_raw(), "-5");

        let req: TxRequest = serde_json::from_str(r#"{"from":"a","to":"b","amount":50}"#).unwrap();
        assert_eq!(req.amount.as_raw(), "50");
    }

    #[test]
    fn test_non_integer_numbers_reach_amount_validation() {
        use crate::settlement::parse_amount;

        for body in [
            r#"{"account":"a","amount":10.5}"#,
            r#"{"account":"a","amount":-1.0}"#,
            r#"{"account":"a","amount":1e30}"#,
            r#"{"account":"a","amount":99999999999999999999}"#,
        ] {
            let req: AmountRequest = serde_json::from_str(body).unwrap();
            let err = parse_amount(&req.amount.as_raw()).unwrap_err();
            assert!(err.to_string().starts_with("Invalid Amount"), "{}", body);
        }

        let req: AmountRequest =
            serde_json::from_str(r#"{"account":"a","amount":9223372036854775808}"#).unwrap();
        assert_eq!(parse_amount(&req.amount.as_raw()).unwrap(), 9_223_372_036_854_775_808);
    }

    #[test]
    fn test_outcome_unknown_maps_to_gateway_timeout() {
        let err = ApiError::from(SettlementError::Ledger(LedgerError::CommitStatus {
            transaction_id: "t1".into(),
            message: "peer gone".into(),
        }));
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.code, error_codes::LEDGER_OUTCOME_UNKNOWN);
        assert!(err.msg.starts_with("LEDGER_OUTCOME_UNKNOWN"));
    }

    #[test]
    fn test_unreachable_ledger_maps_to_503() {
        let err = ApiError::from(SettlementError::Ledger(LedgerError::Connectivity(
            "refused".into(),
        )));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code, error_codes::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ApiResponse::<()>::error(4005, "gone")).unwrap();
        assert_eq!(body["code"], 4005);
        assert_eq!(body["msg"], "gone");
        assert!(body.get("data").is_none());
    }
}
