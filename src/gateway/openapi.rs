//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:7999/docs`
//! - OpenAPI JSON: `http://localhost:7999/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{AccountRequest, AmountRequest, BalanceResponse, TxRequest};
use crate::settlement::{
    CreateAccountResult, FundResult, MintResult, PendingRelay, RelayFailure, TransferResult,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CBDC Relay API",
        version = "1.0.0",
        description = "Issuance, relay and transfer operations of a retail CBDC network node."
    ),
    servers(
        (url = "http://localhost:7999", description = "Issuer"),
        (url = "http://localhost:9998", description = "Participant (hdfc)"),
        (url = "http://localhost:10998", description = "Participant (axis)"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::get_balance,
        crate::gateway::handlers::create_account,
        crate::gateway::handlers::tx,
        crate::gateway::handlers::fund,
        crate::gateway::handlers::mint,
        crate::gateway::handlers::list_pending_relays,
        crate::gateway::handlers::retry_pending_relay,
        crate::gateway::handlers::resolve_pending_relay,
    ),
    components(
        schemas(
            HealthResponse,
            AccountRequest,
            AmountRequest,
            TxRequest,
            BalanceResponse,
            TransferResult,
            MintResult,
            FundResult,
            CreateAccountResult,
            PendingRelay,
            RelayFailure,
        )
    ),
    tags(
        (name = "Ledger", description = "Balance, provisioning and direct transfers (every node)"),
        (name = "Participant", description = "End-user funding via the issuer"),
        (name = "Issuer", description = "Mint-and-relay and pending-relay administration"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "CBDC Relay API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("CBDC Relay API"));
    }

    #[test]
    fn test_rpc_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        for path in [
            "/api/v1/health",
            "/v1/getBalance",
            "/v1/createAccount",
            "/v1/tx",
            "/v1/fund",
            "/v1/mint",
            "/v1/admin/pendingRelays",
        ] {
            assert!(paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
