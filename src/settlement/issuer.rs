//! Issuer RPC
//!
//! How a participant reaches the issuer's Mint-and-Relay Orchestrator. The
//! production transport is JSON over HTTP; [`LocalIssuer`] calls an
//! in-process orchestrator directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::SettlementError;
use super::mint::MintRelayOrchestrator;
use super::types::{Amount, MintResult};

/// Issuer endpoint path for mint requests
pub const MINT_PATH: &str = "/v1/mint";

/// Body of a mint request
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    #[schema(example = "axis.cbdc")]
    pub account: String,
    #[schema(example = 100)]
    pub amount: Amount,
}

#[async_trait]
pub trait IssuerClient: Send + Sync {
    /// Ask the issuer to mint `amount` and relay it to `account`
    async fn mint(&self, account: &str, amount: Amount) -> Result<MintResult, SettlementError>;
}

/// Error body returned by the issuer facade
#[derive(Deserialize)]
struct IssuerErrorBody {
    code: i32,
    msg: String,
}

pub struct HttpIssuerClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpIssuerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SettlementError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SettlementError::Issuer(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn mint_url(&self) -> String {
        format!("{}{}", self.base_url, MINT_PATH)
    }
}

#[async_trait]
impl IssuerClient for HttpIssuerClient {
    async fn mint(&self, account: &str, amount: Amount) -> Result<MintResult, SettlementError> {
        let url = self.mint_url();
        debug!(%url, account, amount, "Requesting mint from issuer");

        let response = self
            .client
            .post(&url)
            .json(&MintRequest {
                account: account.to_string(),
                amount,
            })
            .send()
            .await
            .map_err(|e| SettlementError::Issuer(format!("mint request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<IssuerErrorBody>().await {
                Ok(body) => format!("{} {}", body.code, body.msg),
                Err(_) => "no error body".to_string(),
            };
            warn!(%status, %detail, "Issuer rejected mint request");
            return Err(SettlementError::Issuer(format!(
                "issuer returned {}: {}",
                status, detail
            )));
        }

        response
            .json::<MintResult>()
            .await
            .map_err(|e| SettlementError::Issuer(format!("invalid mint response: {}", e)))
    }
}

/// Issuer running in the same process
pub struct LocalIssuer {
    orchestrator: Arc<MintRelayOrchestrator>,
}

impl LocalIssuer {
    pub fn new(orchestrator: Arc<MintRelayOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl IssuerClient for LocalIssuer {
    async fn mint(&self, account: &str, amount: Amount) -> Result<MintResult, SettlementError> {
        self.orchestrator.mint_request(account, amount).await
    }
}
