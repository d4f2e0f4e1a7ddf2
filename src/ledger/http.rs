//! Ledger REST gateway transport
//!
//! Talks JSON over HTTP to a ledger gateway that holds this node's signing
//! identity:
//!
//! ```text
//! POST {url}/channels/{channel}/chaincodes/{chaincode}/evaluate   {function, args}
//! POST {url}/channels/{channel}/chaincodes/{chaincode}/submit     {function, args}
//! GET  {url}/channels/{channel}/transactions/{tx_id}/status
//! ```
//!
//! Errors come back as `{stage, message, transaction_id?}` and are mapped onto
//! [`LedgerError`] by stage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::LedgerError;
use super::gateway::{CommitOutcome, LedgerGateway, SubmittedTransaction};

/// Connection settings for [`HttpLedgerGateway`]
#[derive(Debug, Clone)]
pub struct HttpLedgerConfig {
    pub url: String,
    pub channel: String,
    pub chaincode: String,
}

pub struct HttpLedgerGateway {
    config: HttpLedgerConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct InvokeRequest<'a> {
    function: &'a str,
    args: &'a [String],
}

#[derive(Deserialize)]
struct EvaluateResponse {
    result: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    transaction_id: String,
    successful: bool,
    code: i32,
}

/// Error body returned by the gateway
#[derive(Deserialize, Debug)]
struct GatewayErrorBody {
    #[serde(default)]
    stage: String,
    message: String,
    #[serde(default)]
    transaction_id: Option<String>,
}

impl HttpLedgerGateway {
    pub fn new(config: HttpLedgerConfig) -> Result<Self, LedgerError> {
        info!(
            "Connecting to ledger gateway at {} (channel={}, chaincode={})",
            config.url, config.channel, config.chaincode
        );

        // Stage deadlines are enforced by LedgerClient; only bound the connect here
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| {
                LedgerError::Connectivity(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn chaincode_url(&self, action: &str) -> String {
        format!(
            "{}/channels/{}/chaincodes/{}/{}",
            self.config.url.trim_end_matches('/'),
            self.config.channel,
            self.config.chaincode,
            action
        )
    }

    fn status_url(&self, transaction_id: &str) -> String {
        format!(
            "{}/channels/{}/transactions/{}/status",
            self.config.url.trim_end_matches('/'),
            self.config.channel,
            transaction_id
        )
    }

    async fn invoke(
        &self,
        action: &str,
        function: &str,
        args: &[String],
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(self.chaincode_url(action))
            .json(&InvokeRequest { function, args })
            .send()
            .await
    }
}

/// Evaluations have no side effects, so any transport failure is connectivity
fn evaluate_send_error(e: reqwest::Error) -> LedgerError {
    LedgerError::Connectivity(format!("HTTP request failed: {}", e))
}

/// Only a failed connect proves the gateway never saw the proposal
fn submit_send_error(e: reqwest::Error) -> LedgerError {
    if e.is_connect() {
        LedgerError::Connectivity(format!("HTTP request failed: {}", e))
    } else {
        LedgerError::Submit {
            transaction_id: None,
            message: format!("no reply from gateway after sending proposal: {}", e),
        }
    }
}

/// Map a non-2xx gateway response onto the ledger error taxonomy
async fn classify_failure(response: reqwest::Response, submitting: bool) -> LedgerError {
    let status = response.status();
    let body: Option<GatewayErrorBody> = response.json().await.ok();
    debug!(%status, ?body, "Ledger gateway returned error");
    classify(status, body, submitting)
}

fn classify(
    status: reqwest::StatusCode,
    body: Option<GatewayErrorBody>,
    submitting: bool,
) -> LedgerError {
    let (stage, message, transaction_id) = match body {
        Some(b) => (b.stage, b.message, b.transaction_id),
        None => (String::new(), format!("gateway returned HTTP {}", status), None),
    };

    match stage.as_str() {
        "endorse" | "evaluate" => LedgerError::Endorsement {
            transaction_id,
            message,
        },
        "submit" => LedgerError::Submit {
            transaction_id,
            message,
        },
        _ if status.is_server_error() && submitting => LedgerError::Submit {
            transaction_id,
            message,
        },
        _ if status.is_client_error() => LedgerError::Endorsement {
            transaction_id,
            message,
        },
        _ => LedgerError::Connectivity(message),
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        let response = self
            .invoke("evaluate", function, args)
            .await
            .map_err(evaluate_send_error)?;
        if !response.status().is_success() {
            return Err(classify_failure(response, false).await);
        }

        let body: EvaluateResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(format!("evaluate {}: {}", function, e)))?;
        Ok(body.result.into_bytes())
    }

    async fn submit(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<SubmittedTransaction, LedgerError> {
        let response = self
            .invoke("submit", function, args)
            .await
            .map_err(submit_send_error)?;
        if !response.status().is_success() {
            return Err(classify_failure(response, true).await);
        }

        // Endorsed and accepted for ordering; the body is our only handle on it
        response.json().await.map_err(|e| LedgerError::Submit {
            transaction_id: None,
            message: format!("unreadable submit response for {}: {}", function, e),
        })
    }

    async fn commit_status(&self, transaction_id: &str) -> Result<CommitOutcome, LedgerError> {
        let commit_status_error = |message: String| LedgerError::CommitStatus {
            transaction_id: transaction_id.to_string(),
            message,
        };

        let response = self
            .client
            .get(self.status_url(transaction_id))
            .send()
            .await
            .map_err(|e| commit_status_error(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(commit_status_error(format!(
                "gateway returned HTTP {}",
                response.status()
            )));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| commit_status_error(format!("Failed to parse response: {}", e)))?;

        Ok(CommitOutcome {
            transaction_id: body.transaction_id,
            successful: body.successful,
            code: body.code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let gw = gateway_at("http://localhost:7080/".to_string());
        assert_eq!(
            gw.chaincode_url("submit"),
            "http://localhost:7080/channels/retail/chaincodes/cbdc/submit"
        );
        assert_eq!(
            gw.status_url("abc123"),
            "http://localhost:7080/channels/retail/transactions/abc123/status"
        );
    }

    #[test]
    fn test_submitted_transaction_decodes() {
        let tx: SubmittedTransaction =
            serde_json::from_str(r#"{"transaction_id":"f00d"}"#).unwrap();
        assert_eq!(tx.transaction_id, "f00d");
    }

    fn gateway_at(url: String) -> HttpLedgerGateway {
        HttpLedgerGateway::new(HttpLedgerConfig {
            url,
            channel: "retail".to_string(),
            chaincode: "cbdc".to_string(),
        })
        .unwrap()
    }

    /// Accept one connection, read the whole request, then hang up without replying
    async fn swallowing_gateway() -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let text = String::from_utf8_lossy(&request);
            text.lines().next().unwrap_or_default().to_string()
        });
        (url, handle)
    }

    fn body(stage: &str) -> Option<GatewayErrorBody> {
        Some(GatewayErrorBody {
            stage: stage.to_string(),
            message: "refused".to_string(),
            transaction_id: Some("t1".to_string()),
        })
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_connectivity_error() {
        let gw = gateway_at("http://127.0.0.1:1".to_string());

        let err = gw.evaluate("Symbol", &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::Connectivity(_)));

        let err = gw.submit("Mint", &["100".to_string()]).await.unwrap_err();
        assert!(matches!(err, LedgerError::Connectivity(_)));
        assert!(!err.is_outcome_unknown());
    }

    #[tokio::test]
    async fn test_lost_submit_reply_is_outcome_unknown() {
        let (url, server) = swallowing_gateway().await;
        let gw = gateway_at(url);

        let err = gw.submit("Mint", &["100".to_string()]).await.unwrap_err();

        assert_eq!(
            server.await.unwrap(),
            "POST /channels/retail/chaincodes/cbdc/submit HTTP/1.1"
        );
        assert!(
            matches!(err, LedgerError::Submit { transaction_id: None, .. }),
            "{:?}",
            err
        );
        assert!(err.is_outcome_unknown());
    }

    #[test]
    fn test_classify_by_stage() {
        use reqwest::StatusCode;

        let err = classify(StatusCode::BAD_REQUEST, body("endorse"), true);
        assert!(matches!(err, LedgerError::Endorsement { .. }));
        assert_eq!(err.transaction_id(), Some("t1"));

        let err = classify(StatusCode::INTERNAL_SERVER_ERROR, body("submit"), true);
        assert!(matches!(err, LedgerError::Submit { .. }));
        assert!(err.is_outcome_unknown());
    }

    #[test]
    fn test_classify_without_stage() {
        use reqwest::StatusCode;

        // 5xx on submit may have reached the orderer
        let err = classify(StatusCode::BAD_GATEWAY, None, true);
        assert!(matches!(err, LedgerError::Submit { transaction_id: None, .. }));

        // 5xx on evaluate has no side effects
        let err = classify(StatusCode::BAD_GATEWAY, None, false);
        assert!(matches!(err, LedgerError::Connectivity(_)));

        let err = classify(StatusCode::NOT_FOUND, None, true);
        assert!(matches!(err, LedgerError::Endorsement { .. }));
        assert!(err.to_string().contains("404"));
    }
}
