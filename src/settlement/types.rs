//! Settlement Core Types
//!
//! Value objects returned to callers. None of them are retained by the
//! orchestrators after return.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account identifier (`rbi.cbdc`, `axis.cbdc`, `alice.cbdc`, ...)
///
/// Opaque: role membership comes from the whitelist, never from the format.
pub type Account = String;

/// Smallest currency unit
pub type Amount = u64;

/// Transaction id reported when an attempt never reached the ledger
pub const SENTINEL_TX_ID: &str = "xxxxx";

/// Result messages shared by the orchestrators
pub mod messages {
    pub const TRANSACTION_COMMITTED: &str = "Transaction Committed Successfully";
    pub const NOT_AUTHORIZED_TO_MINT: &str = "Not Authorized to Mint!";
    pub const MINT_SUCCESS: &str = "Success!";
    pub const RELAY_FAILED: &str = "Failed to transfer";
}

/// Message for a commit observed with `successful == false`
pub fn commit_rejected_message(transaction_id: &str, code: i32) -> String {
    format!(
        "transaction {} failed to commit with status: {}",
        transaction_id, code
    )
}

/// Outcome of one point-to-point transfer attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    #[schema(example = "4f1c0e...")]
    pub tx_id: String,
    #[schema(example = "axis.cbdc")]
    pub from: Account,
    #[schema(example = "alice.cbdc")]
    pub to: Account,
    #[schema(example = 50)]
    pub amount: Amount,
    pub success: bool,
    #[schema(example = "Transaction Committed Successfully")]
    pub message: String,
}

impl TransferResult {
    /// Result for an attempt rejected before the ledger was contacted
    pub fn rejected(from: &str, to: &str, amount: Amount, message: impl Into<String>) -> Self {
        Self {
            tx_id: SENTINEL_TX_ID.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
            success: false,
            message: message.into(),
        }
    }

    /// True when the ledger never saw this attempt
    pub fn never_submitted(&self) -> bool {
        self.tx_id == SENTINEL_TX_ID
    }
}

/// Outcome of an issuance-then-relay request.
///
/// `success` holds only when both the mint and the relay committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintResult {
    pub tx_id: String,
    #[schema(example = "hdfc.cbdc")]
    pub account: Account,
    #[schema(example = 100)]
    pub amount: Amount,
    pub success: bool,
    #[schema(example = "Success!")]
    pub message: String,
}

impl MintResult {
    pub fn rejected(account: &str, amount: Amount, message: impl Into<String>) -> Self {
        Self {
            tx_id: SENTINEL_TX_ID.to_string(),
            account: account.to_string(),
            amount,
            success: false,
            message: message.into(),
        }
    }
}

/// Outcome of funding an end user through the issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundResult {
    pub tx_id: String,
    pub account: Account,
    pub amount: Amount,
    pub success: bool,
    pub message: String,
}

impl FundResult {
    pub fn rejected(account: &str, amount: Amount, message: impl Into<String>) -> Self {
        Self {
            tx_id: SENTINEL_TX_ID.to_string(),
            account: account.to_string(),
            amount,
            success: false,
            message: message.into(),
        }
    }
}

impl From<MintResult> for FundResult {
    fn from(mint: MintResult) -> Self {
        Self {
            tx_id: mint.tx_id,
            account: mint.account,
            amount: mint.amount,
            success: mint.success,
            message: mint.message,
        }
    }
}

impl From<TransferResult> for FundResult {
    fn from(transfer: TransferResult) -> Self {
        Self {
            tx_id: transfer.tx_id,
            account: transfer.to,
            amount: transfer.amount,
            success: transfer.success,
            message: transfer.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResult {
    #[schema(example = "bob.cbdc")]
    pub account: Account,
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_transfer_uses_sentinel() {
        let result = TransferResult::rejected("rbi.cbdc", "axis.cbdc", 0, "Invalid Amount -5");
        assert_eq!(result.tx_id, SENTINEL_TX_ID);
        assert!(!result.success);
        assert!(result.never_submitted());
    }

    #[test]
    fn test_fund_result_from_transfer_reports_recipient() {
        let transfer = TransferResult {
            tx_id: "t2".to_string(),
            from: "axis.cbdc".to_string(),
            to: "alice.cbdc".to_string(),
            amount: 50,
            success: true,
            message: messages::TRANSACTION_COMMITTED.to_string(),
        };
        let fund = FundResult::from(transfer);
        assert_eq!(fund.account, "alice.cbdc");
        assert_eq!(fund.tx_id, "t2");
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let mint = MintResult::rejected("unknown.cbdc", 100, messages::NOT_AUTHORIZED_TO_MINT);
        let json = serde_json::to_value(&mint).unwrap();
        assert_eq!(json["txId"], "xxxxx");
        assert_eq!(json["message"], "Not Authorized to Mint!");
    }

    #[test]
    fn test_commit_rejected_message() {
        assert_eq!(
            commit_rejected_message("abc", 11),
            "transaction abc failed to commit with status: 11"
        );
    }
}
