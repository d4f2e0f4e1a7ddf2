use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::ledger::LedgerTimeouts;
use crate::settlement::whitelist::{AXIS_BANK_ACCOUNT, HDFC_BANK_ACCOUNT};

/// Environment variables overriding the ledger channel and chaincode
pub const CHANNEL_NAME_ENV: &str = "CHANNEL_NAME";
pub const CHAINCODE_NAME_ENV: &str = "CHAINCODE_NAME";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub node: NodeConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Issuer endpoint (participants only)
    #[serde(default)]
    pub issuer: Option<IssuerConfig>,
    /// Banks allowed to receive minted funds (issuer only)
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<String>,
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
    /// Ledger initialisation (issuer only)
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Issuer,
    Participant,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Issuer => "issuer",
            NodeRole::Participant => "participant",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NodeConfig {
    pub role: NodeRole,
    /// Ledger account owned by this node's identity
    pub bank_account: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LedgerMode {
    #[default]
    Gateway,
    /// In-process simulated ledger (`mock-ledger` feature)
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    #[serde(default)]
    pub mode: LedgerMode,
    pub gateway_url: String,
    pub channel: String,
    pub chaincode: String,
    #[serde(default)]
    pub timeouts: LedgerTimeoutConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mode: LedgerMode::Gateway,
            gateway_url: "http://localhost:8080".to_string(),
            channel: "retail".to_string(),
            chaincode: "cbdc".to_string(),
            timeouts: LedgerTimeoutConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerTimeoutConfig {
    pub evaluate_ms: u64,
    pub endorse_ms: u64,
    pub submit_ms: u64,
    pub commit_status_ms: u64,
}

impl Default for LedgerTimeoutConfig {
    fn default() -> Self {
        Self {
            evaluate_ms: 5_000,
            endorse_ms: 15_000,
            submit_ms: 5_000,
            commit_status_ms: 60_000,
        }
    }
}

impl LedgerTimeoutConfig {
    pub fn to_timeouts(&self) -> LedgerTimeouts {
        LedgerTimeouts {
            evaluate: Duration::from_millis(self.evaluate_ms),
            endorse: Duration::from_millis(self.endorse_ms),
            submit: Duration::from_millis(self.submit_ms),
            commit_status: Duration::from_millis(self.commit_status_ms),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IssuerConfig {
    pub url: String,
    /// Must cover the issuer's mint and relay commit waits
    #[serde(default = "default_issuer_timeout_ms")]
    pub timeout_ms: u64,
}

impl IssuerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProvisioningConfig {
    pub seed_amount: u64,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self { seed_amount: 100 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BootstrapConfig {
    pub enabled: bool,
    pub token_name: String,
    pub token_symbol: String,
    pub decimals: u32,
    pub initial_supply: u64,
    /// Credited to every whitelisted bank out of the initial supply
    pub bank_allocation: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token_name: "Indian eRupee".to_string(),
            token_symbol: "eINR".to_string(),
            decimals: 2,
            initial_supply: 20_000,
            bank_allocation: 10_000,
        }
    }
}

fn default_whitelist() -> Vec<String> {
    vec![HDFC_BANK_ACCOUNT.to_string(), AXIS_BANK_ACCOUNT.to_string()]
}

fn default_issuer_timeout_ms() -> u64 {
    180_000
}

impl AppConfig {
    /// Load `config/{env}.yaml`, apply environment overrides and validate
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let mut config = Self::from_file(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config yaml: {}", path))
    }

    /// Channel/chaincode overrides; blank values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(channel) = non_blank(CHANNEL_NAME_ENV) {
            self.ledger.channel = channel;
        }
        if let Some(chaincode) = non_blank(CHAINCODE_NAME_ENV) {
            self.ledger.chaincode = chaincode;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.node.bank_account.trim().is_empty() {
            bail!("node.bank_account must be set");
        }
        if self.provisioning.seed_amount == 0 {
            bail!("provisioning.seed_amount must be positive");
        }
        match self.node.role {
            NodeRole::Participant => {
                if self.issuer.is_none() {
                    bail!("participant nodes need an `issuer` section");
                }
            }
            NodeRole::Issuer => {
                if self.whitelist.iter().any(|bank| bank == &self.node.bank_account) {
                    bail!("the issuer account cannot be whitelisted as a bank");
                }
                if self.bootstrap.enabled {
                    let banks = self.whitelist.len() as u64;
                    let allocated = self
                        .bootstrap
                        .bank_allocation
                        .checked_mul(banks)
                        .context("bootstrap.bank_allocation overflows")?;
                    if allocated > self.bootstrap.initial_supply {
                        bail!(
                            "bootstrap allocates {} to banks but only mints {}",
                            allocated,
                            self.bootstrap.initial_supply
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTICIPANT_YAML: &str = r#"
log_level: info
log_dir: ./logs
log_file: axis.log
use_json: false
rotation: daily
node:
  role: participant
  bank_account: axis.cbdc
  host: 0.0.0.0
  port: 10999
ledger:
  mode: memory
  gateway_url: http://localhost:10998
  channel: retail
  chaincode: cbdc
issuer:
  url: http://localhost:7999
"#;

    #[test]
    fn test_participant_config_deserialize() {
        let config: AppConfig = serde_yaml::from_str(PARTICIPANT_YAML).unwrap();

        assert_eq!(config.node.role, NodeRole::Participant);
        assert_eq!(config.node.bank_account, "axis.cbdc");
        assert_eq!(config.ledger.mode, LedgerMode::Memory);
        assert_eq!(config.issuer.as_ref().unwrap().timeout_ms, 180_000);
        assert_eq!(config.provisioning.seed_amount, 100);
        assert_eq!(config.whitelist, vec!["hdfc.cbdc", "axis.cbdc"]);
        assert!(!config.bootstrap.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = LedgerTimeoutConfig::default().to_timeouts();
        assert_eq!(timeouts, LedgerTimeouts::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config: AppConfig = serde_yaml::from_str(PARTICIPANT_YAML).unwrap();
        config.apply_overrides(|key| match key {
            CHANNEL_NAME_ENV => Some("wholesale".to_string()),
            CHAINCODE_NAME_ENV => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.ledger.channel, "wholesale");
        assert_eq!(config.ledger.chaincode, "cbdc");
    }

    #[test]
    fn test_participant_without_issuer_is_invalid() {
        let mut config: AppConfig = serde_yaml::from_str(PARTICIPANT_YAML).unwrap();
        config.issuer = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bootstrap_over_allocation_is_invalid() {
        let mut config: AppConfig = serde_yaml::from_str(PARTICIPANT_YAML).unwrap();
        config.node.role = NodeRole::Issuer;
        config.bootstrap.enabled = true;
        config.bootstrap.initial_supply = 15_000;
        assert!(config.validate().is_err());
    }
}
