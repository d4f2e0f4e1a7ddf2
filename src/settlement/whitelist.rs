//! Bank Whitelist
//!
//! Static set of commercial-bank accounts allowed to receive minted funds
//! directly from the issuer. Fixed at startup, read-only afterwards.

use std::collections::BTreeMap;

use super::types::Account;

pub const RBI_ISSUER_ACCOUNT: &str = "rbi.cbdc";
pub const HDFC_BANK_ACCOUNT: &str = "hdfc.cbdc";
pub const AXIS_BANK_ACCOUNT: &str = "axis.cbdc";

/// Relay path from the issuer to one whitelisted bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRoute {
    pub bank: Account,
    /// Issuer-side account the relay debits
    pub source: Account,
}

#[derive(Debug, Clone)]
pub struct BankWhitelist {
    routes: BTreeMap<Account, RelayRoute>,
}

impl BankWhitelist {
    /// Build the whitelist; every bank is relayed from `issuer_account`
    pub fn new<I, S>(issuer_account: &str, banks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Account>,
    {
        let routes = banks
            .into_iter()
            .map(Into::into)
            .filter(|bank: &Account| !bank.trim().is_empty())
            .map(|bank| {
                let route = RelayRoute {
                    bank: bank.clone(),
                    source: issuer_account.to_string(),
                };
                (bank, route)
            })
            .collect();
        Self { routes }
    }

    /// The two commercial banks of the network
    pub fn default_banks() -> Vec<Account> {
        vec![HDFC_BANK_ACCOUNT.to_string(), AXIS_BANK_ACCOUNT.to_string()]
    }

    pub fn contains(&self, account: &str) -> bool {
        self.routes.contains_key(account)
    }

    /// Relay path for `account`, `None` if it is not whitelisted
    pub fn route(&self, account: &str) -> Option<&RelayRoute> {
        self.routes.get(account)
    }

    pub fn banks(&self) -> impl Iterator<Item = &Account> {
        self.routes.keys()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
