//! Application configuration.
//!
//! Resolved once at startup, from `THORKIT_*` environment variables or a
//! JSON file, and never mutated afterwards. Share it behind an `Arc`.

use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::clause::B3TR_MAINNET;
use crate::error::ConfigError;
use crate::session::SmartAccountPolicy;

/// Prefix of every environment variable read by [`KitConfig::from_env`].
pub const ENV_PREFIX: &str = "THORKIT_";

/// Network the application talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Main network.
    #[default]
    Main,
    /// Public test network.
    Test,
    /// Local single-node network.
    Solo,
}

impl std::str::FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Self::Main),
            "test" | "testnet" => Ok(Self::Test),
            "solo" => Ok(Self::Solo),
            other => Err(ConfigError::invalid(format!("unknown network '{other}'"))),
        }
    }
}

/// Configuration shared by the library and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    /// Network selector.
    pub network: Network,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Fee-delegation service, passed through to the wallet SDK.
    pub delegator_url: Option<String>,
    /// Login provider application id.
    pub app_id: Option<String>,
    /// Login provider client id.
    pub client_id: Option<String>,
    /// WalletConnect project id.
    pub wallet_connect_project_id: Option<String>,
    /// Token shown and transferred by default.
    pub token_address: Address,
    /// Display symbol of the token.
    pub token_symbol: String,
    /// Which account originates transactions.
    pub smart_account_policy: SmartAccountPolicy,
    /// Confirmations required before a transaction counts as included.
    pub confirmations: u64,
    /// How long the submitter waits for a receipt.
    pub receipt_timeout_secs: u64,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            network: Network::Main,
            rpc_url: String::new(),
            delegator_url: None,
            app_id: None,
            client_id: None,
            wallet_connect_project_id: None,
            token_address: B3TR_MAINNET,
            token_symbol: "B3TR".into(),
            smart_account_policy: SmartAccountPolicy::default(),
            confirmations: 1,
            receipt_timeout_secs: 60,
        }
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Usable, but probably not what was intended.
    Warning,
    /// Not usable.
    Error,
}

/// A problem found by [`KitConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Severity.
    pub level: IssueLevel,
    /// Offending field.
    pub field: &'static str,
    /// Description.
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl KitConfig {
    /// Read configuration from `THORKIT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unparsable values or failed validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Read configuration through `lookup`, which maps an unprefixed key
    /// such as `RPC_URL` to its value.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(network) = lookup("NETWORK") {
            config.network = network.parse()?;
        }
        if let Some(rpc_url) = lookup("RPC_URL") {
            config.rpc_url = rpc_url;
        }
        config.delegator_url = lookup("DELEGATOR_URL");
        config.app_id = lookup("APP_ID");
        config.client_id = lookup("CLIENT_ID");
        config.wallet_connect_project_id = lookup("WALLET_CONNECT_PROJECT_ID");
        if let Some(token) = lookup("TOKEN_ADDRESS") {
            config.token_address = crate::address::parse_address(&token)
                .ok_or_else(|| ConfigError::invalid(format!("token_address '{token}'")))?;
        }
        if let Some(symbol) = lookup("TOKEN_SYMBOL") {
            config.token_symbol = symbol;
        }
        if let Some(policy) = lookup("SMART_ACCOUNT_POLICY") {
            config.smart_account_policy = serde_json::from_value(serde_json::Value::String(policy))?;
        }
        if let Some(n) = lookup("CONFIRMATIONS") {
            config.confirmations = parse_number("confirmations", &n)?;
        }
        if let Some(n) = lookup("RECEIPT_TIMEOUT_SECS") {
            config.receipt_timeout_secs = parse_number("receipt_timeout_secs", &n)?;
        }

        config.check()?;
        Ok(config)
    }

    /// Read configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for IO, parse or validation failures.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Receipt timeout as a [`Duration`].
    #[must_use]
    pub const fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    /// List every problem with this configuration.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.rpc_url.is_empty() {
            issues.push(ConfigIssue::error("rpc_url", "not set"));
        } else {
            check_http_url("rpc_url", &self.rpc_url, &mut issues);
        }
        if let Some(url) = &self.delegator_url {
            check_http_url("delegator_url", url, &mut issues);
        }
        if self.confirmations == 0 {
            issues.push(ConfigIssue::error("confirmations", "must be at least 1"));
        }
        if self.receipt_timeout_secs == 0 {
            issues.push(ConfigIssue::error("receipt_timeout_secs", "must be at least 1"));
        }
        if self.network != Network::Main && self.token_address == B3TR_MAINNET {
            issues.push(ConfigIssue::warning(
                "token_address",
                "mainnet token address used on a non-main network",
            ));
        }
        if self.token_symbol.trim().is_empty() {
            issues.push(ConfigIssue::warning("token_symbol", "empty symbol"));
        }
        issues
    }

    /// Fail on the first error-level issue.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] for an unset RPC endpoint, otherwise
    /// [`ConfigError::Invalid`].
    pub fn check(&self) -> Result<(), ConfigError> {
        let Some(issue) = self
            .validate()
            .into_iter()
            .find(|issue| issue.level == IssueLevel::Error)
        else {
            return Ok(());
        };
        if issue.field == "rpc_url" && self.rpc_url.is_empty() {
            return Err(ConfigError::missing("rpc_url"));
        }
        Err(ConfigError::invalid(issue.to_string()))
    }
}

fn check_http_url(field: &'static str, value: &str, issues: &mut Vec<ConfigIssue>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => issues.push(ConfigIssue::error(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => issues.push(ConfigIssue::error(field, e.to_string())),
    }
}

fn parse_number(field: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(format!("{field} '{value}': {e}")))
}
