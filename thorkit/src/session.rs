//! Wallet session collaborator and signer selection.
//!
//! The connected wallet is never read from ambient state. Components that
//! need the active account receive a [`WalletSession`] explicitly.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Connection lifecycle of the wallet session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No wallet is connected.
    #[default]
    Disconnected,
    /// A connection (or social login) is being established.
    Connecting,
    /// A wallet is connected.
    Connected,
}

/// How the session was established.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionSource {
    /// A browser extension or mobile wallet.
    #[default]
    Wallet,
    /// Social or federated login with an embedded wallet.
    SocialLogin,
    /// Login through another application's embedded wallet.
    CrossApp,
}

impl ConnectionSource {
    /// Whether the session was established through a login provider rather
    /// than a self-custodied wallet.
    #[must_use]
    pub const fn is_social(self) -> bool {
        matches!(self, Self::SocialLogin | Self::CrossApp)
    }
}

impl std::fmt::Display for ConnectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Wallet => "wallet",
            Self::SocialLogin => "social-login",
            Self::CrossApp => "cross-app",
        };
        f.write_str(name)
    }
}

/// A contract-controlled account directed by the session's signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAccount {
    /// Account address.
    pub address: Address,
    /// Whether the account contract is deployed yet.
    pub is_deployed: bool,
}

/// Read access to the wallet session.
pub trait WalletSession: Send + Sync {
    /// Current connection state.
    fn connection_state(&self) -> ConnectionState;

    /// How the session was established.
    fn connection_source(&self) -> ConnectionSource;

    /// Address of the directly connected wallet, if any.
    fn wallet_address(&self) -> Option<Address>;

    /// Smart account bound to the session, if any.
    fn smart_account(&self) -> Option<SmartAccount>;

    /// Whether a wallet is connected.
    fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }
}

/// When a smart account originates transactions instead of the connected
/// wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmartAccountPolicy {
    /// Use the smart account whenever one exists.
    Always,
    /// Use the smart account only for social-login sessions.
    #[default]
    SocialLoginOnly,
    /// Always sign with the connected wallet.
    Never,
}

/// Pick the account that should originate transactions.
///
/// Falls back to the connected wallet when the policy does not select the
/// smart account or none is present. Returns `None` when disconnected.
#[must_use]
pub fn select_signer(session: &dyn WalletSession, policy: SmartAccountPolicy) -> Option<Address> {
    if !session.is_connected() {
        return None;
    }
    let prefer_smart = match policy {
        SmartAccountPolicy::Always => true,
        SmartAccountPolicy::SocialLoginOnly => session.connection_source().is_social(),
        SmartAccountPolicy::Never => false,
    };
    let smart = session.smart_account().filter(|_| prefer_smart);
    smart.map(|account| account.address).or_else(|| session.wallet_address())
}

/// An in-memory session snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSession {
    /// Connection state.
    pub state: ConnectionState,
    /// Connection source.
    pub source: ConnectionSource,
    /// Connected wallet address.
    pub wallet: Option<Address>,
    /// Smart account, if any.
    pub smart_account: Option<SmartAccount>,
}

impl StaticSession {
    /// A disconnected session.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A session connected through a wallet at `address`.
    #[must_use]
    pub fn connected(address: Address) -> Self {
        Self {
            state: ConnectionState::Connected,
            source: ConnectionSource::Wallet,
            wallet: Some(address),
            smart_account: None,
        }
    }

    /// Set the connection source.
    #[must_use]
    pub const fn with_source(mut self, source: ConnectionSource) -> Self {
        self.source = source;
        self
    }

    /// Attach a smart account.
    #[must_use]
    pub const fn with_smart_account(mut self, address: Address, is_deployed: bool) -> Self {
        self.smart_account = Some(SmartAccount {
            address,
            is_deployed,
        });
        self
    }
}

impl WalletSession for StaticSession {
    fn connection_state(&self) -> ConnectionState {
        self.state
    }

    fn connection_source(&self) -> ConnectionSource {
        self.source
    }

    fn wallet_address(&self) -> Option<Address> {
        self.wallet
    }

    fn smart_account(&self) -> Option<SmartAccount> {
        self.smart_account
    }
}
