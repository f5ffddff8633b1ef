//! Account overview shown once a wallet is connected.

use std::fmt;

use alloy::primitives::{Address, U256};
use tracing::warn;

use crate::amount::format_amount;
use crate::balance::BalanceQuery;
use crate::clause::AssetKind;
use crate::session::{
    ConnectionSource, ConnectionState, SmartAccount, SmartAccountPolicy, WalletSession, select_signer,
};

/// A balance as the UI should present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceView {
    /// Balance read successfully (zero included).
    Known(U256),
    /// The chain could not be queried.
    Unknown(String),
    /// No account to query.
    NotQueried,
}

impl fmt::Display for BalanceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(value) => f.write_str(&format_amount(*value)),
            Self::Unknown(_) => f.write_str("unknown"),
            Self::NotQueried => f.write_str("-"),
        }
    }
}

/// Snapshot of the session plus the token balance of the active account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOverview {
    /// Connection state.
    pub state: ConnectionState,
    /// Connection source.
    pub source: ConnectionSource,
    /// Connected wallet address.
    pub wallet: Option<Address>,
    /// Smart account, if any.
    pub smart_account: Option<SmartAccount>,
    /// Token symbol used when rendering.
    pub symbol: String,
    /// Account whose balance was read: the one transactions are signed
    /// from.
    pub active_account: Option<Address>,
    /// Token balance of the active account.
    pub token_balance: BalanceView,
}

impl AccountOverview {
    /// Gather the overview for `session`, reading the `token` balance of the
    /// account `policy` selects for signing.
    pub async fn load(
        session: &dyn WalletSession,
        balances: &BalanceQuery,
        policy: SmartAccountPolicy,
        token: Address,
        symbol: impl Into<String>,
    ) -> Self {
        let active_account = select_signer(session, policy);

        let token_balance = match active_account {
            Some(address) => match balances.balance(address, AssetKind::Token(token)).await {
                Ok(value) => BalanceView::Known(value),
                Err(e) => {
                    warn!(address = %address, error = %e, "token balance unavailable");
                    BalanceView::Unknown(e.to_string())
                }
            },
            None => BalanceView::NotQueried,
        };

        Self {
            state: session.connection_state(),
            source: session.connection_source(),
            wallet: session.wallet_address(),
            smart_account: session.smart_account(),
            symbol: symbol.into(),
            active_account,
            token_balance,
        }
    }

    fn shows_balance_for(&self, address: Option<Address>) -> bool {
        address.is_some() && address == self.active_account
    }
}

impl fmt::Display for AccountOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            ConnectionState::Connecting => return writeln!(f, "Connecting..."),
            ConnectionState::Disconnected => return writeln!(f, "Not connected"),
            ConnectionState::Connected => {}
        }

        if let Some(smart) = &self.smart_account {
            writeln!(f, "Smart Account")?;
            writeln!(f, "  Address:  {}", smart.address)?;
            writeln!(f, "  Deployed: {}", smart.is_deployed)?;
            if self.shows_balance_for(Some(smart.address)) {
                writeln!(f, "  {} Balance: {}", self.symbol, self.token_balance)?;
            }
        }

        writeln!(f, "Wallet")?;
        match &self.wallet {
            Some(address) => writeln!(f, "  Address: {address}")?,
            None => writeln!(f, "  Address: -")?,
        }
        writeln!(f, "  Connection Type: {}", self.source)?;
        if self.shows_balance_for(self.wallet) {
            writeln!(f, "  {} Balance: {}", self.symbol, self.token_balance)?;
        }
        Ok(())
    }
}
