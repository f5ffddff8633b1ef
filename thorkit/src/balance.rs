//! Balance reads through the chain RPC collaborator.
//!
//! A reverted `balanceOf` call reads as zero; only transport failures make a
//! balance unknown.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::clause::{AssetKind, decode_balance, encode_balance_of};
use crate::error::{BalanceError, RpcError};

/// A read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    /// Contract to call.
    pub to: Address,
    /// ABI-encoded call data (selector and arguments).
    pub data: Bytes,
    /// Account the call is simulated from, if it matters.
    pub caller: Option<Address>,
}

/// Result of a read-only call that reached the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call returned data.
    Returned(Bytes),
    /// Execution reverted.
    Reverted {
        /// Revert reason, when the node supplies one.
        reason: Option<String>,
    },
}

/// Read-only access to chain state.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native coin balance of `address` in base units.
    async fn native_balance(&self, address: Address) -> Result<U256, RpcError>;

    /// Execute a read-only contract call.
    async fn call(&self, call: ReadCall) -> Result<CallOutcome, RpcError>;
}

/// Balance lookups for the native coin and fungible tokens.
#[derive(Clone)]
pub struct BalanceQuery {
    reader: Arc<dyn ChainReader>,
}

impl std::fmt::Debug for BalanceQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceQuery").finish_non_exhaustive()
    }
}

impl BalanceQuery {
    /// Create a balance query over `reader`.
    #[must_use]
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self { reader }
    }

    /// Balance of `address` for `asset`, in base units.
    ///
    /// # Errors
    ///
    /// [`BalanceError::Transport`] when the chain could not be queried and
    /// [`BalanceError::Decode`] when a token returns malformed data. A
    /// reverted token call is not an error and yields zero.
    #[instrument(skip(self), fields(address = %address))]
    pub async fn balance(&self, address: Address, asset: AssetKind) -> Result<U256, BalanceError> {
        match asset {
            AssetKind::Native => Ok(self.reader.native_balance(address).await?),
            AssetKind::Token(contract) => {
                let call = ReadCall {
                    to: contract,
                    data: encode_balance_of(address),
                    caller: Some(address),
                };
                match self.reader.call(call).await? {
                    CallOutcome::Returned(data) => decode_balance(&data)
                        .map_err(|e| BalanceError::Decode(e.to_string())),
                    CallOutcome::Reverted { reason } => {
                        debug!(contract = %contract, reason = ?reason, "balanceOf reverted, reading as zero");
                        Ok(U256::ZERO)
                    }
                }
            }
        }
    }
}
