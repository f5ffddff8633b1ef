//! JSON-RPC collaborators backed by [`alloy`].
//!
//! [`RpcChainReader`] serves balance reads and [`RpcSubmitter`] broadcasts
//! clauses through `eth_sendTransaction`, leaving signing to the node or
//! wallet behind the endpoint. Both share one type-erased HTTP provider.
//!
//! # Examples
//!
//! ```rust,ignore
//! let provider = thorkit::rpc::connect(&config.rpc_url).await?;
//! let reader = RpcChainReader::new(provider.clone());
//! let submitter = RpcSubmitter::new(provider, signer, &config);
//! ```

use std::time::Duration;

use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{
    DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider, ProviderBuilder,
    WatchTxError,
};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportError;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::balance::{CallOutcome, ChainReader, ReadCall};
use crate::clause::Clause;
use crate::config::KitConfig;
use crate::error::{RpcError, SubmitError};
use crate::receipt::{TxId, TxReceipt};
use crate::submit::{TransactionSubmitter, TxOutcome, UiHints};

/// JSON-RPC error code nodes use for reverted calls.
const REVERT_ERROR_CODE: i64 = 3;

/// Connect a type-erased provider to `rpc_url`.
///
/// # Errors
///
/// [`RpcError::Transport`] when the endpoint cannot be reached.
pub async fn connect(rpc_url: &str) -> Result<DynProvider<Ethereum>, RpcError> {
    let provider = ProviderBuilder::new()
        .connect(rpc_url)
        .await
        .map_err(|e| RpcError::transport(format!("failed to connect to '{rpc_url}': {e}")))?
        .erased();
    info!(rpc_url = %rpc_url, "rpc provider connected");
    Ok(provider)
}

/// Read path over an alloy provider.
#[derive(Clone)]
pub struct RpcChainReader {
    provider: DynProvider<Ethereum>,
}

impl std::fmt::Debug for RpcChainReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainReader").finish_non_exhaustive()
    }
}

impl RpcChainReader {
    /// Create a reader over `provider`.
    #[must_use]
    pub const fn new(provider: DynProvider<Ethereum>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn native_balance(&self, address: Address) -> Result<U256, RpcError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| read_error("failed to get balance", &e))
    }

    #[instrument(skip_all, fields(to = %call.to))]
    async fn call(&self, call: ReadCall) -> Result<CallOutcome, RpcError> {
        let mut tx = TransactionRequest::default()
            .with_to(call.to)
            .with_input(call.data);
        if let Some(caller) = call.caller {
            tx = tx.with_from(caller);
        }

        match self.provider.call(tx).await {
            Ok(data) => Ok(CallOutcome::Returned(data)),
            Err(e) => match revert_reason(&e) {
                Some(reason) => {
                    debug!(reason = %reason, "call reverted");
                    Ok(CallOutcome::Reverted {
                        reason: Some(reason),
                    })
                }
                None => Err(read_error("call failed", &e)),
            },
        }
    }
}

/// Submission path over an alloy provider.
///
/// Every transaction is sent from a fixed account; pick it with
/// [`select_signer`](crate::session::select_signer).
#[derive(Clone)]
pub struct RpcSubmitter {
    provider: DynProvider<Ethereum>,
    from: Address,
    confirmations: u64,
    timeout: Duration,
}

impl std::fmt::Debug for RpcSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcSubmitter")
            .field("from", &self.from)
            .field("confirmations", &self.confirmations)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RpcSubmitter {
    /// Create a submitter sending from `from`, with confirmation count and
    /// receipt timeout taken from `config`.
    #[must_use]
    pub const fn new(provider: DynProvider<Ethereum>, from: Address, config: &KitConfig) -> Self {
        Self {
            provider,
            from,
            confirmations: config.confirmations,
            timeout: config.receipt_timeout(),
        }
    }

    /// Account transactions are sent from.
    #[must_use]
    pub const fn sender(&self) -> Address {
        self.from
    }
}

#[async_trait]
impl TransactionSubmitter for RpcSubmitter {
    #[instrument(skip_all, fields(from = %self.from))]
    async fn submit(&self, clauses: &[Clause], hints: &UiHints) -> Result<TxId, SubmitError> {
        let [clause] = clauses else {
            return Err(SubmitError::Unsupported(format!(
                "an EVM transaction carries exactly one call, got {} clauses",
                clauses.len()
            )));
        };

        let mut tx = TransactionRequest::default()
            .with_from(self.from)
            .with_to(clause.to)
            .with_value(clause.value);
        if let Some(data) = &clause.data {
            tx = tx.with_input(data.clone());
        }

        info!(to = %clause.to, description = %hints.description, "sending transaction");
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| send_error(&e))?;

        Ok(TxId::new(format!("{:#x}", pending.tx_hash())))
    }

    async fn wait_for_outcome(&self, tx_id: &TxId) -> TxOutcome {
        let hash: TxHash = match tx_id.as_str().parse() {
            Ok(hash) => hash,
            Err(e) => return TxOutcome::Rejected(format!("invalid transaction id '{tx_id}': {e}")),
        };

        let result = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await;

        match result {
            Ok(receipt) if receipt.status() => TxOutcome::Included(TxReceipt {
                tx_id: tx_id.clone(),
                block_number: receipt.block_number(),
                reverted: false,
                gas_used: Some(receipt.gas_used()),
            }),
            Ok(_) => TxOutcome::Reverted("execution reverted".into()),
            Err(PendingTransactionError::TxWatcher(WatchTxError::Timeout)) => TxOutcome::Timeout(
                format!("no receipt after {}s", self.timeout.as_secs()),
            ),
            Err(e) => TxOutcome::Rejected(e.to_string()),
        }
    }
}

/// Revert reason if `err` is a node's answer to a reverted call.
fn revert_reason(err: &TransportError) -> Option<String> {
    let payload = err.as_error_resp()?;
    is_revert(payload.code, &payload.message).then(|| payload.message.to_string())
}

fn is_revert(code: i64, message: &str) -> bool {
    code == REVERT_ERROR_CODE || message.to_ascii_lowercase().contains("revert")
}

/// A reply the node sent but that could not be read is an invalid response;
/// everything else is a transport failure.
fn read_error(context: &str, err: &TransportError) -> RpcError {
    if err.is_deser_error() || err.is_null_resp() {
        RpcError::InvalidResponse(format!("{context}: {err}"))
    } else {
        RpcError::transport(format!("{context}: {err}"))
    }
}

/// A node that answers with an error refused the transaction; anything
/// else never reached it.
fn send_error(err: &TransportError) -> SubmitError {
    err.as_error_resp().map_or_else(
        || SubmitError::transport(err.to_string()),
        |payload| SubmitError::rejected(payload.message.to_string()),
    )
}
