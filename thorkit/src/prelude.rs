//! Common imports for applications embedding thorkit.

pub use alloy::primitives::{Address, U256};

pub use crate::address::{is_valid_address, parse_address};
pub use crate::amount::{format_amount, parse_amount};
pub use crate::balance::{BalanceQuery, ChainReader};
pub use crate::clause::{AssetKind, B3TR_MAINNET, Clause, TransferIntent, build_clauses};
pub use crate::config::{ConfigIssue, IssueLevel, KitConfig, Network};
pub use crate::error::{
    AmountError, BalanceError, ConfigError, Error, Result, RpcError, SubmitError, TrackerError,
};
pub use crate::form::TransferForm;
pub use crate::overview::{AccountOverview, BalanceView};
pub use crate::receipt::{TxId, TxReceipt};
pub use crate::rpc::{RpcChainReader, RpcSubmitter};
pub use crate::session::{
    ConnectionSource, ConnectionState, SmartAccountPolicy, StaticSession, WalletSession,
    select_signer,
};
pub use crate::submit::{TransactionSubmitter, TxOutcome, UiHints};
pub use crate::tracker::{TransactionStatus, TransactionTracker};
