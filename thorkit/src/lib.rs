#![cfg_attr(docsrs, feature(doc_cfg))]
//! Thorkit turns user-entered transfer parameters into transaction clauses
//! and follows the resulting submissions to completion.
//!
//! Wallet sessions, signing, fee delegation and chain access are external
//! collaborators, injected through the [`WalletSession`],
//! [`TransactionSubmitter`] and [`ChainReader`] traits. The [`rpc`] module
//! provides alloy-backed implementations of the latter two.
//!
//! ```text
//! TransferForm ──► parse_amount / is_valid_address ──► build_clauses
//!                                                          │
//!       TransactionTracker ◄── TransactionSubmitter ◄──────┘
//! ```

pub mod address;
pub mod amount;
pub mod balance;
pub mod clause;
pub mod config;
pub mod error;
pub mod form;
pub mod overview;
pub mod prelude;
pub mod receipt;
pub mod rpc;
pub mod session;
pub mod submit;
pub mod tracker;

pub use address::{is_valid_address, parse_address};
pub use amount::{DECIMALS, format_amount, parse_amount};
pub use balance::{BalanceQuery, CallOutcome, ChainReader, ReadCall};
pub use clause::{AssetKind, B3TR_MAINNET, Clause, TransferIntent, build_clauses};
pub use config::KitConfig;
pub use error::{Error, Result};
pub use receipt::{TxId, TxReceipt};
pub use session::{SmartAccountPolicy, WalletSession, select_signer};
pub use submit::{TransactionSubmitter, TxOutcome, UiHints};
pub use tracker::{TransactionStatus, TransactionTracker};
