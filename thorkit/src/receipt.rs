//! Transaction identifiers and receipts.
//!
//! Wallet SDKs report receipts in different shapes: Thor-style
//! (`meta.txID`, `reverted`) and Ethereum JSON-RPC style
//! (`transactionHash`, `status`). Both deserialize into one [`TxReceipt`].

use alloy::primitives::U64;
use serde::{Deserialize, Serialize};

/// Transaction identifier assigned by the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl TxId {
    /// Create a transaction id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receipt of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ReceiptWire")]
pub struct TxReceipt {
    /// Transaction id.
    pub tx_id: TxId,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Whether execution reverted.
    pub reverted: bool,
    /// Gas consumed.
    pub gas_used: Option<u64>,
}

impl TxReceipt {
    /// A successful receipt for `tx_id`.
    #[must_use]
    pub const fn included(tx_id: TxId, block_number: Option<u64>) -> Self {
        Self {
            tx_id,
            block_number,
            reverted: false,
            gas_used: None,
        }
    }

    /// Parse a receipt from any supported JSON shape.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when no shape matches.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReceiptWire {
    Normalized(NormalizedReceipt),
    Thor(ThorReceipt),
    Eth(EthReceipt),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NormalizedReceipt {
    tx_id: TxId,
    block_number: Option<u64>,
    reverted: bool,
    gas_used: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThorReceipt {
    meta: ThorMeta,
    reverted: bool,
    #[serde(default)]
    gas_used: Option<U64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThorMeta {
    #[serde(rename = "txID")]
    tx_id: String,
    #[serde(default)]
    block_number: Option<U64>,
}

/// Quantities arrive as JSON numbers, decimal strings or `0x` hex strings;
/// [`U64`] accepts all three.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EthReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    gas_used: Option<U64>,
}

fn quantity(q: Option<U64>) -> Option<u64> {
    q.map(|q| q.to::<u64>())
}

impl From<ReceiptWire> for TxReceipt {
    fn from(wire: ReceiptWire) -> Self {
        match wire {
            ReceiptWire::Normalized(r) => Self {
                tx_id: r.tx_id,
                block_number: r.block_number,
                reverted: r.reverted,
                gas_used: r.gas_used,
            },
            ReceiptWire::Thor(r) => Self {
                tx_id: TxId(r.meta.tx_id),
                block_number: quantity(r.meta.block_number),
                reverted: r.reverted,
                gas_used: quantity(r.gas_used),
            },
            ReceiptWire::Eth(r) => Self {
                tx_id: TxId(r.transaction_hash),
                block_number: quantity(r.block_number),
                reverted: r.status == Some(U64::ZERO),
                gas_used: quantity(r.gas_used),
            },
        }
    }
}
