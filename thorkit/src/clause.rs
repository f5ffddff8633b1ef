//! Transaction clause construction.
//!
//! A transfer intent becomes an ordered list of [`Clause`]s. An intent that
//! is not ready (bad recipient, zero amount) yields no clauses at all, which
//! the caller treats as "nothing to submit".
//!
//! Token transfers are ABI-encoded calls to the token contract's
//! `transfer(address,uint256)`; the encoding comes from the [`sol!`]
//! generated call types, so it is deterministic byte-for-byte.

use alloy::primitives::{Address, Bytes, U256, address};
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};
use serde::{Deserialize, Serialize};

use crate::address::parse_address;
use crate::amount::format_amount;

/// B3TR token contract on mainnet.
pub const B3TR_MAINNET: Address = address!("0x5ef79995FE8a89e0812330E4378eB2660ceDe699");

sol! {
    /// Fungible token interface (VIP-180, ERC-20 compatible subset).
    interface IVip180 {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// The asset a transfer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "contract", rename_all = "snake_case")]
pub enum AssetKind {
    /// The chain's native coin.
    Native,
    /// A fungible token at the given contract address.
    Token(Address),
}

/// A transfer as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    /// Recipient as typed; validated when clauses are built.
    pub recipient: String,
    /// Amount in base units.
    pub amount: U256,
    /// What is being transferred.
    pub asset: AssetKind,
}

impl TransferIntent {
    /// Create a new transfer intent.
    #[must_use]
    pub fn new(recipient: impl Into<String>, amount: U256, asset: AssetKind) -> Self {
        Self {
            recipient: recipient.into(),
            amount,
            asset,
        }
    }
}

/// One atomic instruction within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    /// Destination: the recipient, or the token contract for token transfers.
    pub to: Address,
    /// Native coin attached to the clause.
    pub value: U256,
    /// Encoded call payload, present only for contract calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Human-readable description shown in signing prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Clause {
    /// Replace the human-readable description.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether this clause carries a contract call.
    #[must_use]
    pub const fn is_contract_call(&self) -> bool {
        self.data.is_some()
    }
}

/// Build the clauses for a transfer intent.
///
/// Returns an empty vector when the recipient is not a valid address or the
/// amount is zero.
#[must_use]
pub fn build_clauses(intent: &TransferIntent) -> Vec<Clause> {
    let Some(recipient) = parse_address(&intent.recipient) else {
        return Vec::new();
    };
    if intent.amount.is_zero() {
        return Vec::new();
    }

    let clause = match intent.asset {
        AssetKind::Native => Clause {
            to: recipient,
            value: intent.amount,
            data: None,
            comment: None,
        },
        AssetKind::Token(contract) => Clause {
            to: contract,
            value: U256::ZERO,
            data: Some(encode_transfer(recipient, intent.amount)),
            comment: Some(format!(
                "Transfer {} tokens to {}",
                format_amount(intent.amount),
                intent.recipient
            )),
        },
    };
    vec![clause]
}

/// ABI-encode `transfer(to, amount)`.
#[must_use]
pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    IVip180::transferCall { to, amount }.abi_encode().into()
}

/// Decode a `transfer(address,uint256)` payload back into its arguments.
///
/// Returns `None` if the selector does not match or the arguments are
/// malformed.
#[must_use]
pub fn decode_transfer(data: &[u8]) -> Option<(Address, U256)> {
    let call = IVip180::transferCall::abi_decode(data).ok()?;
    Some((call.to, call.amount))
}

/// ABI-encode `balanceOf(account)`.
#[must_use]
pub fn encode_balance_of(account: Address) -> Bytes {
    IVip180::balanceOfCall { account }.abi_encode().into()
}

/// Decode the uint256 returned by `balanceOf`.
pub(crate) fn decode_balance(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    U256::abi_decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::hex;

    const RECIPIENT: &str = "0x00000000000000000000000000000000000000aa";

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_native_transfer() {
        let intent = TransferIntent::new(RECIPIENT, ether(10), AssetKind::Native);
        let clauses = build_clauses(&intent);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].to, Address::with_last_byte(0xaa));
        assert_eq!(clauses[0].value, ether(10));
        assert!(clauses[0].data.is_none());
        assert!(!clauses[0].is_contract_call());
    }

    #[test]
    fn test_token_transfer_encoding() {
        let intent = TransferIntent::new(RECIPIENT, U256::from(1u8), AssetKind::Token(B3TR_MAINNET));
        let clauses = build_clauses(&intent);
        assert_eq!(clauses.len(), 1);

        let clause = &clauses[0];
        assert_eq!(clause.to, B3TR_MAINNET);
        assert_eq!(clause.value, U256::ZERO);
        assert!(clause.is_contract_call());

        let data = clause.data.as_ref().unwrap();
        let expected = hex!(
            "a9059cbb"
            "00000000000000000000000000000000000000000000000000000000000000aa"
            "0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(data.as_ref(), expected.as_slice());
        assert!(clause.comment.as_deref().unwrap().contains(RECIPIENT));
    }

    #[test]
    fn test_not_ready_yields_no_clauses() {
        let cases = [
            TransferIntent::new("", ether(1), AssetKind::Native),
            TransferIntent::new("0x1234", ether(1), AssetKind::Native),
            TransferIntent::new(RECIPIENT, U256::ZERO, AssetKind::Native),
            TransferIntent::new(RECIPIENT, U256::ZERO, AssetKind::Token(B3TR_MAINNET)),
            TransferIntent::new("not an address", ether(1), AssetKind::Token(B3TR_MAINNET)),
        ];
        for intent in &cases {
            assert!(build_clauses(intent).is_empty(), "{intent:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let intent = TransferIntent::new(RECIPIENT, ether(3), AssetKind::Token(B3TR_MAINNET));
        assert_eq!(build_clauses(&intent), build_clauses(&intent));
    }

    #[test]
    fn test_transfer_round_trip() {
        let to = Address::with_last_byte(0x42);
        let amount = U256::MAX - U256::from(7u8);
        let data = encode_transfer(to, amount);
        assert_eq!(decode_transfer(&data), Some((to, amount)));
        assert_eq!(decode_transfer(&encode_balance_of(to)), None);
    }

    #[test]
    fn test_balance_of_selector() {
        let data = encode_balance_of(Address::ZERO);
        assert_eq!(&data[..4], hex!("70a08231").as_slice());
        assert_eq!(data.len(), 36);
    }

    #[test]
    fn test_clause_serialization() {
        let intent = TransferIntent::new(RECIPIENT, ether(1), AssetKind::Native);
        let json = serde_json::to_value(&build_clauses(&intent)[0]).unwrap();
        let to = json["to"].as_str().unwrap().to_lowercase();
        assert_eq!(to, "0x00000000000000000000000000000000000000aa");
        assert!(json.get("data").is_none());
    }
}
