//! Transfer form state.
//!
//! A [`TransferForm`] holds what the user typed into one transfer card and
//! derives everything else from it on demand: the intent, the clauses and
//! the signing-prompt text. Nothing derived is cached, so the clauses always
//! reflect the current input.

use alloy::primitives::U256;

use crate::address::is_valid_address;
use crate::amount::parse_amount;
use crate::clause::{AssetKind, Clause, TransferIntent, build_clauses};
use crate::error::AmountError;
use crate::session::WalletSession;
use crate::submit::UiHints;

/// Input state of a transfer card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferForm {
    asset: AssetKind,
    symbol: String,
    recipient: String,
    amount: String,
}

impl TransferForm {
    /// Empty form for `asset`, labelled with `symbol` (e.g. `"VET"`).
    #[must_use]
    pub fn new(asset: AssetKind, symbol: impl Into<String>) -> Self {
        Self {
            asset,
            symbol: symbol.into(),
            recipient: String::new(),
            amount: "0".into(),
        }
    }

    /// Pre-fill the recipient.
    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }

    /// Asset moved by this form.
    #[must_use]
    pub const fn asset(&self) -> AssetKind {
        self.asset
    }

    /// Current recipient text.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Current amount text.
    #[must_use]
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Update the recipient text.
    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.recipient = recipient.into();
    }

    /// Update the amount text. Clearing the field stores `"0"`.
    pub fn set_amount(&mut self, amount: impl Into<String>) {
        let amount = amount.into();
        self.amount = if amount.is_empty() { "0".into() } else { amount };
    }

    /// Whether the recipient field should be highlighted as invalid.
    #[must_use]
    pub fn recipient_is_invalid(&self) -> bool {
        !is_valid_address(&self.recipient)
    }

    /// Track the connected wallet: its address becomes the recipient.
    ///
    /// Leaves the form alone when the session has no wallet address.
    pub fn follow_session(&mut self, session: &dyn WalletSession) {
        if let Some(address) = session.wallet_address() {
            self.recipient = address.to_checksum(None);
        }
    }

    /// Parsed amount in base units.
    ///
    /// # Errors
    ///
    /// Propagates [`AmountError`] for negative or oversized input.
    pub fn parsed_amount(&self) -> Result<U256, AmountError> {
        parse_amount(&self.amount)
    }

    /// Intent described by the current input, if the amount parses.
    #[must_use]
    pub fn intent(&self) -> Option<TransferIntent> {
        let amount = self.parsed_amount().ok()?;
        Some(TransferIntent::new(self.recipient.clone(), amount, self.asset))
    }

    /// Clauses for the current input; empty while the form is not ready.
    #[must_use]
    pub fn clauses(&self) -> Vec<Clause> {
        let Some(intent) = self.intent() else {
            return Vec::new();
        };
        let description = self.description();
        build_clauses(&intent)
            .into_iter()
            .map(|clause| match self.asset {
                AssetKind::Native => clause,
                AssetKind::Token(_) => clause.with_comment(description.clone()),
            })
            .collect()
    }

    /// Whether the form would produce at least one clause.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.clauses().is_empty()
    }

    /// Signing-prompt text for the current input.
    #[must_use]
    pub fn hints(&self) -> UiHints {
        UiHints::describe(self.description())
    }

    fn description(&self) -> String {
        format!("Transfer {} {} to {}", self.amount, self.symbol, self.recipient)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::*;
    use crate::clause::{B3TR_MAINNET, decode_transfer};
    use crate::session::StaticSession;

    const RECIPIENT: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn test_new_form_is_not_ready() {
        let form = TransferForm::new(AssetKind::Native, "VET");
        assert_eq!(form.amount(), "0");
        assert!(form.recipient_is_invalid());
        assert!(form.clauses().is_empty());
        assert!(!form.is_ready());
    }

    #[test]
    fn test_cleared_amount_reads_as_zero() {
        let mut form = TransferForm::new(AssetKind::Native, "VET").with_recipient(RECIPIENT);
        form.set_amount("");
        assert_eq!(form.amount(), "0");
        assert_eq!(form.parsed_amount().unwrap(), U256::ZERO);
        assert!(form.clauses().is_empty());
    }

    #[test]
    fn test_native_form() {
        let mut form = TransferForm::new(AssetKind::Native, "VET").with_recipient(RECIPIENT);
        form.set_amount("10");

        let clauses = form.clauses();
        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0].value,
            U256::from(10u8) * U256::from(10u64).pow(U256::from(18u8))
        );
        assert_eq!(form.hints().description, format!("Transfer 10 VET to {RECIPIENT}"));
    }

    #[test]
    fn test_token_form_comment() {
        let mut form =
            TransferForm::new(AssetKind::Token(B3TR_MAINNET), "B3TR").with_recipient(RECIPIENT);
        form.set_amount("2.5");

        let clauses = form.clauses();
        assert_eq!(clauses[0].to, B3TR_MAINNET);
        assert_eq!(
            clauses[0].comment.as_deref(),
            Some(format!("Transfer 2.5 B3TR to {RECIPIENT}").as_str())
        );
        let (to, amount) = decode_transfer(clauses[0].data.as_ref().unwrap()).unwrap();
        assert_eq!(to, Address::with_last_byte(0xaa));
        assert_eq!(amount, form.parsed_amount().unwrap());
    }

    #[test]
    fn test_negative_amount_not_ready() {
        let mut form = TransferForm::new(AssetKind::Native, "VET").with_recipient(RECIPIENT);
        form.set_amount("-1");
        assert_eq!(form.parsed_amount(), Err(AmountError::Negative));
        assert!(form.intent().is_none());
        assert!(form.clauses().is_empty());
    }

    #[test]
    fn test_follow_session() {
        let mut form = TransferForm::new(AssetKind::Native, "VET");
        form.follow_session(&StaticSession::disconnected());
        assert_eq!(form.recipient(), "");

        form.follow_session(&StaticSession::connected(Address::with_last_byte(0xaa)));
        assert!(!form.recipient_is_invalid());
        assert_eq!(form.recipient().to_lowercase(), RECIPIENT);
    }
}
