//! Transaction submission collaborator.
//!
//! Signing, fee delegation and broadcast happen outside this crate. The
//! [`TransactionSubmitter`] trait is the whole contract: accept clauses and
//! hand back an id, then report exactly one terminal [`TxOutcome`] for that
//! id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clause::Clause;
use crate::error::SubmitError;
use crate::receipt::{TxId, TxReceipt};

/// Text for the signing prompt the wallet shows the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiHints {
    /// Prompt title.
    pub title: String,
    /// What the user is signing.
    pub description: String,
    /// Label of the confirm button.
    pub button_text: String,
}

impl UiHints {
    /// Hints with the default title and button and the given description.
    #[must_use]
    pub fn describe(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

impl Default for UiHints {
    fn default() -> Self {
        Self {
            title: "Sign to confirm".into(),
            description: String::new(),
            button_text: "Sign".into(),
        }
    }
}

/// Terminal result of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// Included on chain.
    Included(TxReceipt),
    /// The signer or network rejected the transaction after acceptance.
    Rejected(String),
    /// Included but execution reverted.
    Reverted(String),
    /// The collaborator gave up waiting for inclusion.
    Timeout(String),
}

impl TxOutcome {
    /// Human-readable failure reason, `None` for successful inclusion.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Included(receipt) if receipt.reverted => Some("transaction reverted".into()),
            Self::Included(_) => None,
            Self::Rejected(reason) => Some(format!("rejected: {reason}")),
            Self::Reverted(reason) => Some(format!("reverted: {reason}")),
            Self::Timeout(reason) => Some(format!("timed out: {reason}")),
        }
    }
}

/// Signs, broadcasts and follows transactions on behalf of the user.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Hand clauses to the signer and broadcast them.
    ///
    /// Resolves once the transaction has an id.
    async fn submit(&self, clauses: &[Clause], hints: &UiHints) -> Result<TxId, SubmitError>;

    /// Wait for the single terminal event of a submitted transaction.
    async fn wait_for_outcome(&self, tx_id: &TxId) -> TxOutcome;
}
