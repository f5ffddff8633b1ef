//! Unified error types for thorkit.
//!
//! Each concern owns a small error enum:
//! - amount parsing ([`AmountError`])
//! - transaction submission ([`SubmitError`]) and tracking ([`TrackerError`])
//! - chain reads ([`RpcError`], [`BalanceError`])
//! - configuration ([`ConfigError`])
//!
//! All of them convert into the crate-level [`Error`].

/// Result type alias for thorkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for thorkit.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// User-entered amount could not be converted to base units.
    #[error("amount: {0}")]
    Amount(#[from] AmountError),

    /// Submission collaborator refused or failed a transaction.
    #[error("submit: {0}")]
    Submit(#[from] SubmitError),

    /// Tracker was used incorrectly.
    #[error("tracker: {0}")]
    Tracker(#[from] TrackerError),

    /// Read-only chain access failed.
    #[error("rpc: {0}")]
    Rpc(#[from] RpcError),

    /// Balance lookup failed.
    #[error("balance: {0}")]
    Balance(#[from] BalanceError),

    /// Configuration could not be resolved.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// Error type for amount parsing.
///
/// Malformed input is not an error (it parses as zero); only inputs that are
/// recognisably numeric but unrepresentable end up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The amount is negative.
    #[error("negative amounts are not allowed")]
    Negative,

    /// The scaled amount does not fit in 256 bits.
    #[error("amount exceeds 256 bits once scaled to base units")]
    Overflow,
}

/// Error type for the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SubmitError {
    /// Signer or wallet rejected the request.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The collaborator cannot express the requested clauses.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Broadcast or transport failure.
    #[error("transport: {0}")]
    Transport(String),
}

impl SubmitError {
    /// Create a rejected error.
    #[inline]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a transport error.
    #[inline]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Human-readable reason, without the category prefix.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Rejected(r) | Self::Unsupported(r) | Self::Transport(r) => r,
        }
    }
}

/// Error type for caller misuse of a [`TransactionTracker`](crate::tracker::TransactionTracker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// A submission is already building or pending on this tracker.
    #[error("a submission is already in flight")]
    SubmissionInFlight,
}

/// Error type for the read-only chain collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RpcError {
    /// The endpoint could not be reached or answered with a transport error.
    #[error("transport: {0}")]
    Transport(String),

    /// The endpoint answered with something that could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Create a transport error.
    #[inline]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Error type for balance queries.
///
/// A reverted `balanceOf` call is never reported here; it reads as zero.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    /// Balance is unknown because the chain could not be queried.
    #[error("balance unavailable: {0}")]
    Transport(#[from] RpcError),

    /// The contract returned data that is not a uint256.
    #[error("undecodable balance: {0}")]
    Decode(String),
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing required field.
    #[error("missing: {0}")]
    Missing(String),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a missing field error.
    #[inline]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Create an invalid value error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
