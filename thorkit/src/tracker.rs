//! Transaction lifecycle tracking.
//!
//! A [`TransactionTracker`] follows one submission at a time through
//!
//! ```text
//! Idle ─► Building ─► Pending ─► Success
//!   ▲                    │
//!   │                    └─────► Failed
//!   └──── reset() ◄──────────────┘
//! ```
//!
//! Every transition is published on a [`watch`] channel so a UI can render
//! loading, pending and resolved states in order. A second submission while
//! one is building or pending is refused with
//! [`TrackerError::SubmissionInFlight`] and leaves the running one untouched.
//! Dropping a `submit` future before it resolves records a failure with the
//! reason [`ABANDONED`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::clause::Clause;
use crate::error::TrackerError;
use crate::receipt::{TxId, TxReceipt};
use crate::submit::{TransactionSubmitter, TxOutcome, UiHints};

/// Where a submission currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Nothing submitted.
    #[default]
    Idle,
    /// Clauses handed to the signer, no id yet.
    Building,
    /// Broadcast and waiting for inclusion.
    Pending {
        /// Id assigned by the submitter.
        tx_id: TxId,
    },
    /// Included on chain.
    Success {
        /// Transaction id.
        tx_id: TxId,
        /// Inclusion receipt.
        receipt: TxReceipt,
    },
    /// Refused, reverted or timed out.
    Failed {
        /// Id, if the submitter assigned one before failing.
        tx_id: Option<TxId>,
        /// Human-readable reason.
        reason: String,
    },
}

impl TransactionStatus {
    /// Whether a submission is building or pending.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Building | Self::Pending { .. })
    }

    /// Whether the status is `Success` or `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failed { .. })
    }

    /// Transaction id, available from `Pending` onwards.
    #[must_use]
    pub const fn tx_id(&self) -> Option<&TxId> {
        match self {
            Self::Pending { tx_id } | Self::Success { tx_id, .. } => Some(tx_id),
            Self::Failed { tx_id, .. } => tx_id.as_ref(),
            Self::Idle | Self::Building => None,
        }
    }

    /// Failure reason, only in `Failed`.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Building => write!(f, "building"),
            Self::Pending { tx_id } => write!(f, "pending ({tx_id})"),
            Self::Success { tx_id, receipt } => match receipt.block_number {
                Some(block) => write!(f, "success ({tx_id}, block {block})"),
                None => write!(f, "success ({tx_id})"),
            },
            Self::Failed { reason, .. } => write!(f, "failed: {reason}"),
        }
    }
}

/// State machine for one submission affordance.
pub struct TransactionTracker {
    submitter: Arc<dyn TransactionSubmitter>,
    status: watch::Sender<TransactionStatus>,
}

impl fmt::Debug for TransactionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionTracker")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl TransactionTracker {
    /// Create an idle tracker submitting through `submitter`.
    #[must_use]
    pub fn new(submitter: Arc<dyn TransactionSubmitter>) -> Self {
        let (status, _) = watch::channel(TransactionStatus::Idle);
        Self { submitter, status }
    }

    /// Snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> TransactionStatus {
        self.status.borrow().clone()
    }

    /// Whether a submission is building or pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.borrow().is_in_flight()
    }

    /// Subscribe to status transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TransactionStatus> {
        self.status.subscribe()
    }

    /// Submit `clauses` and follow them to a terminal status.
    ///
    /// Empty `clauses` is a no-op that returns the current status. Otherwise
    /// the future resolves once the submitter has reported the terminal
    /// outcome, returning the final status. Collaborator failures end up in
    /// [`TransactionStatus::Failed`], not in the error.
    ///
    /// # Errors
    ///
    /// [`TrackerError::SubmissionInFlight`] if another submission on this
    /// tracker is building or pending.
    #[instrument(skip_all, fields(clauses = clauses.len()))]
    pub async fn submit(
        &self,
        clauses: &[Clause],
        hints: &UiHints,
    ) -> Result<TransactionStatus, TrackerError> {
        if clauses.is_empty() {
            debug!("no clauses, nothing to submit");
            return Ok(self.status());
        }

        let mut in_flight = false;
        self.status.send_if_modified(|status| {
            if status.is_in_flight() {
                in_flight = true;
                return false;
            }
            *status = TransactionStatus::Building;
            true
        });
        if in_flight {
            warn!("submission refused, another one is in flight");
            return Err(TrackerError::SubmissionInFlight);
        }
        debug!("building transaction");
        let guard = InFlight::arm(&self.status);

        let tx_id = match self.submitter.submit(clauses, hints).await {
            Ok(tx_id) => tx_id,
            Err(e) => {
                warn!(error = %e, "submission failed");
                return Ok(guard.finish(TransactionStatus::Failed {
                    tx_id: None,
                    reason: e.to_string(),
                }));
            }
        };

        info!(tx_id = %tx_id, "transaction pending");
        self.status.send_replace(TransactionStatus::Pending {
            tx_id: tx_id.clone(),
        });

        let outcome = self.submitter.wait_for_outcome(&tx_id).await;
        let next = match (outcome.failure_reason(), outcome) {
            (None, TxOutcome::Included(receipt)) => {
                info!(tx_id = %tx_id, block = ?receipt.block_number, "transaction included");
                TransactionStatus::Success { tx_id, receipt }
            }
            (reason, _) => {
                let reason = reason.unwrap_or_else(|| "unknown error".into());
                warn!(tx_id = %tx_id, reason = %reason, "transaction failed");
                TransactionStatus::Failed {
                    tx_id: Some(tx_id),
                    reason,
                }
            }
        };
        Ok(guard.finish(next))
    }

    /// Return to `Idle`, clearing the id and error of the last submission.
    ///
    /// # Errors
    ///
    /// [`TrackerError::SubmissionInFlight`] while a submission is building or
    /// pending; the status is left unchanged.
    pub fn reset(&self) -> Result<(), TrackerError> {
        let mut in_flight = false;
        let changed = self.status.send_if_modified(|status| {
            if status.is_in_flight() {
                in_flight = true;
                false
            } else if *status == TransactionStatus::Idle {
                false
            } else {
                *status = TransactionStatus::Idle;
                true
            }
        });
        if in_flight {
            return Err(TrackerError::SubmissionInFlight);
        }
        if changed {
            debug!("tracker reset");
        }
        Ok(())
    }
}

/// Reason recorded when a submission future is dropped before it finishes.
pub const ABANDONED: &str = "submission abandoned";

/// Keeps a started submission from leaving the tracker in flight forever.
///
/// If the `submit` future is dropped between `Building` and its terminal
/// status, the guard records [`TransactionStatus::Failed`] so that `reset`
/// and later submissions work again.
#[derive(Debug)]
struct InFlight<'a> {
    status: &'a watch::Sender<TransactionStatus>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    const fn arm(status: &'a watch::Sender<TransactionStatus>) -> Self {
        Self {
            status,
            armed: true,
        }
    }

    fn finish(mut self, status: TransactionStatus) -> TransactionStatus {
        self.armed = false;
        self.status.send_replace(status.clone());
        status
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let tx_id = self.status.borrow().tx_id().cloned();
        warn!(tx_id = ?tx_id, "submission dropped before completion");
        self.status.send_replace(TransactionStatus::Failed {
            tx_id,
            reason: ABANDONED.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use alloy::primitives::{Address, U256};
    use tokio::sync::oneshot;
    use tokio_test::{assert_pending, assert_ready_err, assert_ready_ok, task};

    use super::*;
    use crate::clause::{AssetKind, TransferIntent, build_clauses};
    use crate::error::SubmitError;

    type Accept = Result<TxId, SubmitError>;

    /// Submitter driven by the test through oneshot channels.
    struct ScriptedSubmitter {
        accept: Mutex<Option<oneshot::Receiver<Accept>>>,
        outcome: Mutex<Option<oneshot::Receiver<TxOutcome>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSubmitter {
        fn new() -> (Arc<Self>, oneshot::Sender<Accept>, oneshot::Sender<TxOutcome>) {
            let (accept_tx, accept_rx) = oneshot::channel();
            let (outcome_tx, outcome_rx) = oneshot::channel();
            let submitter = Self {
                accept: Mutex::new(Some(accept_rx)),
                outcome: Mutex::new(Some(outcome_rx)),
                calls: AtomicUsize::new(0),
            };
            (Arc::new(submitter), accept_tx, outcome_tx)
        }
    }

    #[async_trait::async_trait]
    impl TransactionSubmitter for ScriptedSubmitter {
        async fn submit(&self, _clauses: &[Clause], _hints: &UiHints) -> Result<TxId, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rx = self.accept.lock().unwrap().take();
            match rx {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(SubmitError::transport("closed"))),
                None => Err(SubmitError::transport("already used")),
            }
        }

        async fn wait_for_outcome(&self, _tx_id: &TxId) -> TxOutcome {
            let rx = self.outcome.lock().unwrap().take();
            match rx {
                Some(rx) => rx.await.unwrap_or_else(|_| TxOutcome::Rejected("closed".into())),
                None => TxOutcome::Rejected("already used".into()),
            }
        }
    }

    fn clauses() -> Vec<Clause> {
        build_clauses(&TransferIntent::new(
            "0x00000000000000000000000000000000000000aa",
            U256::from(1u8),
            AssetKind::Native,
        ))
    }

    #[test]
    fn test_empty_clauses_is_noop() {
        let (submitter, _accept, _outcome) = ScriptedSubmitter::new();
        let tracker = TransactionTracker::new(submitter.clone());
        let hints = UiHints::default();

        let mut fut = task::spawn(tracker.submit(&[], &hints));
        let status = assert_ready_ok!(fut.poll());
        assert_eq!(status, TransactionStatus::Idle);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_status_progression_and_rejection() {
        let (submitter, accept, outcome) = ScriptedSubmitter::new();
        let tracker = TransactionTracker::new(submitter);
        let mut updates = tracker.subscribe();
        let (clauses, hints) = (clauses(), UiHints::default());

        let mut fut = task::spawn(tracker.submit(&clauses, &hints));
        assert_pending!(fut.poll());
        assert_eq!(tracker.status(), TransactionStatus::Building);
        assert!(tracker.is_pending());
        assert!(updates.has_changed().unwrap());
        assert_eq!(*updates.borrow_and_update(), TransactionStatus::Building);

        accept.send(Ok(TxId::new("0xabc"))).unwrap();
        assert!(fut.is_woken());
        assert_pending!(fut.poll());
        assert_eq!(
            *updates.borrow_and_update(),
            TransactionStatus::Pending {
                tx_id: TxId::new("0xabc")
            }
        );

        outcome.send(TxOutcome::Rejected("user denied".into())).unwrap();
        let status = assert_ready_ok!(fut.poll());
        assert_eq!(
            status,
            TransactionStatus::Failed {
                tx_id: Some(TxId::new("0xabc")),
                reason: "rejected: user denied".into(),
            }
        );
        assert_eq!(status.error(), Some("rejected: user denied"));
        assert_eq!(tracker.status(), status);

        tracker.reset().unwrap();
        assert_eq!(tracker.status(), TransactionStatus::Idle);
        assert_eq!(tracker.status().tx_id(), None);
    }

    #[test]
    fn test_second_submit_while_pending_is_refused() {
        let (submitter, accept, outcome) = ScriptedSubmitter::new();
        let tracker = TransactionTracker::new(submitter.clone());
        let (clauses, hints) = (clauses(), UiHints::default());

        let mut first = task::spawn(tracker.submit(&clauses, &hints));
        accept.send(Ok(TxId::new("0x01"))).unwrap();
        assert_pending!(first.poll());
        let pending = tracker.status();
        assert!(matches!(pending, TransactionStatus::Pending { .. }));

        let mut second = task::spawn(tracker.submit(&clauses, &hints));
        let err = assert_ready_err!(second.poll());
        assert_eq!(err, TrackerError::SubmissionInFlight);
        assert_eq!(tracker.status(), pending);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

        assert_eq!(tracker.reset(), Err(TrackerError::SubmissionInFlight));
        assert_eq!(tracker.status(), pending);

        let receipt = TxReceipt::included(TxId::new("0x01"), Some(42));
        outcome.send(TxOutcome::Included(receipt.clone())).unwrap();
        let status = assert_ready_ok!(first.poll());
        assert_eq!(
            status,
            TransactionStatus::Success {
                tx_id: TxId::new("0x01"),
                receipt,
            }
        );
        assert_eq!(status.to_string(), "success (0x01, block 42)");
    }

    #[test]
    fn test_submit_error_fails_without_tx_id() {
        let (submitter, accept, _outcome) = ScriptedSubmitter::new();
        let tracker = TransactionTracker::new(submitter);
        let (clauses, hints) = (clauses(), UiHints::default());

        accept.send(Err(SubmitError::rejected("signer refused"))).unwrap();
        let mut fut = task::spawn(tracker.submit(&clauses, &hints));
        let status = assert_ready_ok!(fut.poll());
        assert_eq!(status.tx_id(), None);
        assert_eq!(status.error(), Some("rejected: signer refused"));
    }

    #[test]
    fn test_reverted_receipt_is_failure() {
        let (submitter, accept, outcome) = ScriptedSubmitter::new();
        let tracker = TransactionTracker::new(submitter);
        let (clauses, hints) = (clauses(), UiHints::default());

        accept.send(Ok(TxId::new("0x02"))).unwrap();
        let mut receipt = TxReceipt::included(TxId::new("0x02"), Some(1));
        receipt.reverted = true;
        outcome.send(TxOutcome::Included(receipt)).unwrap();

        let mut fut = task::spawn(tracker.submit(&clauses, &hints));
        let status = assert_ready_ok!(fut.poll());
        assert_eq!(status.error(), Some("transaction reverted"));
        assert_eq!(status.tx_id(), Some(&TxId::new("0x02")));
    }

    #[test]
    fn test_dropped_submit_can_be_reset() {
        let (submitter, _accept, _outcome) = ScriptedSubmitter::new();
        let tracker = TransactionTracker::new(submitter);
        let (clauses, hints) = (clauses(), UiHints::default());

        let mut fut = task::spawn(tracker.submit(&clauses, &hints));
        assert_pending!(fut.poll());
        assert_eq!(tracker.status(), TransactionStatus::Building);
        drop(fut);

        let status = tracker.status();
        assert_eq!(status.tx_id(), None);
        assert_eq!(status.error(), Some(ABANDONED));
        assert!(!tracker.is_pending());

        tracker.reset().unwrap();
        assert_eq!(tracker.status(), TransactionStatus::Idle);
    }

    #[test]
    fn test_dropped_while_pending_keeps_tx_id() {
        let (submitter, accept, _outcome) = ScriptedSubmitter::new();
        let tracker = TransactionTracker::new(submitter.clone());
        let (clauses, hints) = (clauses(), UiHints::default());

        accept.send(Ok(TxId::new("0x03"))).unwrap();
        let mut fut = task::spawn(tracker.submit(&clauses, &hints));
        assert_pending!(fut.poll());
        assert!(matches!(tracker.status(), TransactionStatus::Pending { .. }));
        drop(fut);

        assert_eq!(
            tracker.status(),
            TransactionStatus::Failed {
                tx_id: Some(TxId::new("0x03")),
                reason: ABANDONED.into(),
            }
        );

        // The tracker accepts a new submission straight away.
        let mut retry = task::spawn(tracker.submit(&clauses, &hints));
        let status = assert_ready_ok!(retry.poll());
        assert_eq!(status.error(), Some("transport: already used"));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 2);
    }

    /// Submitter that accepts immediately and reports inclusion.
    struct InstantSubmitter;

    #[async_trait::async_trait]
    impl TransactionSubmitter for InstantSubmitter {
        async fn submit(&self, clauses: &[Clause], _hints: &UiHints) -> Result<TxId, SubmitError> {
            Ok(TxId::new(format!("0x{:02x}", clauses.len())))
        }

        async fn wait_for_outcome(&self, tx_id: &TxId) -> TxOutcome {
            TxOutcome::Included(TxReceipt::included(tx_id.clone(), None))
        }
    }

    #[tokio::test]
    async fn test_resubmit_after_terminal_state() {
        let tracker = Arc::new(TransactionTracker::new(Arc::new(InstantSubmitter)));
        let hints = UiHints::default();
        let clauses = vec![Clause {
            to: Address::with_last_byte(1),
            value: U256::from(5u8),
            data: None,
            comment: None,
        }];

        let first = tracker.submit(&clauses, &hints).await.unwrap();
        assert!(first.is_terminal());

        let tracker2 = Arc::clone(&tracker);
        let second = tokio::spawn(async move {
            let hints = UiHints::default();
            tracker2.submit(&clauses, &hints).await
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(second.tx_id(), Some(&TxId::new("0x01")));
        assert!(!tracker.is_pending());
    }
}
