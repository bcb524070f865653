//! Submission status tracking.

use std::future::Future;

use tokio::sync::watch;

use tipjar_core::ledger::{TransactionStatus, TxReceipt};
use tipjar_core::{Result, TipjarError};

/// Drives one button's `Idle -> Pending -> Success | Error` lifecycle.
///
/// Only one submission may be pending at a time; failures are reported,
/// never retried.
#[derive(Debug)]
pub struct TransactionTracker {
    status: watch::Sender<TransactionStatus>,
}

impl Default for TransactionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionTracker {
    pub fn new() -> Self {
        Self {
            status: watch::Sender::new(TransactionStatus::Idle),
        }
    }

    pub fn status(&self) -> TransactionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionStatus> {
        self.status.subscribe()
    }

    /// Runs `submission`, publishing its status.
    pub async fn track<F>(&self, submission: F) -> Result<TxReceipt>
    where
        F: Future<Output = Result<TxReceipt>>,
    {
        let started = self.status.send_if_modified(|status| {
            if status.is_pending() {
                return false;
            }
            *status = TransactionStatus::Pending;
            true
        });
        if !started {
            return Err(TipjarError::validation("a transaction is already pending"));
        }

        match submission.await {
            Ok(receipt) => {
                tracing::info!(
                    "Transaction {} confirmed ({} call(s))",
                    receipt.transaction_hash,
                    receipt.call_count
                );
                self.status.send_replace(TransactionStatus::Success {
                    transaction_hash: receipt.transaction_hash.clone(),
                });
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("Transaction failed: {}", e);
                self.status.send_replace(TransactionStatus::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Back to `Idle`, e.g. when the dialog closes.
    pub fn reset(&self) {
        self.status.send_if_modified(|status| {
            if status.is_pending() {
                return false;
            }
            *status = TransactionStatus::Idle;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> TxReceipt {
        TxReceipt {
            transaction_hash: "0xabc".into(),
            call_count: 1,
        }
    }

    #[tokio::test]
    async fn test_success_lifecycle() {
        let tracker = TransactionTracker::new();
        assert_eq!(tracker.status(), TransactionStatus::Idle);

        tracker.track(async { Ok(receipt()) }).await.unwrap();
        assert_eq!(
            tracker.status(),
            TransactionStatus::Success {
                transaction_hash: "0xabc".into()
            }
        );

        tracker.reset();
        assert_eq!(tracker.status(), TransactionStatus::Idle);
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let tracker = TransactionTracker::new();
        let result = tracker
            .track(async { Err(TipjarError::ledger("reverted")) })
            .await;
        assert!(result.is_err());
        assert!(matches!(tracker.status(), TransactionStatus::Error { message } if message.contains("reverted")));
    }

    #[tokio::test]
    async fn test_second_submission_refused_while_pending() {
        let tracker = TransactionTracker::new();
        let (release, wait) = tokio::sync::oneshot::channel::<()>();

        let first = tracker.track(async move {
            let _ = wait.await;
            Ok(receipt())
        });
        let second = async {
            tokio::task::yield_now().await;
            assert!(tracker.status().is_pending());
            let refused = tracker.track(async { Ok(receipt()) }).await;
            assert!(refused.unwrap_err().is_validation());
            let _ = release.send(());
        };

        let (first, ()) = tokio::join!(first, second);
        assert!(first.is_ok());
    }
}
