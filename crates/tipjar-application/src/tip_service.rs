//! Sending tips from the tipping widget.

use std::sync::Arc;

use tokio::sync::watch;

use tipjar_core::ledger::{Address, TransactionStatus, TxReceipt, WalletSession, Wei};
use tipjar_core::tipping::TipComposer;
use tipjar_core::{Result, TipjarError};

use crate::transaction::TransactionTracker;

/// Converts the composed fiat amount at the latest rate and submits `addTip`.
pub struct TipService {
    wallet: Arc<dyn WalletSession>,
    profile: Address,
    rates: watch::Receiver<Option<f64>>,
    fallback_rate: f64,
    tracker: TransactionTracker,
}

impl TipService {
    /// `rates` is usually a [`PricePoller`](crate::PricePoller) subscription;
    /// `fallback_rate` applies until it has produced a value.
    pub fn new(
        wallet: Arc<dyn WalletSession>,
        profile: Address,
        rates: watch::Receiver<Option<f64>>,
        fallback_rate: f64,
    ) -> Self {
        Self {
            wallet,
            profile,
            rates,
            fallback_rate,
            tracker: TransactionTracker::new(),
        }
    }

    pub fn current_rate(&self) -> f64 {
        self.rates.borrow().unwrap_or(self.fallback_rate)
    }

    /// Wei the composer's amount converts to right now.
    pub fn quote(&self, composer: &TipComposer) -> Result<Wei> {
        composer.wei_amount(self.current_rate())
    }

    pub async fn send(&self, composer: &TipComposer) -> Result<TxReceipt> {
        if self.wallet.active_account().is_none() {
            return Err(TipjarError::unauthorized("connect a wallet to send a tip"));
        }
        let request = composer.build_call(&self.profile, self.current_rate())?;
        tracing::info!("Sending tip of {} wei to {}", request.value, self.profile);
        self.tracker.track(self.wallet.submit(vec![request])).await
    }

    pub fn status(&self) -> TransactionStatus {
        self.tracker.status()
    }
}
