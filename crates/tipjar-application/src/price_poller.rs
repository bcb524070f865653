//! Periodic exchange-rate polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use tipjar_core::price::PriceFeed;

/// Shortest polling period; smaller configured values are raised to it.
pub const MIN_POLL_PERIOD: Duration = Duration::from_secs(1);

/// Fetches the rate immediately and then every `period`.
///
/// A failed fetch is logged and the last good rate stays published.
pub struct PricePoller {
    rate: watch::Receiver<Option<f64>>,
    cancel: CancellationToken,
}

impl PricePoller {
    pub fn spawn(feed: Arc<dyn PriceFeed>, period: Duration) -> Self {
        let (tx, rate) = watch::channel(None);
        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        if period < MIN_POLL_PERIOD {
            tracing::warn!("Price poll period {:?} too short, using {:?}", period, MIN_POLL_PERIOD);
        }
        let period = period.max(MIN_POLL_PERIOD);

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!("Price poller started ({:?} interval)", period);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match feed.fetch_rate().await {
                    Ok(rate) => {
                        tx.send_replace(Some(rate));
                    }
                    Err(e) => tracing::warn!("Price fetch failed, keeping last rate: {}", e),
                }
            }
            tracing::debug!("Price poller stopped");
        });

        Self { rate, cancel }
    }

    /// Last successfully fetched rate.
    pub fn latest(&self) -> Option<f64> {
        *self.rate.borrow()
    }

    pub fn rate_or(&self, fallback: f64) -> f64 {
        self.latest().unwrap_or(fallback)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<f64>> {
        self.rate.clone()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PricePoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
