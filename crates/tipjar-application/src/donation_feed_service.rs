//! Live donation feed for one profile.
//!
//! Two channels feed the same [`DonationFeed`]: periodic bulk reads of the
//! profile's recent tips (debounced, coalesced) and the live `TipReceived`
//! subscription (merged immediately, highlighted briefly). Readers watch a
//! revision counter and render pages on demand.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::{RwLock, mpsc, watch};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use tipjar_core::config::FeedConfig;
use tipjar_core::feed::{Donation, DonationFeed, FeedEntry, Paginator, collect_tips};
use tipjar_core::ledger::{Address, LedgerReader, Tip};

use crate::debounce::Debouncer;

/// Shortest bulk-read interval; smaller values are raised to it.
pub const MIN_SNAPSHOT_INTERVAL: Duration = Duration::from_secs(1);

/// Timing and sizing knobs of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub capacity: usize,
    pub page_size: usize,
    pub debounce: Duration,
    pub highlight: Duration,
    pub snapshot_interval: Duration,
}

impl From<&FeedConfig> for FeedSettings {
    fn from(config: &FeedConfig) -> Self {
        Self {
            capacity: config.capacity,
            page_size: config.page_size,
            debounce: Duration::from_millis(config.debounce_ms),
            highlight: Duration::from_millis(config.highlight_ms),
            snapshot_interval: Duration::from_secs(config.snapshot_interval_secs)
                .max(MIN_SNAPSHOT_INTERVAL),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

struct FeedState {
    feed: DonationFeed,
    paginator: Paginator,
}

struct Shared {
    state: RwLock<FeedState>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    async fn merge(&self, entries: Vec<FeedEntry>) -> usize {
        let added = {
            let mut state = self.state.write().await;
            let added = state.feed.merge(entries);
            let len = state.feed.len();
            state.paginator.clamp(len);
            added
        };
        self.bump();
        added
    }
}

/// Owns the feed's background tasks; dropping it stops them.
pub struct DonationFeedService {
    profile: Address,
    shared: Arc<Shared>,
    refresh: mpsc::UnboundedSender<()>,
    cancel: CancellationToken,
}

impl DonationFeedService {
    /// Starts the bulk and live channels for `profile`.
    pub fn start(ledger: Arc<dyn LedgerReader>, profile: Address, settings: FeedSettings) -> Self {
        let shared = Arc::new(Shared {
            state: RwLock::new(FeedState {
                feed: DonationFeed::new(settings.capacity),
                paginator: Paginator::new(settings.page_size),
            }),
            revision: watch::Sender::new(0),
        });
        let cancel = CancellationToken::new();
        let (refresh, refresh_rx) = mpsc::unbounded_channel();

        let flush_target = Arc::clone(&shared);
        let (snapshots, _) = Debouncer::<Vec<Tip>>::spawn(
            settings.debounce,
            cancel.clone(),
            move |batches| {
                let shared = Arc::clone(&flush_target);
                async move {
                    // Later reads are newer; put them first.
                    let entries: Vec<FeedEntry> = batches
                        .into_iter()
                        .rev()
                        .flatten()
                        .map(FeedEntry::settled)
                        .collect();
                    let added = shared.merge(entries).await;
                    tracing::debug!("Merged bulk snapshot, {} new donation(s)", added);
                }
            },
        );

        tokio::spawn(run_snapshots(
            Arc::clone(&ledger),
            profile.clone(),
            settings.snapshot_interval,
            snapshots,
            refresh_rx,
            cancel.clone(),
        ));
        tokio::spawn(run_live(
            ledger,
            profile.clone(),
            settings.highlight,
            Arc::clone(&shared),
            cancel.clone(),
        ));

        Self {
            profile,
            shared,
            refresh,
            cancel,
        }
    }

    pub fn profile(&self) -> &Address {
        &self.profile
    }

    /// Requests a bulk read now, outside the regular interval.
    pub fn refresh(&self) {
        let _ = self.refresh.send(());
    }

    /// Revision counter bumped on every feed change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub async fn len(&self) -> usize {
        self.shared.state.read().await.feed.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Retained entries, newest first.
    pub async fn entries(&self) -> Vec<FeedEntry> {
        self.shared.state.read().await.feed.entries().to_vec()
    }

    /// Donations of the current page, rendered against `usd_rate`.
    pub async fn current_page(&self, usd_rate: Option<f64>) -> Vec<Donation> {
        let state = self.shared.state.read().await;
        state.feed.render_page(&state.paginator, usd_rate, Utc::now())
    }

    /// Current page number (1-based) and page count.
    pub async fn page_info(&self) -> (usize, usize) {
        let state = self.shared.state.read().await;
        (
            state.paginator.page(),
            state.paginator.page_count(state.feed.len()),
        )
    }

    pub async fn next_page(&self) {
        self.move_page(|paginator, len| paginator.next(len)).await;
    }

    pub async fn previous_page(&self) {
        self.move_page(|paginator, len| paginator.previous(len)).await;
    }

    pub async fn go_to_page(&self, page: usize) {
        self.move_page(|paginator, len| paginator.go_to(page, len)).await;
    }

    async fn move_page(&self, step: impl FnOnce(&mut Paginator, usize)) {
        {
            let mut state = self.shared.state.write().await;
            let len = state.feed.len();
            step(&mut state.paginator, len);
        }
        self.shared.bump();
    }

    /// Stops every timer and task. Also done on drop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for DonationFeedService {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_snapshots(
    ledger: Arc<dyn LedgerReader>,
    profile: Address,
    period: Duration,
    snapshots: Debouncer<Vec<Tip>>,
    mut refresh: mpsc::UnboundedReceiver<()>,
    cancel: CancellationToken,
) {
    if period < MIN_SNAPSHOT_INTERVAL {
        tracing::warn!(
            "Snapshot interval {:?} too short, using {:?}",
            period,
            MIN_SNAPSHOT_INTERVAL
        );
    }
    let mut ticker = interval(period.max(MIN_SNAPSHOT_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            Some(()) = refresh.recv() => {}
        }

        match ledger.profile_details(&profile).await {
            Ok(record) => {
                snapshots.push(collect_tips(record.recent_tips));
            }
            Err(e) => tracing::warn!("Bulk read of {} failed, keeping feed: {}", profile, e),
        }
    }
}

async fn run_live(
    ledger: Arc<dyn LedgerReader>,
    profile: Address,
    highlight: Duration,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    let mut stream = match ledger.subscribe_tips(&profile).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Live tips for {} unavailable, bulk only: {}", profile, e);
            return;
        }
    };

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return,
            event = stream.next() => event,
        };
        let Some(event) = event else {
            tracing::warn!("Live tips for {} ended, bulk only", profile);
            return;
        };

        let tip = match Tip::try_from(event) {
            Ok(tip) => tip,
            Err(e) => {
                tracing::debug!("Dropping malformed live tip: {}", e);
                continue;
            }
        };

        let entry = FeedEntry::arrived(tip);
        let key = entry.key();
        shared.merge(vec![entry]).await;
        tracing::debug!("Live donation merged at {}", key.timestamp);

        let shared = Arc::clone(&shared);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(highlight) => {
                    let cleared = shared.state.write().await.feed.clear_new(&key);
                    if cleared {
                        shared.bump();
                    }
                }
            }
        });
    }
}
