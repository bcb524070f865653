//! Donation feed: merge of bulk snapshots and live tips.
//!
//! The feed keeps at most [`FEED_CAPACITY`] tips, unique by [`DonationKey`],
//! sorted newest first. Both channels go through [`DonationFeed::merge`];
//! dedup-by-key is the only ordering recovery between them.

mod donation;
mod pagination;

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ledger::{Address, RawTip, Tip, Wei};

pub use donation::Donation;
pub use pagination::{PAGE_SIZE, Paginator};

/// Maximum number of tips retained by the feed.
pub const FEED_CAPACITY: usize = 200;

/// Identity of a donation in the feed.
///
/// Field order defines the sort: timestamp first, the rest only breaks ties
/// between distinct tips recorded in the same second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DonationKey {
    pub timestamp: u64,
    pub sender: Address,
    pub amount: Wei,
    pub message: String,
}

impl DonationKey {
    pub fn of(tip: &Tip) -> Self {
        Self {
            timestamp: tip.timestamp,
            sender: tip.sender.clone(),
            amount: tip.amount,
            message: tip.message.clone(),
        }
    }
}

/// A retained tip plus its transient highlight flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub tip: Tip,
    pub is_new: bool,
}

impl FeedEntry {
    pub fn settled(tip: Tip) -> Self {
        Self { tip, is_new: false }
    }

    pub fn arrived(tip: Tip) -> Self {
        Self { tip, is_new: true }
    }

    pub fn key(&self) -> DonationKey {
        DonationKey::of(&self.tip)
    }
}

/// Bounded, deduplicated, recency-ordered list of tips.
#[derive(Debug, Clone)]
pub struct DonationFeed {
    entries: Vec<FeedEntry>,
    capacity: usize,
}

impl Default for DonationFeed {
    fn default() -> Self {
        Self::new(FEED_CAPACITY)
    }
}

impl DonationFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Merges a batch into the retained set.
    ///
    /// New entries go ahead of retained ones, duplicates collapse onto the
    /// first occurrence (a copy flagged new keeps the flag), the result is
    /// sorted by key descending and truncated to capacity.
    ///
    /// Returns how many previously unseen keys are retained afterwards.
    pub fn merge(&mut self, batch: Vec<FeedEntry>) -> usize {
        let previous: HashSet<DonationKey> = self.entries.iter().map(FeedEntry::key).collect();

        let mut positions: HashMap<DonationKey, usize> = HashMap::new();
        let mut merged: Vec<FeedEntry> = Vec::with_capacity(batch.len() + self.entries.len());

        for entry in batch.into_iter().chain(self.entries.drain(..)) {
            let key = entry.key();
            match positions.get(&key) {
                Some(&position) => {
                    if entry.is_new {
                        merged[position].is_new = true;
                    }
                }
                None => {
                    positions.insert(key, merged.len());
                    merged.push(entry);
                }
            }
        }

        merged.sort_by_cached_key(|entry| Reverse(entry.key()));
        merged.truncate(self.capacity);

        let added = merged
            .iter()
            .filter(|entry| !previous.contains(&entry.key()))
            .count();
        self.entries = merged;

        tracing::debug!(
            added,
            retained = self.entries.len(),
            "merged donation batch"
        );
        added
    }

    /// Merges a bulk snapshot: nothing in it is highlighted.
    pub fn merge_snapshot(&mut self, tips: Vec<Tip>) -> usize {
        self.merge(tips.into_iter().map(FeedEntry::settled).collect())
    }

    /// Clears the highlight of one entry. Returns whether it was set.
    pub fn clear_new(&mut self, key: &DonationKey) -> bool {
        self.entries
            .iter_mut()
            .find(|entry| entry.key() == *key)
            .map(|entry| std::mem::replace(&mut entry.is_new, false))
            .unwrap_or(false)
    }

    /// View models for the paginator's current page.
    pub fn render_page(
        &self,
        paginator: &Paginator,
        usd_rate: Option<f64>,
        now: DateTime<Utc>,
    ) -> Vec<Donation> {
        self.entries[paginator.range(self.entries.len())]
            .iter()
            .map(|entry| Donation::render(entry, usd_rate, now))
            .collect()
    }
}

/// Converts ledger tips, dropping the ones with malformed sender or amount.
pub fn collect_tips(raw: Vec<RawTip>) -> Vec<Tip> {
    raw.into_iter()
        .filter_map(|raw| match Tip::try_from(raw) {
            Ok(tip) => Some(tip),
            Err(e) => {
                tracing::debug!("dropping malformed tip: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(n: u8) -> Address {
        format!("0x{}", format!("{n:02x}").repeat(20)).parse().unwrap()
    }

    fn tip(n: u8, timestamp: u64) -> Tip {
        Tip {
            sender: address(n),
            amount: Wei(u128::from(n) * 1_000),
            message: format!("tip {n}"),
            timestamp,
        }
    }

    fn assert_invariants(feed: &DonationFeed) {
        assert!(feed.len() <= feed.capacity());
        let keys: HashSet<_> = feed.entries().iter().map(FeedEntry::key).collect();
        assert_eq!(keys.len(), feed.len(), "keys must be unique");
        let sorted = feed
            .entries()
            .windows(2)
            .all(|pair| pair[0].key() >= pair[1].key());
        assert!(sorted, "entries must be sorted by key descending");
    }

    #[test]
    fn test_merge_orders_newest_first() {
        let mut feed = DonationFeed::default();
        feed.merge_snapshot(vec![tip(1, 10), tip(2, 30), tip(3, 20)]);
        let timestamps: Vec<u64> = feed.entries().iter().map(|e| e.tip.timestamp).collect();
        assert_eq!(timestamps, vec![30, 20, 10]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut feed = DonationFeed::default();
        let batch = vec![tip(1, 10), tip(2, 20)];
        assert_eq!(feed.merge_snapshot(batch.clone()), 2);
        let before = feed.entries().to_vec();

        assert_eq!(feed.merge_snapshot(batch), 0);
        assert_eq!(feed.entries(), before.as_slice());
    }

    #[test]
    fn test_simultaneous_tips_are_not_collapsed() {
        let mut feed = DonationFeed::default();
        feed.merge_snapshot(vec![tip(1, 10), tip(2, 10)]);
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn test_capacity_keeps_most_recent() {
        let mut feed = DonationFeed::new(FEED_CAPACITY);
        for round in 0..5u64 {
            let batch = (0..100u64)
                .map(|i| tip((i % 7) as u8, round * 100 + i))
                .collect();
            feed.merge_snapshot(batch);
            assert_invariants(&feed);
        }
        assert_eq!(feed.len(), FEED_CAPACITY);
        assert_eq!(feed.entries()[0].tip.timestamp, 499);
        assert_eq!(feed.entries()[FEED_CAPACITY - 1].tip.timestamp, 300);
    }

    #[test]
    fn test_live_flag_survives_snapshot_of_same_tip() {
        let mut feed = DonationFeed::default();
        feed.merge(vec![FeedEntry::arrived(tip(1, 10))]);
        feed.merge_snapshot(vec![tip(1, 10)]);
        assert_eq!(feed.len(), 1);
        assert!(feed.entries()[0].is_new);

        let key = feed.entries()[0].key();
        assert!(feed.clear_new(&key));
        assert!(!feed.entries()[0].is_new);
        assert!(!feed.clear_new(&key));
    }

    #[test]
    fn test_mixed_channels_hold_invariants() {
        let mut feed = DonationFeed::new(10);
        for i in 0..40u64 {
            if i % 3 == 0 {
                feed.merge(vec![FeedEntry::arrived(tip((i % 5) as u8, i / 2))]);
            } else {
                feed.merge_snapshot(vec![tip((i % 4) as u8, i / 2), tip(9, i / 4)]);
            }
            assert_invariants(&feed);
        }
    }

    #[test]
    fn test_collect_tips_drops_malformed() {
        let raw = vec![
            RawTip {
                value: "100".into(),
                from: address(1).to_string(),
                message: String::new(),
                timestamp: 1,
            },
            RawTip {
                value: "100".into(),
                from: "nobody".into(),
                message: String::new(),
                timestamp: 2,
            },
        ];
        let tips = collect_tips(raw);
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].timestamp, 1);
    }
}
