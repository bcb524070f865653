use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DonationKey, FeedEntry};
use crate::format::{format_ether, format_fiat, relative_time};
use crate::ledger::Address;

/// Decimals shown for donation amounts.
const AMOUNT_DECIMALS: u32 = 6;

/// Display model of one retained tip. Rebuilt on every render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub key: DonationKey,
    pub address: Address,
    pub short_address: String,
    /// Ether amount, six decimals.
    pub amount: String,
    /// Fiat amount, two decimals; absent until a rate is known.
    pub usd_amount: Option<String>,
    pub time: String,
    pub message: Option<String>,
    pub is_new: bool,
}

impl Donation {
    pub fn render(entry: &FeedEntry, usd_rate: Option<f64>, now: DateTime<Utc>) -> Self {
        let tip = &entry.tip;
        Self {
            key: entry.key(),
            address: tip.sender.clone(),
            short_address: tip.sender.short(),
            amount: format_ether(tip.amount, AMOUNT_DECIMALS),
            usd_amount: usd_rate.map(|rate| format_fiat(tip.amount, rate)),
            time: relative_time(tip.timestamp, now),
            message: (!tip.message.is_empty()).then(|| tip.message.clone()),
            is_new: entry.is_new,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Tip, Wei};
    use chrono::TimeZone;

    #[test]
    fn test_render_formats_fields() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let entry = FeedEntry::arrived(Tip {
            sender: "0x1234567890abcdef1234567890abcdef12345678".parse().unwrap(),
            amount: Wei(2_500_000_000_000_000),
            message: String::new(),
            timestamp: 1_700_000_000 - 120,
        });

        let donation = Donation::render(&entry, Some(2000.0), now);
        assert_eq!(donation.short_address, "0x12...5678");
        assert_eq!(donation.amount, "0.002500");
        assert_eq!(donation.usd_amount.as_deref(), Some("5.00"));
        assert_eq!(donation.time, "2 minutes ago");
        assert_eq!(donation.message, None);
        assert!(donation.is_new);

        let without_rate = Donation::render(&entry, None, now);
        assert_eq!(without_rate.usd_amount, None);
    }
}
