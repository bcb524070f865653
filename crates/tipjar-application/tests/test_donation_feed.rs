mod common;

use std::time::Duration;

use tokio::time::sleep;

use common::{Chain, FlakyLedger, fan, owner};
use tipjar_application::donation_feed_service::MIN_SNAPSHOT_INTERVAL;
use tipjar_application::{DonationFeedService, FeedSettings};
use tipjar_core::config::FeedConfig;

const CENT_ETHER: u128 = 10_000_000_000_000_000;

fn settings() -> FeedSettings {
    FeedSettings {
        capacity: 50,
        page_size: 5,
        debounce: Duration::from_millis(100),
        highlight: Duration::from_millis(500),
        snapshot_interval: Duration::from_secs(4),
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_bulk_reads_merges_once() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    chain.tip(fan(), &profile, CENT_ETHER, "first").await;

    let feed = DonationFeedService::start(chain.ledger.clone(), profile, settings());
    let revisions = feed.subscribe();
    feed.refresh();
    feed.refresh();

    sleep(Duration::from_millis(50)).await;
    assert_eq!(*revisions.borrow(), 0, "Should wait for the quiet window");

    sleep(Duration::from_millis(150)).await;
    assert_eq!(*revisions.borrow(), 1, "Should merge the burst once");
    assert_eq!(feed.len().await, 1);
    assert!(!feed.entries().await[0].is_new);
}

#[tokio::test(start_paused = true)]
async fn test_live_tip_is_highlighted_then_settles() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    let feed = DonationFeedService::start(chain.ledger.clone(), profile.clone(), settings());
    sleep(Duration::from_millis(150)).await;
    assert!(feed.is_empty().await);

    chain.tip(fan(), &profile, CENT_ETHER, "go go").await;
    sleep(Duration::from_millis(10)).await;

    let entries = feed.entries().await;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_new, "Should flag a live arrival as new");
    assert_eq!(entries[0].tip.message, "go go");

    sleep(Duration::from_millis(600)).await;
    assert!(!feed.entries().await[0].is_new, "Should clear the flag");

    // The next bulk read carries the same tip; it must not duplicate.
    sleep(Duration::from_secs(4)).await;
    assert_eq!(feed.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_ended_subscription_falls_back_to_bulk_reads() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    let feed = DonationFeedService::start(chain.ledger.clone(), profile.clone(), settings());
    sleep(Duration::from_millis(150)).await;

    chain.ledger.close_subscriptions(&profile);
    sleep(Duration::from_millis(10)).await;
    chain.tip(fan(), &profile, CENT_ETHER, "late").await;
    sleep(Duration::from_millis(10)).await;
    assert!(feed.is_empty().await);

    sleep(Duration::from_millis(4200)).await;
    let entries = feed.entries().await;
    assert_eq!(entries.len(), 1, "Should pick the tip up from a bulk read");
    assert!(!entries[0].is_new);
}

#[tokio::test(start_paused = true)]
async fn test_failed_bulk_read_keeps_feed() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    chain.tip(fan(), &profile, CENT_ETHER, "one").await;
    chain.tip(fan(), &profile, CENT_ETHER, "two").await;

    let flaky = FlakyLedger::new(chain.ledger.clone());
    let feed = DonationFeedService::start(flaky.clone(), profile, settings());
    sleep(Duration::from_millis(150)).await;
    assert_eq!(feed.len().await, 2);

    flaky.set_failing(true);
    feed.refresh();
    sleep(Duration::from_millis(4500)).await;
    assert_eq!(feed.len().await, 2, "Should keep entries while reads fail");
}

#[tokio::test(start_paused = true)]
async fn test_pagination_over_twelve_donations() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    for i in 0..12 {
        chain
            .tip(fan(), &profile, CENT_ETHER, &format!("tip {i}"))
            .await;
    }

    let feed = DonationFeedService::start(chain.ledger.clone(), profile, settings());
    sleep(Duration::from_millis(150)).await;
    assert_eq!(feed.len().await, 12);
    assert_eq!(feed.page_info().await, (1, 3));

    let first = feed.current_page(Some(2000.0)).await;
    assert_eq!(first.len(), 5);
    assert_eq!(first[0].message.as_deref(), Some("tip 11"), "Newest first");
    assert!(first[0].usd_amount.is_some());

    feed.next_page().await;
    feed.next_page().await;
    feed.next_page().await;
    assert_eq!(feed.page_info().await, (3, 3), "Should stop at the last page");
    let last = feed.current_page(None).await;
    assert_eq!(last.len(), 2);
    assert!(last[0].usd_amount.is_none());

    feed.go_to_page(1).await;
    feed.previous_page().await;
    assert_eq!(feed.page_info().await, (1, 3));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_updates() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    let feed = DonationFeedService::start(chain.ledger.clone(), profile.clone(), settings());
    sleep(Duration::from_millis(150)).await;

    feed.shutdown();
    sleep(Duration::from_millis(10)).await;
    chain.tip(fan(), &profile, CENT_ETHER, "ignored").await;
    sleep(Duration::from_secs(5)).await;
    assert!(feed.is_empty().await);
}

#[test]
fn test_zero_interval_from_config_is_raised() {
    let config = FeedConfig {
        snapshot_interval_secs: 0,
        ..FeedConfig::default()
    };
    assert_eq!(
        FeedSettings::from(&config).snapshot_interval,
        MIN_SNAPSHOT_INTERVAL
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_still_reads_snapshots() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    chain.tip(fan(), &profile, CENT_ETHER, "early").await;

    let zero = FeedSettings {
        snapshot_interval: Duration::ZERO,
        ..settings()
    };
    let feed = DonationFeedService::start(chain.ledger.clone(), profile.clone(), zero);
    sleep(Duration::from_millis(150)).await;
    assert_eq!(feed.len().await, 1, "Should run the first bulk read");

    chain.ledger.close_subscriptions(&profile);
    sleep(Duration::from_millis(10)).await;
    chain.tip(fan(), &profile, CENT_ETHER, "later").await;
    sleep(Duration::from_millis(1200)).await;
    assert_eq!(feed.len().await, 2, "Should keep polling at the minimum interval");
}
