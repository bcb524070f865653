//! End-to-end walk through the client flows on an in-memory ledger.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;

use tipjar_application::{
    DonationFeedService, FeedSettings, HandleClaimService, PricePoller, ProfilePageService,
    TipService, WithdrawService,
};
use tipjar_core::config::RootConfig;
use tipjar_core::handle::normalize_handle;
use tipjar_core::ledger::Address;
use tipjar_core::tipping::{STANDARD_AMOUNTS, TipComposer};
use tipjar_infrastructure::InMemoryLedger;
use tipjar_interaction::CoinGeckoPriceFeed;

const LOCAL_REGISTRY: &str = "0x00000000000000000000000000000000000000ff";
const CREATOR: &str = "0x000000000000000000000000000000000000c0de";
const FAN: &str = "0x000000000000000000000000000000000000f00d";

pub async fn run(
    config: &RootConfig,
    raw_handle: &str,
    tips: usize,
    live_price: bool,
) -> Result<()> {
    let registry: Address = if config.network.registry_address.is_empty() {
        LOCAL_REGISTRY.parse()?
    } else {
        config.network.registry_address.parse()?
    };
    let creator: Address = CREATOR.parse()?;
    let fan: Address = FAN.parse()?;
    let handle = normalize_handle(raw_handle);

    let ledger = Arc::new(InMemoryLedger::new(
        registry.clone(),
        config.profile.creation_fee(),
    ));

    let poller = live_price.then(|| {
        PricePoller::spawn(
            Arc::new(CoinGeckoPriceFeed::new(&config.price_feed)),
            Duration::from_secs(config.price_feed.widget_interval_secs),
        )
    });
    let rates = match &poller {
        Some(poller) => {
            let mut first = poller.subscribe();
            let wait = Duration::from_secs(config.price_feed.timeout_secs);
            if tokio::time::timeout(wait, first.changed()).await.is_err() {
                tracing::warn!("No live rate yet, using the fallback");
            }
            poller.subscribe()
        }
        None => watch::channel(None).1,
    };

    ledger.connect(Some(creator.clone()));
    let claims = HandleClaimService::new(ledger.clone(), ledger.clone(), registry, &config.profile);
    let receipt = claims.claim(&handle).await?;
    println!("Claimed '{}' in {}", handle, receipt.transaction_hash);

    let pages = ProfilePageService::new(ledger.clone(), ledger.clone());
    let profile = pages
        .resolve(&handle)
        .await?
        .with_context(|| format!("'{}' did not resolve after claiming", handle))?;

    let feed = DonationFeedService::start(
        ledger.clone(),
        profile.clone(),
        FeedSettings::from(&config.feed),
    );
    let tipping = TipService::new(
        ledger.clone(),
        profile.clone(),
        rates,
        config.price_feed.fallback_rate,
    );
    let rate = tipping.current_rate();

    ledger.connect(Some(fan));
    for (i, amount) in STANDARD_AMOUNTS.iter().cycle().take(tips).enumerate() {
        let mut composer = TipComposer::new();
        composer.select(*amount);
        composer.set_message(&format!("Tip #{}", i + 1));
        tipping.send(&composer).await?;
    }
    feed.refresh();
    tokio::time::sleep(Duration::from_millis(config.feed.debounce_ms * 2)).await;

    ledger.connect(Some(creator.clone()));
    if let Some(view) = pages.load(&handle).await? {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    let (page, pages_total) = feed.page_info().await;
    println!("Donations, page {} of {}:", page, pages_total);
    for donation in feed.current_page(Some(rate)).await {
        println!(
            "  {} sent {} ETH (${}) {}: {}",
            donation.short_address,
            donation.amount,
            donation.usd_amount.unwrap_or_default(),
            donation.time,
            donation.message.unwrap_or_default()
        );
    }

    let withdrawals = WithdrawService::new(ledger.clone(), ledger.clone(), profile);
    let summary = withdrawals.summary(Some(rate)).await?;
    if summary.can_withdraw {
        withdrawals.withdraw().await?;
        println!(
            "Withdrew {} ETH (${}) to {}",
            summary.ether, summary.fiat, creator
        );
    }

    feed.shutdown();
    if let Some(poller) = poller {
        poller.shutdown();
    }
    Ok(())
}
