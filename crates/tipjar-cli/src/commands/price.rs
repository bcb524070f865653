use anyhow::Result;
use tipjar_core::config::PriceFeedConfig;
use tipjar_core::price::PriceFeed;
use tipjar_interaction::CoinGeckoPriceFeed;

pub async fn fetch(config: &PriceFeedConfig) -> Result<()> {
    let feed = CoinGeckoPriceFeed::new(config);
    let currency = config.vs_currency.to_uppercase();
    match feed.fetch_rate().await {
        Ok(rate) => println!("1 {} = {:.2} {}", config.asset_id, rate, currency),
        Err(e) => {
            tracing::warn!("Price feed unavailable: {}", e);
            println!(
                "1 {} = {:.2} {} (fallback)",
                config.asset_id, config.fallback_rate, currency
            );
        }
    }
    Ok(())
}
