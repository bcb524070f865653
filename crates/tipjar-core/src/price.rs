//! Fiat price feed seam.

use async_trait::async_trait;

use crate::error::Result;

/// Source of the native asset's exchange rate.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetches one exchange rate (fiat units per ether).
    async fn fetch_rate(&self) -> Result<f64>;
}
