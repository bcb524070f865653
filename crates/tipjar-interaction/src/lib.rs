pub mod coingecko_price_feed;
pub mod pinata_content_store;

pub use coingecko_price_feed::CoinGeckoPriceFeed;
pub use pinata_content_store::PinataContentStore;

use tipjar_core::TipjarError;

/// Maps a transport-level reqwest failure, keeping the status when present.
pub(crate) fn network_error(context: &str, e: reqwest::Error) -> TipjarError {
    match e.status() {
        Some(status) => TipjarError::http_status(status.as_u16(), format!("{}: {}", context, e)),
        None => TipjarError::network(format!("{}: {}", context, e)),
    }
}
