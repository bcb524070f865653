//! Configuration model.
//!
//! Every section has defaults so a partial (or missing) `config.toml`
//! yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::feed::{FEED_CAPACITY, PAGE_SIZE};
use crate::image::ImageBounds;
use crate::ledger::Wei;

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    pub network: NetworkConfig,
    pub price_feed: PriceFeedConfig,
    pub content_store: ContentStoreConfig,
    pub feed: FeedConfig,
    pub profile: ProfileConfig,
    pub images: ImagesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Registry contract; empty until deployed.
    pub registry_address: String,
    pub chain_id: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            registry_address: String::new(),
            chain_id: 84532,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceFeedConfig {
    pub endpoint: String,
    pub asset_id: String,
    pub vs_currency: String,
    /// Poll interval on profile pages.
    pub page_interval_secs: u64,
    /// Poll interval inside the tipping widget.
    pub widget_interval_secs: u64,
    pub fallback_rate: f64,
    pub timeout_secs: u64,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.coingecko.com/api/v3".to_string(),
            asset_id: "ethereum".to_string(),
            vs_currency: "usd".to_string(),
            page_interval_secs: 60,
            widget_interval_secs: 120,
            fallback_rate: crate::tipping::FALLBACK_USD_RATE,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStoreConfig {
    pub endpoint: String,
    pub gateway_url: String,
    pub timeout_secs: u64,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.pinata.cloud/pinning/pinFileToIPFS".to_string(),
            gateway_url: "https://gateway.pinata.cloud".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub capacity: usize,
    pub page_size: usize,
    pub debounce_ms: u64,
    pub highlight_ms: u64,
    pub snapshot_interval_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: FEED_CAPACITY,
            page_size: PAGE_SIZE,
            debounce_ms: 100,
            highlight_ms: 500,
            snapshot_interval_secs: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Fee sent with `createProfile`, in wei.
    pub creation_fee_wei: u128,
    pub handle_check_debounce_ms: u64,
}

impl ProfileConfig {
    pub fn creation_fee(&self) -> Wei {
        Wei(self.creation_fee_wei)
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            creation_fee_wei: 100_000_000_000_000,
            handle_check_debounce_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub avatar: ImageBounds,
    pub banner: ImageBounds,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            avatar: ImageBounds::AVATAR,
            banner: ImageBounds::BANNER,
        }
    }
}

impl ImagesConfig {
    pub fn bounds(&self, kind: crate::image::ImageKind) -> ImageBounds {
        match kind {
            crate::image::ImageKind::Avatar => self.avatar,
            crate::image::ImageKind::Banner => self.banner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub pinata: Option<PinataConfig>,
}

/// Pinata API credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinataConfig {
    pub api_key: String,
    pub secret_api_key: String,
}

impl std::fmt::Debug for PinataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataConfig")
            .field("api_key", &"***")
            .field("secret_api_key", &"***")
            .finish()
    }
}
