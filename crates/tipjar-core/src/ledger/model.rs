//! Ledger-facing data: identities, amounts, profile records and tips.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TipjarError};

const ADDRESS_HEX_LEN: usize = 40;

/// A 20-byte account identity in its `0x`-prefixed hex form.
///
/// Stored lowercase so comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The zero address. The registry returns it for unknown handles.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(ADDRESS_HEX_LEN)))
    }

    pub fn is_zero(&self) -> bool {
        self.0[2..].bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form used in feeds: first four and last four characters.
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..4], &self.0[self.0.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = TipjarError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| TipjarError::validation(format!("address '{s}' lacks 0x prefix")))?;

        if hex.len() != ADDRESS_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TipjarError::validation(format!(
                "address '{s}' must be {ADDRESS_HEX_LEN} hex digits"
            )));
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for Address {
    type Error = TipjarError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Native asset amount in wei (10^-18 ETH).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Wei) -> Option<Wei> {
        self.0.checked_add(other.0).map(Wei)
    }

    pub fn checked_sub(self, other: Wei) -> Option<Wei> {
        self.0.checked_sub(other.0).map(Wei)
    }
}

impl FromStr for Wei {
    type Err = TipjarError;

    /// Parses a base-10 integer amount as delivered by the ledger.
    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u128>()
            .map(Wei)
            .map_err(|e| TipjarError::validation(format!("invalid wei amount '{s}': {e}")))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tip exactly as the contract returns it inside `getProfileDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTip {
    pub value: String,
    pub from: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: u64,
}

/// An immutable, validated tip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tip {
    pub sender: Address,
    pub amount: Wei,
    pub message: String,
    /// Unix seconds of the block that recorded the tip.
    pub timestamp: u64,
}

impl TryFrom<RawTip> for Tip {
    type Error = TipjarError;

    fn try_from(raw: RawTip) -> Result<Self> {
        Ok(Self {
            sender: raw.from.parse()?,
            amount: raw.value.parse()?,
            message: raw.message,
            timestamp: raw.timestamp,
        })
    }
}

/// A `TipReceived(from, amount, message)` log delivered by the live subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipEvent {
    pub from: String,
    pub amount: String,
    pub message: String,
    /// Timestamp of the block carrying the log.
    pub block_timestamp: u64,
}

impl TryFrom<TipEvent> for Tip {
    type Error = TipjarError;

    fn try_from(event: TipEvent) -> Result<Self> {
        Ok(Self {
            sender: event.from.parse()?,
            amount: event.amount.parse()?,
            message: event.message,
            timestamp: event.block_timestamp,
        })
    }
}

/// Structured result of `getProfileDetails()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub username: String,
    pub about_me: String,
    pub profile_picture: String,
    pub banner_picture: String,
    pub location: String,
    pub social_profiles: Vec<String>,
    pub recent_tips: Vec<RawTip>,
    pub total_tips: Wei,
    /// Unix seconds.
    pub created: u64,
}

/// Entry of the registry's `getProfiles()` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub created: u64,
}

/// Confirmation of a submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub call_count: usize,
}

/// Lifecycle of one submission as shown next to its button.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Idle,
    Pending,
    Success { transaction_hash: String },
    Error { message: String },
}

impl TransactionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}
