//! Display formatting for amounts, fiat values and times.
//!
//! Amount formatting is exact integer arithmetic on wei; only the fiat
//! conversion goes through `f64`.

use chrono::{DateTime, Utc};

use crate::error::{Result, TipjarError};
use crate::ledger::Wei;

/// Decimals of the native asset.
pub const ETHER_DECIMALS: u32 = 18;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Formats a wei amount as ether rounded half-up to `decimals` places.
pub fn format_ether(amount: Wei, decimals: u32) -> String {
    let decimals = decimals.min(ETHER_DECIMALS);
    let scale = 10u128.pow(ETHER_DECIMALS - decimals);
    let round_up = scale > 1 && amount.0 % scale >= scale / 2;
    let scaled = amount.0 / scale + u128::from(round_up);

    if decimals == 0 {
        return scaled.to_string();
    }

    let unit = 10u128.pow(decimals);
    format!(
        "{}.{:0width$}",
        scaled / unit,
        scaled % unit,
        width = decimals as usize
    )
}

/// Parses a decimal ether string (`"0.0001"`, `"2"`) into wei.
pub fn parse_ether(value: &str) -> Result<Wei> {
    let value = value.trim();
    let invalid = || TipjarError::validation(format!("invalid ether amount '{value}'"));

    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (value, ""),
    };

    if (int_part.is_empty() && frac_part.is_empty())
        || !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
        || frac_part.len() > ETHER_DECIMALS as usize
    {
        return Err(invalid());
    }

    let whole = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<u128>().map_err(|_| invalid())?
    };
    let fraction = if frac_part.is_empty() {
        0
    } else {
        let padding = 10u128.pow(ETHER_DECIMALS - frac_part.len() as u32);
        frac_part.parse::<u128>().map_err(|_| invalid())? * padding
    };

    whole
        .checked_mul(WEI_PER_ETHER)
        .and_then(|w| w.checked_add(fraction))
        .map(Wei)
        .ok_or_else(invalid)
}

/// Lossy conversion used only for fiat display.
pub fn ether_f64(amount: Wei) -> f64 {
    amount.0 as f64 / WEI_PER_ETHER as f64
}

/// Fiat value of `amount` at `rate`, two decimals.
pub fn format_fiat(amount: Wei, rate: f64) -> String {
    format!("{:.2}", ether_f64(amount) * rate)
}

/// Human distance between `timestamp` and `now`, suffixed with "ago".
///
/// Thresholds follow the usual "less than a minute / about N hours /
/// N days" ladder. Timestamps in the future read as "just now".
pub fn relative_time(timestamp: u64, now: DateTime<Utc>) -> String {
    let Some(seconds) = i64::try_from(timestamp)
        .ok()
        .and_then(|t| now.timestamp().checked_sub(t))
    else {
        return "just now".to_string();
    };
    if seconds < 0 {
        return "just now".to_string();
    }

    let minutes = (seconds as f64 / 60.0).round() as i64;
    let distance = if seconds < 30 {
        "less than a minute".to_string()
    } else if minutes <= 1 {
        "1 minute".to_string()
    } else if minutes < 45 {
        format!("{minutes} minutes")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < 1440 {
        format!("about {} hours", (minutes as f64 / 60.0).round() as i64)
    } else if minutes < 2520 {
        "1 day".to_string()
    } else if minutes < 43_200 {
        format!("{} days", (minutes as f64 / 1440.0).round() as i64)
    } else if minutes < 86_400 {
        let months = (minutes as f64 / 43_200.0).round() as i64;
        if months <= 1 {
            "about 1 month".to_string()
        } else {
            format!("about {months} months")
        }
    } else if minutes < 525_600 {
        format!("{} months", (minutes as f64 / 43_200.0).round() as i64)
    } else {
        let years = minutes / 525_600;
        if years == 1 {
            "about 1 year".to_string()
        } else {
            format!("about {years} years")
        }
    };

    format!("{distance} ago")
}

/// "Month YYYY" of a unix timestamp, as shown next to "Joined".
pub fn format_month_year(timestamp: u64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%B %Y").to_string())
        .unwrap_or_default()
}

/// Uppercases the first character.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
