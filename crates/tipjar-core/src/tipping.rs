//! Tip composition: fiat amount selection, message, conversion to wei.

use serde::Serialize;

use crate::error::{Result, TipjarError};
use crate::format::parse_ether;
use crate::ledger::{Address, CallRequest, ContractCall, Wei};

/// Preset fiat amounts offered by the tipping widget.
pub const STANDARD_AMOUNTS: [u32; 4] = [5, 10, 25, 50];
/// Message length limit, in characters.
pub const MAX_TIP_MESSAGE_CHARS: usize = 90;

/// Rate used until the price feed answers once.
pub const FALLBACK_USD_RATE: f64 = 2000.0;

/// State of the tipping widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TipComposer {
    selected: Option<u32>,
    custom: String,
    message: String,
}

impl TipComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks a preset; clears any custom amount.
    pub fn select(&mut self, amount: u32) {
        self.selected = Some(amount);
        self.custom.clear();
    }

    /// Types a custom amount; clears the preset.
    pub fn set_custom(&mut self, value: &str) {
        self.selected = None;
        self.custom = value.trim().to_string();
    }

    /// Updates the message. Input longer than the limit is rejected whole,
    /// leaving the previous message in place.
    pub fn set_message(&mut self, value: &str) -> bool {
        if value.chars().count() > MAX_TIP_MESSAGE_CHARS {
            return false;
        }
        self.message = value.to_string();
        true
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Fiat amount currently chosen, zero when nothing valid is set.
    pub fn usd_amount(&self) -> f64 {
        match self.selected {
            Some(amount) => f64::from(amount),
            None => self
                .custom
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(0.0),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.usd_amount() > 0.0
    }

    /// Wei equivalent of the chosen fiat amount at `usd_rate`.
    pub fn wei_amount(&self, usd_rate: f64) -> Result<Wei> {
        usd_to_wei(self.usd_amount(), usd_rate)
    }

    /// The `addTip(message)` call carrying the converted value.
    pub fn build_call(&self, profile: &Address, usd_rate: f64) -> Result<CallRequest> {
        if !self.is_valid() {
            return Err(TipjarError::validation("tip amount must be positive"));
        }
        let value = self.wei_amount(usd_rate)?;
        Ok(CallRequest::new(
            profile.clone(),
            ContractCall::AddTip {
                message: self.message.clone(),
            },
        )
        .with_value(value))
    }
}

/// Converts fiat to wei through an 18-decimal ether string.
pub fn usd_to_wei(usd: f64, usd_rate: f64) -> Result<Wei> {
    if !(usd_rate.is_finite() && usd_rate > 0.0) {
        return Err(TipjarError::validation(format!(
            "invalid exchange rate {usd_rate}"
        )));
    }
    if !(usd.is_finite() && usd >= 0.0) {
        return Err(TipjarError::validation(format!("invalid fiat amount {usd}")));
    }
    parse_ether(&format!("{:.18}", usd / usd_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Address {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    #[test]
    fn test_preset_and_custom_are_exclusive() {
        let mut composer = TipComposer::new();
        composer.select(25);
        assert_eq!(composer.usd_amount(), 25.0);

        composer.set_custom("7.5");
        assert_eq!(composer.usd_amount(), 7.5);

        composer.select(5);
        assert_eq!(composer.usd_amount(), 5.0);
    }

    #[test]
    fn test_invalid_custom_amount() {
        let mut composer = TipComposer::new();
        assert!(!composer.is_valid());
        composer.set_custom("-3");
        assert!(!composer.is_valid());
        composer.set_custom("abc");
        assert!(!composer.is_valid());
        assert!(composer.build_call(&profile(), 2000.0).is_err());
    }

    #[test]
    fn test_message_limit() {
        let mut composer = TipComposer::new();
        assert!(composer.set_message("thanks!"));
        assert!(!composer.set_message(&"a".repeat(MAX_TIP_MESSAGE_CHARS + 1)));
        assert_eq!(composer.message(), "thanks!");
    }

    #[test]
    fn test_wei_conversion() {
        let mut composer = TipComposer::new();
        composer.select(10);
        assert_eq!(
            composer.wei_amount(2000.0).unwrap(),
            Wei(5_000_000_000_000_000)
        );
        assert!(composer.wei_amount(0.0).is_err());
    }

    #[test]
    fn test_build_call_carries_value_and_message() {
        let mut composer = TipComposer::new();
        composer.select(50);
        composer.set_message("gm");
        let request = composer.build_call(&profile(), 2500.0).unwrap();
        assert_eq!(request.value, Wei(20_000_000_000_000_000));
        assert_eq!(
            request.call,
            ContractCall::AddTip {
                message: "gm".into()
            }
        );
    }
}
