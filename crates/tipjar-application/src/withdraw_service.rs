//! Withdrawal of accumulated tips by the profile owner.

use std::sync::Arc;

use serde::Serialize;

use tipjar_core::format::{ETHER_DECIMALS, format_ether, format_fiat};
use tipjar_core::ledger::{
    Address, CallRequest, ContractCall, LedgerReader, TransactionStatus, TxReceipt,
    WalletSession, Wei,
};
use tipjar_core::{Result, TipjarError};

use crate::transaction::TransactionTracker;

/// Shown in place of the fiat value while no rate is known.
pub const FIAT_UNAVAILABLE: &str = "N/A";

/// What the withdraw dialog displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawSummary {
    pub balance: Wei,
    /// Exact ether amount without trailing zeros.
    pub ether: String,
    pub fiat: String,
    pub can_withdraw: bool,
}

pub struct WithdrawService {
    ledger: Arc<dyn LedgerReader>,
    wallet: Arc<dyn WalletSession>,
    profile: Address,
    tracker: TransactionTracker,
}

impl WithdrawService {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        wallet: Arc<dyn WalletSession>,
        profile: Address,
    ) -> Self {
        Self {
            ledger,
            wallet,
            profile,
            tracker: TransactionTracker::new(),
        }
    }

    pub async fn summary(&self, usd_rate: Option<f64>) -> Result<WithdrawSummary> {
        let (balance, owner) = tokio::try_join!(
            self.ledger.balance(&self.profile),
            self.ledger.owner(&self.profile)
        )?;
        let is_owner = self.wallet.active_account().as_ref() == Some(&owner);

        Ok(WithdrawSummary {
            balance,
            ether: trim_ether(&format_ether(balance, ETHER_DECIMALS)),
            fiat: usd_rate
                .map(|rate| format_fiat(balance, rate))
                .unwrap_or_else(|| FIAT_UNAVAILABLE.to_string()),
            can_withdraw: is_owner && !balance.is_zero(),
        })
    }

    /// Moves the whole balance to the owner.
    pub async fn withdraw(&self) -> Result<TxReceipt> {
        let signer = self
            .wallet
            .active_account()
            .ok_or_else(|| TipjarError::unauthorized("no wallet connected"))?;
        let owner = self.ledger.owner(&self.profile).await?;
        if signer != owner {
            return Err(TipjarError::unauthorized(format!(
                "only the owner of {} can withdraw",
                self.profile
            )));
        }
        if self.ledger.balance(&self.profile).await?.is_zero() {
            return Err(TipjarError::validation("nothing to withdraw"));
        }

        let request = CallRequest::new(self.profile.clone(), ContractCall::Withdraw);
        self.tracker.track(self.wallet.submit(vec![request])).await
    }

    pub fn status(&self) -> TransactionStatus {
        self.tracker.status()
    }
}

fn trim_ether(value: &str) -> String {
    let trimmed = value.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_ether() {
        assert_eq!(trim_ether("1.500000000000000000"), "1.5");
        assert_eq!(trim_ether("0.000000000000000000"), "0");
        assert_eq!(trim_ether("12.000000000000000000"), "12");
    }
}
