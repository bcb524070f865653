//! Handle availability checks and profile creation.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use tipjar_core::config::ProfileConfig;
use tipjar_core::handle::{Handle, normalize_handle};
use tipjar_core::ledger::{
    Address, CallRequest, ContractCall, LedgerReader, ProfileSummary, TransactionStatus,
    TxReceipt, WalletSession, Wei,
};
use tipjar_core::{Result, TipjarError};

use crate::debounce::Debouncer;
use crate::transaction::TransactionTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleAvailability {
    /// Too short or too long.
    Invalid,
    Taken,
    Available,
}

/// Latest state of the claim form's availability hint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HandleCheck {
    pub handle: String,
    /// `None` while the check is pending (or for empty input).
    pub availability: Option<HandleAvailability>,
}

/// Claim form backend: normalizes input, checks availability after a quiet
/// period, and creates the profile.
pub struct HandleClaimService {
    ledger: Arc<dyn LedgerReader>,
    wallet: Arc<dyn WalletSession>,
    registry: Address,
    creation_fee: Wei,
    check: Arc<watch::Sender<HandleCheck>>,
    checks: Debouncer<String>,
    tracker: TransactionTracker,
    cancel: CancellationToken,
}

impl HandleClaimService {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        wallet: Arc<dyn WalletSession>,
        registry: Address,
        config: &ProfileConfig,
    ) -> Self {
        let check = Arc::new(watch::Sender::new(HandleCheck::default()));
        let cancel = CancellationToken::new();

        let publish = Arc::clone(&check);
        let reader = Arc::clone(&ledger);
        let (checks, _) = Debouncer::<String>::spawn(
            Duration::from_millis(config.handle_check_debounce_ms),
            cancel.clone(),
            move |mut inputs| {
                let publish = Arc::clone(&publish);
                let reader = Arc::clone(&reader);
                // Only the latest input of a burst is queried.
                let handle = inputs.pop().unwrap_or_default();
                async move {
                    let availability = match availability_of(reader.as_ref(), &handle).await {
                        Ok(availability) => availability,
                        Err(e) => {
                            tracing::warn!("Availability check for '{}' failed: {}", handle, e);
                            return;
                        }
                    };
                    // A newer input may have arrived while the lookup ran.
                    publish.send_if_modified(|current| {
                        if current.handle != handle {
                            return false;
                        }
                        current.availability = Some(availability);
                        true
                    });
                }
            },
        );

        Self {
            ledger,
            wallet,
            registry,
            creation_fee: config.creation_fee(),
            check,
            checks,
            tracker: TransactionTracker::new(),
            cancel,
        }
    }

    /// Takes raw form input, returns its normalized form and schedules a
    /// debounced availability check.
    pub fn input(&self, raw: &str) -> String {
        let handle = normalize_handle(raw);
        let availability = if handle.is_empty() {
            None
        } else if Handle::parse(&handle).is_err() {
            Some(HandleAvailability::Invalid)
        } else {
            self.checks.push(handle.clone());
            None
        };
        self.check.send_replace(HandleCheck {
            handle: handle.clone(),
            availability,
        });
        handle
    }

    pub fn subscribe(&self) -> watch::Receiver<HandleCheck> {
        self.check.subscribe()
    }

    pub fn current(&self) -> HandleCheck {
        self.check.borrow().clone()
    }

    /// Immediate availability lookup, bypassing the debounce.
    pub async fn check(&self, raw: &str) -> Result<HandleAvailability> {
        availability_of(self.ledger.as_ref(), &normalize_handle(raw)).await
    }

    /// Creates the profile for `raw` with the connected signer as owner.
    pub async fn claim(&self, raw: &str) -> Result<TxReceipt> {
        let handle = Handle::parse(&normalize_handle(raw))?;
        if self.wallet.active_account().is_none() {
            return Err(TipjarError::unauthorized("connect a wallet to claim a handle"));
        }
        if availability_of(self.ledger.as_ref(), handle.as_str()).await?
            != HandleAvailability::Available
        {
            return Err(TipjarError::validation(format!(
                "handle '{}' is already taken",
                handle
            )));
        }

        let request = CallRequest::new(
            self.registry.clone(),
            ContractCall::CreateProfile {
                username: handle.to_string(),
                about_me: String::new(),
                social_profiles: Vec::new(),
            },
        )
        .with_value(self.creation_fee);
        tracing::info!("Claiming handle '{}'", handle);
        self.tracker.track(self.wallet.submit(vec![request])).await
    }

    pub fn status(&self) -> TransactionStatus {
        self.tracker.status()
    }

    /// Recently created profiles, newest first.
    pub async fn latest_profiles(&self) -> Result<Vec<ProfileSummary>> {
        self.ledger.latest_profiles().await
    }
}

impl Drop for HandleClaimService {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn availability_of(ledger: &dyn LedgerReader, handle: &str) -> Result<HandleAvailability> {
    if Handle::parse(handle).is_err() {
        return Ok(HandleAvailability::Invalid);
    }
    let address = ledger.profile_address(handle).await?;
    Ok(if address.is_zero() {
        HandleAvailability::Available
    } else {
        HandleAvailability::Taken
    })
}
