//! Ledger read/write seams.
//!
//! The registry, the per-profile contracts and the wallet are external
//! collaborators; these traits are the only way the rest of the workspace
//! reaches them.

pub mod call;
pub mod model;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;

pub use call::{CallRequest, ContractCall};
pub use model::{
    Address, ProfileRecord, ProfileSummary, RawTip, Tip, TipEvent, TransactionStatus, TxReceipt,
    Wei,
};

/// Live `TipReceived` logs for one profile. Ends when the subscription drops.
pub type TipStream = BoxStream<'static, TipEvent>;

/// Read side of the ledger: registry lookups, profile records and events.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Registry lookup `getProfileByUsername(handle)`.
    ///
    /// Returns the zero address when no profile is registered.
    async fn profile_address(&self, handle: &str) -> Result<Address>;

    /// `getProfileDetails()` on the profile contract.
    async fn profile_details(&self, profile: &Address) -> Result<ProfileRecord>;

    /// `owner()` on the profile contract.
    async fn owner(&self, profile: &Address) -> Result<Address>;

    /// Native balance held by the profile contract.
    async fn balance(&self, profile: &Address) -> Result<Wei>;

    /// Registry listing `getProfiles()`.
    async fn latest_profiles(&self) -> Result<Vec<ProfileSummary>>;

    /// Subscribes to `TipReceived` on the profile contract.
    async fn subscribe_tips(&self, profile: &Address) -> Result<TipStream>;
}

/// The connected wallet: signer identity and transaction submission.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Currently connected account, if any.
    fn active_account(&self) -> Option<Address>;

    /// Signs and submits the calls as one batch and waits for confirmation.
    async fn submit(&self, calls: Vec<CallRequest>) -> Result<TxReceipt>;
}
