//! Profile resolution and the profile page view.

use std::sync::Arc;

use tokio::sync::RwLock;

use tipjar_core::Result;
use tipjar_core::ledger::{Address, LedgerReader, WalletSession};
use tipjar_core::profile::{Profile, ProfileView};

/// Resolves handles and builds [`ProfileView`]s for the connected signer.
pub struct ProfilePageService {
    ledger: Arc<dyn LedgerReader>,
    wallet: Arc<dyn WalletSession>,
    /// Last successfully built view, served when a refresh fails.
    last_view: RwLock<Option<ProfileView>>,
}

impl ProfilePageService {
    pub fn new(ledger: Arc<dyn LedgerReader>, wallet: Arc<dyn WalletSession>) -> Self {
        Self {
            ledger,
            wallet,
            last_view: RwLock::new(None),
        }
    }

    /// Registry lookup; `None` when the handle is unclaimed.
    pub async fn resolve(&self, handle: &str) -> Result<Option<Address>> {
        let address = self.ledger.profile_address(handle).await?;
        Ok((!address.is_zero()).then_some(address))
    }

    /// Resolves and reads the profile; details and owner are read concurrently.
    pub async fn load_profile(&self, handle: &str) -> Result<Option<Profile>> {
        let Some(address) = self.resolve(handle).await? else {
            tracing::debug!("No profile registered for '{}'", handle);
            return Ok(None);
        };

        let (record, owner) = tokio::try_join!(
            self.ledger.profile_details(&address),
            self.ledger.owner(&address)
        )?;
        Ok(Some(Profile {
            address,
            owner,
            record,
        }))
    }

    /// Builds the page view, remembering it as the last good one.
    pub async fn load(&self, handle: &str) -> Result<Option<ProfileView>> {
        let Some(profile) = self.load_profile(handle).await? else {
            *self.last_view.write().await = None;
            return Ok(None);
        };

        let viewer = self.wallet.active_account();
        let view = ProfileView::build(&profile, viewer.as_ref());
        *self.last_view.write().await = Some(view.clone());
        Ok(Some(view))
    }

    /// Like [`load`](Self::load), but a failed read falls back to the last
    /// good view of the same handle.
    pub async fn refresh(&self, handle: &str) -> Result<Option<ProfileView>> {
        match self.load(handle).await {
            Ok(view) => Ok(view),
            Err(e) => {
                let last = self.last_view.read().await.clone();
                match last.filter(|view| view.handle == handle) {
                    Some(view) => {
                        tracing::warn!("Refresh of '{}' failed, showing stale view: {}", handle, e);
                        Ok(Some(view))
                    }
                    None => Err(e),
                }
            }
        }
    }

    pub async fn last_view(&self) -> Option<ProfileView> {
        self.last_view.read().await.clone()
    }
}
