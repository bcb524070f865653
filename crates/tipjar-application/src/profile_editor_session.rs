//! Profile editing: draft, image uploads, batched submission.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use tipjar_core::config::ImagesConfig;
use tipjar_core::content::ContentStore;
use tipjar_core::editor::{
    ImageSlot, ProfileDraft, ProfileSnapshot, ProfileUpdate, has_changes, is_ready, reconcile,
};
use tipjar_core::image::{ImageFile, ImageKind};
use tipjar_core::ledger::{
    Address, CallRequest, LedgerReader, TransactionStatus, TxReceipt, WalletSession,
};
use tipjar_core::{Result, TipjarError};
use tipjar_infrastructure::ImageResizer;

use crate::transaction::TransactionTracker;

/// Collaborators an editor session needs.
#[derive(Clone)]
pub struct EditorDeps {
    pub ledger: Arc<dyn LedgerReader>,
    pub wallet: Arc<dyn WalletSession>,
    pub store: Arc<dyn ContentStore>,
    pub resizer: ImageResizer,
    pub images: ImagesConfig,
}

struct EditorState {
    owner: Address,
    snapshot: ProfileSnapshot,
    draft: ProfileDraft,
}

/// An open editor for one profile.
pub struct ProfileEditorSession {
    deps: EditorDeps,
    profile: Address,
    state: Mutex<EditorState>,
    /// Serializes image uploads.
    uploads: Mutex<()>,
    tracker: TransactionTracker,
}

impl ProfileEditorSession {
    /// Reads the profile and captures the snapshot the draft is diffed against.
    pub async fn open(deps: EditorDeps, profile: Address) -> Result<Self> {
        let (record, owner) = tokio::try_join!(
            deps.ledger.profile_details(&profile),
            deps.ledger.owner(&profile)
        )?;
        let snapshot = ProfileSnapshot::from(&record);
        let draft = ProfileDraft::from_snapshot(&snapshot);
        tracing::debug!("Editor opened for {}", profile);

        Ok(Self {
            deps,
            profile,
            state: Mutex::new(EditorState {
                owner,
                snapshot,
                draft,
            }),
            uploads: Mutex::new(()),
            tracker: TransactionTracker::new(),
        })
    }

    pub fn profile(&self) -> &Address {
        &self.profile
    }

    pub async fn snapshot(&self) -> ProfileSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    pub async fn draft(&self) -> ProfileDraft {
        self.state.lock().await.draft.clone()
    }

    /// Applies an edit to the draft.
    pub async fn edit<R>(&self, change: impl FnOnce(&mut ProfileDraft) -> R) -> R {
        change(&mut self.state.lock().await.draft)
    }

    /// Updates a submit would send right now.
    pub async fn pending_updates(&self) -> Vec<ProfileUpdate> {
        let state = self.state.lock().await;
        reconcile(&state.snapshot, &state.draft)
    }

    pub async fn has_changes(&self) -> bool {
        let state = self.state.lock().await;
        has_changes(&state.snapshot, &state.draft)
    }

    pub async fn is_ready(&self) -> bool {
        let state = self.state.lock().await;
        is_ready(&state.snapshot, &state.draft)
    }

    pub fn status(&self) -> TransactionStatus {
        self.tracker.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TransactionStatus> {
        self.tracker.subscribe()
    }

    /// Resizes and uploads a newly selected image, returning its URI.
    ///
    /// The slot is `Uploading` meanwhile; on failure it becomes `Failed`,
    /// which keeps the submit gate closed until another image succeeds.
    pub async fn select_image(&self, kind: ImageKind, file: ImageFile) -> Result<String> {
        // Marked before queueing so a waiting selection already holds the gate.
        self.set_slot(kind, ImageSlot::Uploading).await;
        let _upload = self.uploads.lock().await;

        match self.resize_and_upload(kind, file).await {
            Ok(uri) => {
                self.set_slot(kind, ImageSlot::Uploaded(uri.clone())).await;
                Ok(uri)
            }
            Err(e) => {
                tracing::error!("{:?} upload failed: {}", kind, e);
                self.set_slot(kind, ImageSlot::Failed).await;
                Err(e)
            }
        }
    }

    async fn resize_and_upload(&self, kind: ImageKind, file: ImageFile) -> Result<String> {
        let resizer = self.deps.resizer;
        let bounds = self.deps.images.bounds(kind);
        let resized = tokio::task::spawn_blocking(move || resizer.resize(&file, bounds))
            .await
            .map_err(|e| TipjarError::internal(format!("resize task failed: {}", e)))??;

        let content_id = self
            .deps
            .store
            .upload(&resized)
            .await
            .map_err(|e| match e {
                TipjarError::Upload(_) => e,
                other => TipjarError::upload(other.to_string()),
            })?;
        Ok(self.deps.store.uri_for(&content_id))
    }

    async fn set_slot(&self, kind: ImageKind, slot: ImageSlot) {
        self.state.lock().await.draft.set_image(kind, slot);
    }

    /// Sends every pending update as one batch.
    ///
    /// Refused unless the gate is open and the connected signer owns the
    /// profile. On success the profile is re-read and becomes the new
    /// snapshot.
    pub async fn submit(&self) -> Result<TxReceipt> {
        let (owner, updates) = {
            let state = self.state.lock().await;
            if !is_ready(&state.snapshot, &state.draft) {
                return Err(TipjarError::validation(
                    "nothing to save or an image is still uploading",
                ));
            }
            (state.owner.clone(), reconcile(&state.snapshot, &state.draft))
        };

        let signer = self
            .deps
            .wallet
            .active_account()
            .ok_or_else(|| TipjarError::unauthorized("no wallet connected"))?;
        if signer != owner {
            return Err(TipjarError::unauthorized(format!(
                "{} does not own {}",
                signer, self.profile
            )));
        }

        // An image-only change that matches the stored URI reconciles to nothing.
        if updates.is_empty() {
            self.reset_images().await;
            return Err(TipjarError::validation("no profile fields changed"));
        }

        tracing::info!("Submitting {} profile update(s)", updates.len());
        let calls: Vec<CallRequest> = updates
            .into_iter()
            .map(|update| CallRequest::new(self.profile.clone(), update.into()))
            .collect();
        let receipt = self.tracker.track(self.deps.wallet.submit(calls)).await?;

        match self.deps.ledger.profile_details(&self.profile).await {
            Ok(record) => {
                let snapshot = ProfileSnapshot::from(&record);
                let mut state = self.state.lock().await;
                let mut draft = ProfileDraft::from_snapshot(&snapshot);
                for kind in [ImageKind::Avatar, ImageKind::Banner] {
                    let slot = state.draft.image(kind);
                    if slot_outlives_submit(slot, stored_uri(&snapshot, kind)) {
                        draft.set_image(kind, slot.clone());
                    }
                }
                state.draft = draft;
                state.snapshot = snapshot;
            }
            Err(e) => tracing::warn!("Re-read after update failed: {}", e),
        }
        Ok(receipt)
    }

    async fn reset_images(&self) {
        let mut state = self.state.lock().await;
        for kind in [ImageKind::Avatar, ImageKind::Banner] {
            if !slot_outlives_submit(state.draft.image(kind), stored_uri(&state.snapshot, kind)) {
                state.draft.set_image(kind, ImageSlot::Unchanged);
            }
        }
    }
}

fn stored_uri(snapshot: &ProfileSnapshot, kind: ImageKind) -> &str {
    match kind {
        ImageKind::Avatar => &snapshot.profile_picture,
        ImageKind::Banner => &snapshot.banner_picture,
    }
}

/// Whether a slot still means something after the profile was re-read:
/// uploads that started during the submit, and URIs the ledger does not
/// hold yet.
fn slot_outlives_submit(slot: &ImageSlot, stored: &str) -> bool {
    match slot {
        ImageSlot::Unchanged => false,
        ImageSlot::Uploaded(uri) => uri != stored,
        ImageSlot::Uploading | ImageSlot::Failed => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_kept_across_resnapshot() {
        assert!(slot_outlives_submit(&ImageSlot::Uploading, "ipfs://a"));
        assert!(slot_outlives_submit(&ImageSlot::Failed, ""));
        assert!(slot_outlives_submit(
            &ImageSlot::Uploaded("ipfs://b".into()),
            "ipfs://a"
        ));
        assert!(!slot_outlives_submit(
            &ImageSlot::Uploaded("ipfs://a".into()),
            "ipfs://a"
        ));
        assert!(!slot_outlives_submit(&ImageSlot::Unchanged, "ipfs://a"));
    }
}
