//! Profile editor reconciliation.
//!
//! Diffs the draft against the snapshot captured at open time and emits
//! only the updates for fields that actually changed.

mod model;

pub use model::{
    ImageSlot, MAX_ABOUT_ME_CHARS, MAX_SOCIAL_PROFILES, ProfileDraft, ProfileSnapshot,
    ProfileUpdate,
};

use crate::image::ImageKind;

/// Minimal update list turning `initial` into `draft`.
///
/// Order: bio, profile picture, banner, location, then social links as
/// in-place updates (ascending), removals (descending, so every index still
/// names its original position when applied), and appends.
pub fn reconcile(initial: &ProfileSnapshot, draft: &ProfileDraft) -> Vec<ProfileUpdate> {
    let mut updates = Vec::new();

    if draft.about_me() != initial.about_me {
        updates.push(ProfileUpdate::AboutMe {
            value: draft.about_me().to_string(),
        });
    }

    if let Some(uri) = draft.image(ImageKind::Avatar).uploaded_uri() {
        if uri != initial.profile_picture {
            updates.push(ProfileUpdate::ProfilePicture {
                uri: uri.to_string(),
            });
        }
    }

    if let Some(uri) = draft.image(ImageKind::Banner).uploaded_uri() {
        if uri != initial.banner_picture {
            updates.push(ProfileUpdate::BannerPicture {
                uri: uri.to_string(),
            });
        }
    }

    if draft.location() != initial.location {
        updates.push(ProfileUpdate::Location {
            value: draft.location().to_string(),
        });
    }

    updates.extend(reconcile_social_profiles(
        &initial.social_profiles,
        draft.social_profiles(),
    ));
    updates
}

/// Positional diff of the social link list.
fn reconcile_social_profiles(old: &[String], new: &[String]) -> Vec<ProfileUpdate> {
    let shared = old.len().min(new.len());
    let mut updates = Vec::new();
    let mut removals = Vec::new();

    for index in 0..shared {
        if new[index] == old[index] {
            continue;
        }
        if new[index].is_empty() {
            removals.push(index);
        } else {
            updates.push(ProfileUpdate::UpdateSocialProfile {
                index,
                url: new[index].clone(),
            });
        }
    }

    removals.extend(shared..old.len());
    removals.sort_unstable_by(|a, b| b.cmp(a));
    updates.extend(
        removals
            .into_iter()
            .map(|index| ProfileUpdate::RemoveSocialProfile { index }),
    );

    updates.extend(
        new.iter()
            .skip(shared)
            .filter(|url| !url.is_empty())
            .map(|url| ProfileUpdate::AddSocialProfile { url: url.clone() }),
    );
    updates
}

/// Something would change: a field differs or an image was selected.
pub fn has_changes(initial: &ProfileSnapshot, draft: &ProfileDraft) -> bool {
    draft.image(ImageKind::Avatar).is_selected()
        || draft.image(ImageKind::Banner).is_selected()
        || !reconcile(initial, draft).is_empty()
}

/// Submission gate: a change exists, nothing is uploading, and every
/// selected image has its URI.
pub fn is_ready(initial: &ProfileSnapshot, draft: &ProfileDraft) -> bool {
    has_changes(initial, draft)
        && !draft.any_upload_in_flight()
        && draft.image(ImageKind::Avatar).is_resolved()
        && draft.image(ImageKind::Banner).is_resolved()
}
