use serde::{Deserialize, Serialize};

use crate::error::{Result, TipjarError};
use crate::image::ImageKind;
use crate::ledger::{ContractCall, ProfileRecord};

/// Bio length limit, in characters.
pub const MAX_ABOUT_ME_CHARS: usize = 256;
/// Social link slots per profile.
pub const MAX_SOCIAL_PROFILES: usize = 4;

/// Editable fields as last read from the ledger, captured when the editor opens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub about_me: String,
    pub profile_picture: String,
    pub banner_picture: String,
    pub location: String,
    pub social_profiles: Vec<String>,
}

impl From<&ProfileRecord> for ProfileSnapshot {
    fn from(record: &ProfileRecord) -> Self {
        Self {
            about_me: record.about_me.clone(),
            profile_picture: record.profile_picture.clone(),
            banner_picture: record.banner_picture.clone(),
            location: record.location.clone(),
            social_profiles: record.social_profiles.clone(),
        }
    }
}

/// Upload state of one image field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "uri", rename_all = "snake_case")]
pub enum ImageSlot {
    /// No file selected; the snapshot URI stays.
    #[default]
    Unchanged,
    /// A file was selected and its upload is in flight.
    Uploading,
    /// The upload produced this URI.
    Uploaded(String),
    /// A file was selected but resizing or uploading failed.
    Failed,
}

impl ImageSlot {
    pub fn is_selected(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, Self::Uploading)
    }

    pub fn uploaded_uri(&self) -> Option<&str> {
        match self {
            Self::Uploaded(uri) => Some(uri),
            _ => None,
        }
    }

    /// No file selected, or the selected file has a URI.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Unchanged | Self::Uploaded(_))
    }
}

/// The editor's working copy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    about_me: String,
    location: String,
    social_profiles: Vec<String>,
    profile_picture: ImageSlot,
    banner: ImageSlot,
}

impl ProfileDraft {
    pub fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        Self {
            about_me: snapshot.about_me.clone(),
            location: snapshot.location.clone(),
            social_profiles: snapshot.social_profiles.clone(),
            profile_picture: ImageSlot::Unchanged,
            banner: ImageSlot::Unchanged,
        }
    }

    pub fn about_me(&self) -> &str {
        &self.about_me
    }

    /// Sets the bio, silently cut to [`MAX_ABOUT_ME_CHARS`] characters.
    pub fn set_about_me(&mut self, value: &str) {
        self.about_me = value.chars().take(MAX_ABOUT_ME_CHARS).collect();
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, value: &str) {
        self.location = value.to_string();
    }

    pub fn social_profiles(&self) -> &[String] {
        &self.social_profiles
    }

    /// Appends an empty link slot.
    pub fn add_social_profile(&mut self) -> Result<usize> {
        if self.social_profiles.len() >= MAX_SOCIAL_PROFILES {
            return Err(TipjarError::validation(format!(
                "at most {MAX_SOCIAL_PROFILES} social profiles"
            )));
        }
        self.social_profiles.push(String::new());
        Ok(self.social_profiles.len() - 1)
    }

    pub fn set_social_profile(&mut self, index: usize, value: &str) -> Result<()> {
        let slot = self
            .social_profiles
            .get_mut(index)
            .ok_or_else(|| TipjarError::validation(format!("no social profile at {index}")))?;
        *slot = value.to_string();
        Ok(())
    }

    /// Removes a link slot; later slots move up one position.
    pub fn remove_social_profile(&mut self, index: usize) -> Result<String> {
        if index >= self.social_profiles.len() {
            return Err(TipjarError::validation(format!(
                "no social profile at {index}"
            )));
        }
        Ok(self.social_profiles.remove(index))
    }

    pub fn image(&self, kind: ImageKind) -> &ImageSlot {
        match kind {
            ImageKind::Avatar => &self.profile_picture,
            ImageKind::Banner => &self.banner,
        }
    }

    pub fn set_image(&mut self, kind: ImageKind, slot: ImageSlot) {
        match kind {
            ImageKind::Avatar => self.profile_picture = slot,
            ImageKind::Banner => self.banner = slot,
        }
    }

    pub fn any_upload_in_flight(&self) -> bool {
        self.profile_picture.is_uploading() || self.banner.is_uploading()
    }
}

/// One field-level mutation of a profile contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ProfileUpdate {
    AboutMe { value: String },
    ProfilePicture { uri: String },
    BannerPicture { uri: String },
    Location { value: String },
    UpdateSocialProfile { index: usize, url: String },
    RemoveSocialProfile { index: usize },
    AddSocialProfile { url: String },
}

impl From<ProfileUpdate> for ContractCall {
    fn from(update: ProfileUpdate) -> Self {
        match update {
            ProfileUpdate::AboutMe { value } => ContractCall::UpdateAboutMe(value),
            ProfileUpdate::ProfilePicture { uri } => ContractCall::UpdateProfilePicture(uri),
            ProfileUpdate::BannerPicture { uri } => ContractCall::UpdateBannerPicture(uri),
            ProfileUpdate::Location { value } => ContractCall::UpdateLocation(value),
            ProfileUpdate::UpdateSocialProfile { index, url } => {
                ContractCall::UpdateSocialProfile { index, url }
            }
            ProfileUpdate::RemoveSocialProfile { index } => {
                ContractCall::RemoveSocialProfile { index }
            }
            ProfileUpdate::AddSocialProfile { url } => ContractCall::AddSocialProfile(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_about_me_is_truncated_by_chars() {
        let mut draft = ProfileDraft::default();
        draft.set_about_me(&"é".repeat(300));
        assert_eq!(draft.about_me().chars().count(), MAX_ABOUT_ME_CHARS);
    }

    #[test]
    fn test_social_slots_are_bounded() {
        let mut draft = ProfileDraft::default();
        for _ in 0..MAX_SOCIAL_PROFILES {
            draft.add_social_profile().unwrap();
        }
        assert!(draft.add_social_profile().unwrap_err().is_validation());

        draft.set_social_profile(1, "https://github.com/alice").unwrap();
        assert_eq!(draft.remove_social_profile(1).unwrap(), "https://github.com/alice");
        assert_eq!(draft.social_profiles().len(), MAX_SOCIAL_PROFILES - 1);
        assert!(draft.set_social_profile(9, "x").is_err());
    }

    #[test]
    fn test_image_slot_states() {
        assert!(ImageSlot::Unchanged.is_resolved());
        assert!(!ImageSlot::Uploading.is_resolved());
        assert!(!ImageSlot::Failed.is_resolved());
        assert!(ImageSlot::Failed.is_selected());
        assert_eq!(ImageSlot::Uploaded("u".into()).uploaded_uri(), Some("u"));
    }
}
