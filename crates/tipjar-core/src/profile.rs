//! Profile page display model.

use serde::Serialize;

use crate::format::{capitalize, format_ether, format_month_year};
use crate::ledger::{Address, ProfileRecord, Wei};
use crate::social::{SocialLink, classify_links};

/// Avatar shown when the profile has none.
pub const DEFAULT_AVATAR_URI: &str =
    "https://gravatar.com/avatar/b32311a07e94c3ca45d2b80793b403c7?s=400&d=identicon&r=x";
/// Location shown when the profile has none.
pub const DEFAULT_LOCATION: &str = "Earth";

const TOTAL_TIPS_DECIMALS: u32 = 4;

/// A resolved profile: where it lives, who owns it, and what it says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub address: Address,
    pub owner: Address,
    pub record: ProfileRecord,
}

impl Profile {
    pub fn is_owned_by(&self, account: Option<&Address>) -> bool {
        account.is_some_and(|account| *account == self.owner)
    }
}

/// Everything a profile page header renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub handle: String,
    pub display_name: String,
    pub about_me: String,
    pub avatar_uri: String,
    /// Empty when no banner is set.
    pub banner_uri: String,
    pub location: String,
    pub joined: String,
    pub total_tips: String,
    pub total_tips_wei: Wei,
    pub social_links: Vec<SocialLink>,
    pub owner: Address,
    pub profile_address: Address,
    pub is_owner: bool,
}

impl ProfileView {
    pub fn build(profile: &Profile, viewer: Option<&Address>) -> Self {
        let record = &profile.record;
        Self {
            handle: record.username.clone(),
            display_name: capitalize(&record.username),
            about_me: record.about_me.clone(),
            avatar_uri: non_empty_or(&record.profile_picture, DEFAULT_AVATAR_URI),
            banner_uri: record.banner_picture.clone(),
            location: non_empty_or(&record.location, DEFAULT_LOCATION),
            joined: format!("Joined {}", format_month_year(record.created)),
            total_tips: format_ether(record.total_tips, TOTAL_TIPS_DECIMALS),
            total_tips_wei: record.total_tips,
            social_links: classify_links(&record.social_profiles),
            owner: profile.owner.clone(),
            profile_address: profile.address.clone(),
            is_owner: profile.is_owned_by(viewer),
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
