//! State-changing contract calls.

use serde::{Deserialize, Serialize};

use super::model::{Address, Wei};

/// One function call against the registry or a profile contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", content = "args", rename_all = "camelCase")]
pub enum ContractCall {
    CreateProfile {
        username: String,
        about_me: String,
        social_profiles: Vec<String>,
    },
    AddTip {
        message: String,
    },
    UpdateAboutMe(String),
    UpdateLocation(String),
    UpdateProfilePicture(String),
    UpdateBannerPicture(String),
    AddSocialProfile(String),
    UpdateSocialProfile {
        index: usize,
        url: String,
    },
    RemoveSocialProfile {
        index: usize,
    },
    Withdraw,
}

impl ContractCall {
    /// Solidity function name the call encodes to.
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::CreateProfile { .. } => "createProfile",
            Self::AddTip { .. } => "addTip",
            Self::UpdateAboutMe(_) => "updateAboutMe",
            Self::UpdateLocation(_) => "updateLocation",
            Self::UpdateProfilePicture(_) => "updateProfilePicture",
            Self::UpdateBannerPicture(_) => "updateBannerPicture",
            Self::AddSocialProfile(_) => "addSocialProfile",
            Self::UpdateSocialProfile { .. } => "updateSocialProfile",
            Self::RemoveSocialProfile { .. } => "removeSocialProfile",
            Self::Withdraw => "withdraw",
        }
    }

    pub fn is_payable(&self) -> bool {
        matches!(self, Self::CreateProfile { .. } | Self::AddTip { .. })
    }
}

/// A call addressed to a contract, with the value attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub to: Address,
    pub value: Wei,
    pub call: ContractCall,
}

impl CallRequest {
    /// A call that carries no value.
    pub fn new(to: Address, call: ContractCall) -> Self {
        Self {
            to,
            value: Wei::ZERO,
            call,
        }
    }

    pub fn with_value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }
}
