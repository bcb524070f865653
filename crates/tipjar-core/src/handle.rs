//! Handle rules: normalization of typed input and length bounds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TipjarError};

pub const MIN_HANDLE_LENGTH: usize = 3;
pub const MAX_HANDLE_LENGTH: usize = 31;

/// A validated handle: `[a-z0-9-]{3,31}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Validates an already-normalized handle.
    pub fn parse(value: &str) -> Result<Self> {
        if value.len() < MIN_HANDLE_LENGTH || value.len() > MAX_HANDLE_LENGTH {
            return Err(TipjarError::validation(format!(
                "handle must be {MIN_HANDLE_LENGTH}-{MAX_HANDLE_LENGTH} characters, got {}",
                value.len()
            )));
        }
        if !value.bytes().all(is_handle_byte) {
            return Err(TipjarError::validation(
                "handle may only contain lowercase letters, numbers and hyphens",
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Handle {
    type Error = TipjarError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_handle_byte(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'
}

/// Normalizes typed input the way the claim form does on every keystroke:
/// lowercase, whitespace to `-`, everything else outside `[a-z0-9-]` dropped.
pub fn normalize_handle(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_ascii() && is_handle_byte(c as u8) {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}
