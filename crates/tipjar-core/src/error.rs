//! Error types for tipjar.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for every tipjar crate.
///
/// Variants follow the failure taxonomy of the site: reads, uploads and
/// transactions each degrade one region and never abort the process, so
/// callers mostly log these and keep the previous state.
#[derive(Error, Debug, Clone, Serialize)]
pub enum TipjarError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Input rejected before reaching a collaborator
    #[error("Validation error: {0}")]
    Validation(String),

    /// Signer is missing or does not own the profile
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Ledger read or transaction failure
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Network failure talking to an external HTTP service
    #[error("Network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
    },

    /// Content upload failure
    #[error("Upload error: {0}")]
    Upload(String),

    /// Image decode/resize/encode failure
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TipjarError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a Ledger error
    pub fn ledger(message: impl Into<String>) -> Self {
        Self::Ledger(message.into())
    }

    /// Creates a Network error without an HTTP status
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a Network error carrying the HTTP status
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates an Upload error
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload(message.into())
    }

    /// Creates an Image error
    pub fn image(message: impl Into<String>) -> Self {
        Self::Image(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an Unauthorized error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TipjarError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TipjarError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TipjarError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TipjarError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for TipjarError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, TipjarError>`.
pub type Result<T> = std::result::Result<T, TipjarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = TipjarError::not_found("Profile", "alice");
        assert_eq!(err.to_string(), "Entity not found: Profile 'alice'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_http_status_is_network() {
        let err = TipjarError::http_status(503, "unavailable");
        assert!(err.is_network());
        match err {
            TipjarError::Network { status, .. } => assert_eq!(status, Some(503)),
            _ => panic!("expected network error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TipjarError = io.into();
        assert!(matches!(err, TipjarError::Io { .. }));
    }
}
