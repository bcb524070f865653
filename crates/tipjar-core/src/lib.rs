pub mod config;
pub mod content;
pub mod editor;
pub mod error;
pub mod feed;
pub mod format;
pub mod handle;
pub mod image;
pub mod ledger;
pub mod price;
pub mod profile;
pub mod secret;
pub mod social;
pub mod tipping;

// Re-export common error type
pub use error::{Result, TipjarError};
