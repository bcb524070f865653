//! Content storage seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::image::ImageFile;

/// Content-addressed file storage used for profile images.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Uploads a file and returns its content identifier.
    async fn upload(&self, file: &ImageFile) -> Result<String>;

    /// Retrievable URI for a content identifier.
    fn uri_for(&self, content_id: &str) -> String;
}
