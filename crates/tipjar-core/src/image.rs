//! Image intake: which field an image is for and how large it may be.

use serde::{Deserialize, Serialize};

/// The two image fields of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Avatar,
    Banner,
}

/// Maximum dimensions an image is resized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl ImageBounds {
    pub const AVATAR: ImageBounds = ImageBounds {
        max_width: 120,
        max_height: 120,
    };
    pub const BANNER: ImageBounds = ImageBounds {
        max_width: 1200,
        max_height: 1200,
    };

    /// Largest size with the source aspect ratio that fits the bounds.
    ///
    /// Smaller sources are scaled up to touch the bounds. Each side is at
    /// least one pixel.
    pub fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (self.max_width.max(1), self.max_height.max(1));
        }

        let source_ratio = width as f64 / height as f64;
        let bound_ratio = self.max_width as f64 / self.max_height as f64;

        let (w, h) = if source_ratio > bound_ratio {
            let w = self.max_width as f64;
            (w, w / source_ratio)
        } else {
            let h = self.max_height as f64;
            (h * source_ratio, h)
        };

        let w = (w.round() as u32).clamp(1, self.max_width.max(1));
        let h = (h.round() as u32).clamp(1, self.max_height.max(1));
        (w, h)
    }
}

/// An image file as selected by the user (or produced by resizing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
