//! Image resizing before upload.
//!
//! Decodes the selected file, scales it to fit the slot's bounds and
//! re-encodes it in the source format. JPEG output uses quality 90.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use tipjar_core::image::{ImageBounds, ImageFile};
use tipjar_core::{Result, TipjarError};

pub const JPEG_QUALITY: u8 = 90;

/// Scales images into [`ImageBounds`].
#[derive(Debug, Clone, Copy)]
pub struct ImageResizer {
    filter: FilterType,
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl ImageResizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resized file; name is kept, MIME type follows the
    /// detected format.
    pub fn resize(&self, file: &ImageFile, bounds: ImageBounds) -> Result<ImageFile> {
        let format = image::guess_format(&file.bytes).map_err(|e| {
            TipjarError::image(format!("Unrecognized image '{}': {}", file.file_name, e))
        })?;
        let source = image::load_from_memory_with_format(&file.bytes, format).map_err(|e| {
            TipjarError::image(format!("Failed to decode '{}': {}", file.file_name, e))
        })?;

        let (width, height) = source.dimensions();
        let (target_width, target_height) = bounds.fit(width, height);
        tracing::debug!(
            "Resizing {} from {}x{} to {}x{}",
            file.file_name,
            width,
            height,
            target_width,
            target_height
        );
        let resized = source.resize_exact(target_width, target_height, self.filter);

        Ok(ImageFile {
            file_name: file.file_name.clone(),
            mime_type: format.to_mime_type().to_string(),
            bytes: encode(&resized, format)?,
        })
    }
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let result = if format == ImageFormat::Jpeg {
        let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
        image.to_rgb8().write_with_encoder(encoder)
    } else {
        image.write_to(&mut Cursor::new(&mut bytes), format)
    };
    result.map_err(|e| TipjarError::image(format!("Failed to encode {:?}: {}", format, e)))?;
    Ok(bytes)
}

/// Reads an image file from disk, guessing its MIME type from the name.
pub fn load_image_file(path: &Path) -> Result<ImageFile> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(TipjarError::validation(format!(
            "'{}' is not an image ({})",
            file_name, mime
        )));
    }

    Ok(ImageFile {
        file_name,
        mime_type: mime.essence_str().to_string(),
        bytes,
    })
}
