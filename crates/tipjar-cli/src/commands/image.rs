use std::path::Path;

use anyhow::{Context, Result};
use tipjar_core::config::{ImagesConfig, RootConfig};
use tipjar_core::content::ContentStore;
use tipjar_core::image::{ImageFile, ImageKind};
use tipjar_infrastructure::{ImageResizer, SecretServiceImpl, load_image_file};
use tipjar_interaction::PinataContentStore;

fn load_resized(images: &ImagesConfig, input: &Path, kind: ImageKind) -> Result<ImageFile> {
    let file = load_image_file(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    Ok(ImageResizer::new().resize(&file, images.bounds(kind))?)
}

pub fn resize(images: &ImagesConfig, input: &Path, kind: ImageKind, output: &Path) -> Result<()> {
    let resized = load_resized(images, input, kind)?;
    std::fs::write(output, &resized.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} ({} bytes)", output.display(), resized.bytes.len());
    Ok(())
}

pub async fn upload(
    config: &RootConfig,
    secrets: &SecretServiceImpl,
    input: &Path,
    kind: ImageKind,
) -> Result<()> {
    let resized = load_resized(&config.images, input, kind)?;
    let store = PinataContentStore::from_secrets(&config.content_store, secrets).await?;
    let content_id = store.upload(&resized).await?;
    println!("{}", store.uri_for(&content_id));
    Ok(())
}
