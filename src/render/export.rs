use std::path::Path;

use anyhow::Context;
use image::{
    ExtendedColorType, ImageEncoder,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};

use crate::foundation::error::{StoryframeError, StoryframeResult};

/// File name hosts use when saving or sharing an export.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "storyframe.png";

/// An encoded composite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    pub width: u32,
    pub height: u32,
    /// PNG file bytes.
    pub png: Vec<u8>,
}

impl ExportedImage {
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// Write the PNG, creating parent directories as needed.
    pub fn write_to_path(&self, path: &Path) -> StoryframeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(path, &self.png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Losslessly encode straight RGBA8 pixels as PNG with the strongest compression.
pub fn encode_png(width: u32, height: u32, rgba8: &[u8]) -> StoryframeResult<Vec<u8>> {
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if rgba8.len() != expected {
        return Err(StoryframeError::encode(format!(
            "expected {expected} RGBA8 bytes for {width}x{height}, got {}",
            rgba8.len()
        )));
    }

    let mut png = Vec::new();
    PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::Adaptive)
        .write_image(rgba8, width, height, ExtendedColorType::Rgba8)
        .context("encode png")?;
    Ok(png)
}
