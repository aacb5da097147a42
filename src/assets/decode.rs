use std::sync::Arc;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::{
    core::MAX_SURFACE_SIDE,
    error::{StoryframeError, StoryframeResult},
    math::premultiply_rgba8_in_place,
};

/// Decoded raster in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes into straight (non-premultiplied) RGBA8.
///
/// Rejects images the CPU surface cannot draw.
pub fn decode_rgba8(bytes: &[u8]) -> StoryframeResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(StoryframeError::decode("image has zero width or height"));
    }
    if width > MAX_SURFACE_SIDE || height > MAX_SURFACE_SIDE {
        return Err(StoryframeError::decode(format!(
            "image {width}x{height} exceeds the {MAX_SURFACE_SIDE}px drawable limit"
        )));
    }
    Ok(rgba)
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StoryframeResult<PreparedImage> {
    Ok(prepare_rgba8(decode_rgba8(bytes)?))
}

/// Premultiply a straight RGBA8 image.
pub fn prepare_rgba8(rgba: RgbaImage) -> PreparedImage {
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
