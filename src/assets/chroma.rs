//! Near-black chroma keying for decorative frames.

use image::RgbaImage;

use crate::foundation::error::{StoryframeError, StoryframeResult};

/// Channel values strictly below this are treated as background.
pub const DEFAULT_KEY_THRESHOLD: u8 = 30;

/// A frame after keying, ready to be drawn over the photo.
#[derive(Clone, Debug)]
pub struct ProcessedFrame {
    /// Straight RGBA8 pixels, same dimensions as the source frame.
    pub image: RgbaImage,
    /// `false` when keying was skipped and `image` is the untouched source.
    pub keyed: bool,
    /// Number of pixels made transparent.
    pub transparent_pixels: u64,
}

/// Set alpha to 0 for every pixel whose red, green and blue are all `< threshold`.
///
/// Other pixels are left exactly as they are; there is no feathering. The buffer is not
/// modified when it is rejected.
pub fn chroma_key_rgba8(rgba: &mut [u8], threshold: u8) -> StoryframeResult<u64> {
    if rgba.is_empty() || !rgba.len().is_multiple_of(4) {
        return Err(StoryframeError::decode(format!(
            "pixel buffer of {} bytes is not addressable as RGBA8",
            rgba.len()
        )));
    }

    let mut keyed = 0u64;
    for px in rgba.chunks_exact_mut(4) {
        if px[0] < threshold && px[1] < threshold && px[2] < threshold {
            px[3] = 0;
            keyed += 1;
        }
    }
    Ok(keyed)
}

/// Key out the near-black background of `source`.
///
/// Falls back to the unprocessed frame when its pixel buffer cannot be keyed. Frames decoded
/// through `decode_rgba8` are never empty, so only callers passing raw buffers hit this.
pub fn key_frame(source: RgbaImage, threshold: u8) -> ProcessedFrame {
    let mut image = source;
    let (width, height) = image.dimensions();
    match chroma_key_rgba8(&mut image, threshold) {
        Ok(transparent_pixels) => {
            tracing::debug!(width, height, transparent_pixels, "frame keyed");
            ProcessedFrame {
                image,
                keyed: true,
                transparent_pixels,
            }
        }
        Err(err) => {
            tracing::warn!(width, height, error = %err, "chroma key unavailable, using frame as-is");
            ProcessedFrame {
                image,
                keyed: false,
                transparent_pixels: 0,
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/chroma.rs"]
mod tests;
