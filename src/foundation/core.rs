use crate::foundation::error::{StoryframeError, StoryframeResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Logical output width of a story composite.
pub const OUTPUT_WIDTH: u32 = 1080;
/// Logical output height of a story composite.
pub const OUTPUT_HEIGHT: u32 = 1920;

/// Largest side the CPU rasterizer can address.
pub const MAX_SURFACE_SIDE: u32 = u16::MAX as u32;

/// Fixed logical pixel grid all composition and export math operates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// The 9:16 story canvas.
    pub const STORY: Canvas = Canvas {
        width: OUTPUT_WIDTH,
        height: OUTPUT_HEIGHT,
    };

    pub fn new(width: u32, height: u32) -> StoryframeResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    pub fn validate(self) -> StoryframeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StoryframeError::validation(
                "canvas width and height must be > 0",
            ));
        }
        if self.width > MAX_SURFACE_SIDE || self.height > MAX_SURFACE_SIDE {
            return Err(StoryframeError::validation(format!(
                "canvas {}x{} exceeds the {MAX_SURFACE_SIDE}px surface limit",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::STORY
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
