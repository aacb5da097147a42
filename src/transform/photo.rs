use crate::{
    config::ZoomConfig,
    foundation::core::{Affine, Canvas, Point, Vec2},
};

/// How the user photo maps onto the output canvas.
///
/// `offset` is the top-left of the scaled photo in output pixels. `base_scale` is the cover
/// scale captured at load (or fit) and anchors both the zoom clamp and the zoom percentage.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhotoTransform {
    pub scale: f64,
    pub offset: Vec2,
    pub base_scale: f64,
}

impl Default for PhotoTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            base_scale: 1.0,
        }
    }
}

/// Smallest uniform scale at which a `width`×`height` image leaves no gap on `canvas`.
pub fn cover_scale(canvas: Canvas, width: u32, height: u32) -> f64 {
    let sx = f64::from(canvas.width) / f64::from(width.max(1));
    let sy = f64::from(canvas.height) / f64::from(height.max(1));
    sx.max(sy)
}

impl PhotoTransform {
    /// Cover-fit: scale to fill the canvas and center the overflow on both axes.
    pub fn cover(canvas: Canvas, width: u32, height: u32) -> Self {
        let scale = cover_scale(canvas, width, height);
        let scaled_w = f64::from(width) * scale;
        let scaled_h = f64::from(height) * scale;
        Self {
            scale,
            offset: Vec2::new(
                (f64::from(canvas.width) - scaled_w) / 2.0,
                (f64::from(canvas.height) - scaled_h) / 2.0,
            ),
            base_scale: scale,
        }
    }

    pub fn min_scale(&self, zoom: &ZoomConfig) -> f64 {
        self.base_scale * zoom.min_factor
    }

    pub fn max_scale(&self, zoom: &ZoomConfig) -> f64 {
        self.base_scale * zoom.max_factor
    }

    /// Clamp a candidate scale into the allowed band. Non-finite candidates keep the current scale.
    pub fn clamp_scale(&self, candidate: f64, zoom: &ZoomConfig) -> f64 {
        if !candidate.is_finite() {
            return self.scale;
        }
        candidate.clamp(self.min_scale(zoom), self.max_scale(zoom))
    }

    /// Set the scale directly (pinch); the offset is left where it is.
    pub fn set_scale(&mut self, candidate: f64, zoom: &ZoomConfig) -> bool {
        let next = self.clamp_scale(candidate, zoom);
        let changed = next != self.scale;
        self.scale = next;
        changed
    }

    /// Multiply the scale by `factor`, keeping the canvas point `anchor` over the same photo pixel.
    pub fn zoom_about(&mut self, factor: f64, anchor: Point, zoom: &ZoomConfig) -> bool {
        let old = self.scale;
        let new = self.clamp_scale(old * factor, zoom);
        if new == old {
            return false;
        }
        let ratio = new / old;
        let a = anchor.to_vec2();
        self.offset = a - (a - self.offset) * ratio;
        self.scale = new;
        true
    }

    /// Zoom relative to cover, in whole percent.
    pub fn zoom_percent(&self) -> u32 {
        if self.base_scale <= 0.0 {
            return 100;
        }
        (self.scale / self.base_scale * 100.0).round().max(0.0) as u32
    }

    pub fn scaled_size(&self, width: u32, height: u32) -> (f64, f64) {
        (f64::from(width) * self.scale, f64::from(height) * self.scale)
    }

    /// Photo pixel space -> canvas space.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    pub fn canvas_to_photo(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/photo.rs"]
mod tests;
