use crate::{config::DisplayConfig, foundation::core::Canvas};

/// Host viewport metrics, in display pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width available to the preview's container.
    pub container_width: f64,
    /// Full window height; chrome is subtracted using [`DisplayConfig::reserved_height`].
    pub viewport_height: f64,
}

/// On-screen preview width for `viewport`.
///
/// The smallest of container width, height-derived width and the configured cap, floored to
/// whole pixels and never below the configured minimum.
pub fn display_width_for(viewport: Viewport, canvas: Canvas, cfg: &DisplayConfig) -> f64 {
    let available_h = viewport.viewport_height - cfg.reserved_height;
    let width_from_height = available_h * canvas.aspect_ratio();
    let width = viewport
        .container_width
        .min(width_from_height)
        .min(cfg.max_width);
    let width = if width.is_finite() { width.floor() } else { cfg.min_width };
    width.max(cfg.min_width)
}

/// Mapping between the on-screen preview and the logical output canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMapping {
    canvas: Canvas,
    display_width: f64,
}

impl DisplayMapping {
    pub fn new(canvas: Canvas, display_width: f64) -> Self {
        let mut m = Self {
            canvas,
            display_width: 1.0,
        };
        m.set_display_width(display_width);
        m
    }

    /// Non-finite or non-positive widths are ignored.
    pub fn set_display_width(&mut self, width: f64) -> bool {
        if !width.is_finite() || width <= 0.0 {
            tracing::warn!(width, "ignoring invalid display width");
            return false;
        }
        let changed = width != self.display_width;
        self.display_width = width;
        changed
    }

    pub fn display_width(&self) -> f64 {
        self.display_width
    }

    pub fn display_height(&self) -> f64 {
        self.display_width / self.canvas.aspect_ratio()
    }

    /// Output pixels per display pixel.
    pub fn display_to_output_ratio(&self) -> f64 {
        f64::from(self.canvas.width) / self.display_width
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/display.rs"]
mod tests;
