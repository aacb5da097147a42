use std::{io::Read, path::Path};

use anyhow::Context;

use crate::{
    assets::chroma::DEFAULT_KEY_THRESHOLD,
    foundation::{
        core::Canvas,
        error::{StoryframeError, StoryframeResult},
    },
};

/// Engine-wide settings. Defaults reproduce the story composer's fixed behavior.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Logical output resolution; fixed for the lifetime of an engine.
    pub canvas: Canvas,
    /// Straight RGBA8 letterbox color painted under the photo. Must be opaque.
    pub background_rgba: [u8; 4],
    /// Frame pixels with every RGB channel below this become transparent.
    pub key_threshold: u8,
    pub zoom: ZoomConfig,
    pub display: DisplayConfig,
    /// Re-render after each transform mutation. When off, only explicit redraws and export
    /// touch the surface.
    pub auto_redraw: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::STORY,
            background_rgba: [0, 0, 0, 255],
            key_threshold: DEFAULT_KEY_THRESHOLD,
            zoom: ZoomConfig::default(),
            display: DisplayConfig::default(),
            auto_redraw: true,
        }
    }
}

/// Zoom clamp and step factors, all relative to the photo's cover scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    pub min_factor: f64,
    pub max_factor: f64,
    pub button_in: f64,
    pub button_out: f64,
    pub wheel_in: f64,
    pub wheel_out: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_factor: 0.3,
            max_factor: 6.0,
            button_in: 1.25,
            button_out: 0.75,
            wheel_in: 1.05,
            wheel_out: 0.95,
        }
    }
}

/// On-screen sizing of the preview, in display (CSS) pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Width assumed before the first layout pass.
    pub initial_width: f64,
    pub min_width: f64,
    pub max_width: f64,
    /// Vertical space taken by surrounding chrome (header, zoom bar, bottom bar, gaps).
    pub reserved_height: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            initial_width: 300.0,
            min_width: 200.0,
            max_width: 430.0,
            reserved_height: 230.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> StoryframeResult<()> {
        self.canvas.validate()?;
        if self.background_rgba[3] != u8::MAX {
            return Err(StoryframeError::validation(
                "background_rgba must be opaque (alpha 255); exports are opaque PNGs",
            ));
        }

        let z = &self.zoom;
        for (name, v) in [
            ("zoom.min_factor", z.min_factor),
            ("zoom.max_factor", z.max_factor),
            ("zoom.button_in", z.button_in),
            ("zoom.button_out", z.button_out),
            ("zoom.wheel_in", z.wheel_in),
            ("zoom.wheel_out", z.wheel_out),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(StoryframeError::validation(format!(
                    "{name} must be finite and > 0 (got {v})"
                )));
            }
        }
        if z.min_factor > z.max_factor {
            return Err(StoryframeError::validation(
                "zoom.min_factor must be <= zoom.max_factor",
            ));
        }

        let d = &self.display;
        if !(d.min_width.is_finite() && d.min_width > 0.0) {
            return Err(StoryframeError::validation("display.min_width must be > 0"));
        }
        if !d.max_width.is_finite() || d.min_width > d.max_width {
            return Err(StoryframeError::validation(
                "display.min_width must be <= display.max_width",
            ));
        }
        if !(d.initial_width.is_finite() && d.initial_width > 0.0) {
            return Err(StoryframeError::validation(
                "display.initial_width must be > 0",
            ));
        }
        if !d.reserved_height.is_finite() || d.reserved_height < 0.0 {
            return Err(StoryframeError::validation(
                "display.reserved_height must be >= 0",
            ));
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> StoryframeResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse engine config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_reader(r: impl Read) -> StoryframeResult<Self> {
        let cfg: Self = serde_json::from_reader(r).context("parse engine config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> StoryframeResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        Self::from_json_reader(std::io::BufReader::new(f))
    }
}
