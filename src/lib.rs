//! Storyframe composites a user photo under a decorative frame for portrait "story" images.
//!
//! The frame's near-black background is keyed out so the photo shows through. The photo can be
//! panned and zoomed with mouse, touch, wheel or button input, and the result is exported as a
//! fixed-resolution PNG.
//!
//! - Create a [`FrameEngine`] from an [`EngineConfig`]
//! - Mount a surface, set a frame and photo [`AssetSource`], then pump loads
//! - Feed [`InputEvent`]s and export with [`FrameEngine::export_composite`]
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod gesture;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod transform;

/// Engine configuration loaded from JSON.
pub mod config;
/// The compositor handle.
pub mod engine;
/// Replayable host sessions.
pub mod script;

pub use crate::foundation::core::{
    Affine, Canvas, MAX_SURFACE_SIDE, OUTPUT_HEIGHT, OUTPUT_WIDTH, Point, Rect, Vec2,
};
pub use crate::foundation::error::{StoryframeError, StoryframeResult};

pub use crate::assets::chroma::{DEFAULT_KEY_THRESHOLD, ProcessedFrame, chroma_key_rgba8, key_frame};
pub use crate::assets::decode::{PreparedImage, decode_image, decode_rgba8};
pub use crate::assets::source::{AssetSource, decode_data_url};
pub use crate::config::{DisplayConfig, EngineConfig, ZoomConfig};
pub use crate::engine::{CompositeHandle, EngineState, FrameEngine};
pub use crate::gesture::input::{InputEvent, InputResponse};
pub use crate::gesture::tracker::GestureMode;
pub use crate::layout::display::{Viewport, display_width_for};
pub use crate::render::export::{DEFAULT_EXPORT_FILE_NAME, ExportedImage, encode_png};
pub use crate::script::{ScriptStep, SessionScript};
pub use crate::transform::photo::{PhotoTransform, cover_scale};
