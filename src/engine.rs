//! The compositor handle a host shell drives.

use crate::{
    assets::{
        loader::{LoadCompletion, LoadSlot, LoadedAsset, Loader},
        source::AssetSource,
    },
    config::EngineConfig,
    foundation::{core::Canvas, error::StoryframeResult},
    gesture::{
        input::{InputEvent, InputResponse},
        tracker::{GestureMode, GestureTracker, TransformOp},
    },
    layout::display::{DisplayMapping, Viewport, display_width_for},
    render::{
        cpu::{DrawableImage, Scene, Surface},
        export::{ExportedImage, encode_png},
    },
    transform::photo::PhotoTransform,
};

/// Whether transform inputs currently do anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No photo loaded; transform inputs are no-ops.
    Idle,
    /// A photo is loaded and follows the transform.
    Ready,
}

/// The narrow capability a host UI holds on the compositor.
pub trait CompositeHandle {
    /// Render at full resolution and encode. `Ok(None)` when no surface is mounted.
    fn export_image(&mut self) -> StoryframeResult<Option<ExportedImage>>;

    /// A surface is mounted and no image loads are pending.
    fn is_ready(&self) -> bool;
}

struct LoadedPhoto {
    image: DrawableImage,
}

#[derive(Default)]
struct FrameSlot {
    /// Cache key of the source currently requested (loaded or in flight).
    key: Option<String>,
    token: u64,
    image: Option<DrawableImage>,
    keyed: bool,
}

/// Composites a user photo under a chroma-keyed frame and tracks the photo's pan/zoom.
///
/// All methods run on the owner's thread. Image decoding happens on worker threads; call
/// [`FrameEngine::pump`] or [`FrameEngine::wait_for_loads`] to apply finished loads.
pub struct FrameEngine {
    config: EngineConfig,
    loader: Loader,
    frame: FrameSlot,
    photo: Option<LoadedPhoto>,
    photo_token: u64,
    transform: PhotoTransform,
    gesture: GestureTracker,
    display: DisplayMapping,
    surface: Option<Surface>,
    dirty: bool,
    revision: u64,
}

impl FrameEngine {
    pub fn new(config: EngineConfig) -> StoryframeResult<Self> {
        config.validate()?;
        let display = DisplayMapping::new(config.canvas, config.display.initial_width);
        Ok(Self {
            config,
            loader: Loader::new(),
            frame: FrameSlot::default(),
            photo: None,
            photo_token: 0,
            transform: PhotoTransform::default(),
            gesture: GestureTracker::default(),
            display,
            surface: None,
            dirty: true,
            revision: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn canvas(&self) -> Canvas {
        self.config.canvas
    }

    // ---- surface lifecycle ----

    /// Acquire the drawing surface; inputs and renders are scoped to it.
    pub fn mount_surface(&mut self) -> StoryframeResult<()> {
        if self.surface.is_none() {
            self.surface = Some(Surface::new(self.config.canvas)?);
            tracing::debug!(canvas = ?self.config.canvas, "surface mounted");
        }
        self.request_redraw();
        Ok(())
    }

    /// Release the surface. Pending gestures are dropped with it.
    pub fn unmount_surface(&mut self) {
        if self.surface.take().is_some() {
            tracing::debug!("surface unmounted");
        }
        self.gesture.reset();
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    // ---- asset sources ----

    /// Start loading and keying a frame. Returns `false` when `source` is already loaded or
    /// loading.
    #[tracing::instrument(skip_all, fields(source = %source))]
    pub fn set_frame_source(&mut self, source: AssetSource) -> bool {
        let key = source.cache_key();
        if self.frame.key.as_deref() == Some(key.as_str()) {
            tracing::debug!("frame source unchanged, skipping");
            return false;
        }
        let token = self.loader.spawn_frame(source, self.config.key_threshold);
        self.frame = FrameSlot {
            key: Some(key),
            token,
            image: None,
            keyed: false,
        };
        self.request_redraw();
        true
    }

    /// Replace or clear the user photo.
    ///
    /// `None` clears the photo and resets the transform to defaults. `Some` starts a load; the
    /// current photo stays visible until it completes.
    #[tracing::instrument(skip_all, fields(source = ?source.as_ref().map(ToString::to_string)))]
    pub fn set_user_photo(&mut self, source: Option<AssetSource>) {
        match source {
            None => {
                // invalidates any in-flight load
                self.photo_token = self.loader.bump_token();
                self.photo = None;
                self.transform = PhotoTransform::default();
                self.gesture.reset();
                self.touch_transform();
            }
            Some(source) => {
                self.photo_token = self.loader.spawn_photo(source);
            }
        }
    }

    /// Apply every load that has already finished. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(done) = self.loader.try_next() {
            if self.apply_completion(done) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until no loads are in flight, applying each as it lands.
    pub fn wait_for_loads(&mut self) -> usize {
        let mut applied = 0;
        while let Some(done) = self.loader.wait_next() {
            if self.apply_completion(done) {
                applied += 1;
            }
        }
        applied
    }

    pub fn pending_loads(&self) -> usize {
        self.loader.in_flight()
    }

    fn apply_completion(&mut self, done: LoadCompletion) -> bool {
        let LoadCompletion {
            slot,
            token,
            key,
            result,
        } = done;

        let latest = match slot {
            LoadSlot::Frame => self.frame.token,
            LoadSlot::Photo => self.photo_token,
        };
        if token != latest {
            tracing::debug!(?slot, token, latest, "discarding stale load");
            return false;
        }

        let loaded = match result {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!(?slot, key = %short_key(&key), error = %err, "image load failed");
                if slot == LoadSlot::Frame {
                    // allow retrying the same source
                    self.frame.key = None;
                }
                return false;
            }
        };

        match loaded {
            LoadedAsset::Frame { image, keyed } => match DrawableImage::from_prepared(&image) {
                Ok(drawable) => {
                    tracing::debug!(width = image.width, height = image.height, keyed, "frame ready");
                    self.frame.image = Some(drawable);
                    self.frame.keyed = keyed;
                    self.request_redraw();
                    true
                }
                Err(err) => {
                    tracing::warn!(error = %err, "frame could not be made drawable");
                    self.frame.key = None;
                    false
                }
            },
            LoadedAsset::Photo(image) => match DrawableImage::from_prepared(&image) {
                Ok(drawable) => {
                    self.transform =
                        PhotoTransform::cover(self.config.canvas, image.width, image.height);
                    self.photo = Some(LoadedPhoto { image: drawable });
                    self.gesture.reset();
                    tracing::debug!(
                        width = image.width,
                        height = image.height,
                        scale = self.transform.scale,
                        "photo ready"
                    );
                    self.touch_transform();
                    true
                }
                Err(err) => {
                    tracing::warn!(error = %err, "photo could not be made drawable");
                    false
                }
            },
        }
    }

    // ---- observers ----

    pub fn state(&self) -> EngineState {
        if self.photo.is_some() {
            EngineState::Ready
        } else {
            EngineState::Idle
        }
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn photo_size(&self) -> Option<(u32, u32)> {
        self.photo
            .as_ref()
            .map(|p| (p.image.width(), p.image.height()))
    }

    pub fn has_frame(&self) -> bool {
        self.frame.image.is_some()
    }

    /// `true` once the loaded frame had its background keyed out.
    pub fn frame_is_keyed(&self) -> bool {
        self.frame.image.is_some() && self.frame.keyed
    }

    pub fn transform(&self) -> PhotoTransform {
        self.transform
    }

    pub fn gesture_mode(&self) -> GestureMode {
        self.gesture.mode()
    }

    /// Bumped on every transform mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Zoom relative to cover fit; 100 when no photo is loaded.
    pub fn zoom_percent(&self) -> u32 {
        if self.photo.is_none() {
            return 100;
        }
        self.transform.zoom_percent()
    }

    /// Number of composites drawn on the mounted surface.
    pub fn render_count(&self) -> u64 {
        self.surface.as_ref().map_or(0, Surface::render_count)
    }

    // ---- display mapping ----

    pub fn display_width(&self) -> f64 {
        self.display.display_width()
    }

    pub fn display_height(&self) -> f64 {
        self.display.display_height()
    }

    pub fn display_to_output_ratio(&self) -> f64 {
        self.display.display_to_output_ratio()
    }

    /// Host reports a new on-screen preview width.
    pub fn set_display_width(&mut self, width: f64) -> bool {
        self.display.set_display_width(width)
    }

    /// Host reports new viewport metrics; returns the resulting display width.
    pub fn resize(&mut self, viewport: Viewport) -> f64 {
        let width = display_width_for(viewport, self.config.canvas, &self.config.display);
        self.display.set_display_width(width);
        tracing::debug!(width, "display resized");
        width
    }

    // ---- transform operations ----

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.config.zoom.button_in)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(self.config.zoom.button_out)
    }

    /// Zoom around the canvas center. No-op without a photo.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        self.apply_op(TransformOp::ZoomBy(factor))
    }

    /// Reset to the cover transform. No-op without a photo.
    pub fn fit_to_frame(&mut self) -> bool {
        let Some((width, height)) = self.photo_size() else {
            return false;
        };
        self.transform = PhotoTransform::cover(self.config.canvas, width, height);
        self.touch_transform();
        true
    }

    /// Feed a pointer, touch or wheel event in display coordinates.
    pub fn handle_input(&mut self, event: &InputEvent) -> InputResponse {
        if self.photo.is_none() {
            return InputResponse::default();
        }
        let ratio = self.display.display_to_output_ratio();
        let op = self
            .gesture
            .handle(event, &self.transform, ratio, &self.config.zoom);
        let transform_changed = op.is_some_and(|op| self.apply_op(op));
        InputResponse {
            prevent_default: event.is_touch() || event.is_wheel(),
            transform_changed,
        }
    }

    fn apply_op(&mut self, op: TransformOp) -> bool {
        if self.photo.is_none() {
            return false;
        }
        let zoom = self.config.zoom;
        let changed = match op {
            TransformOp::MoveTo(offset) => {
                let changed = offset != self.transform.offset;
                self.transform.offset = offset;
                changed
            }
            TransformOp::ScaleTo(scale) => self.transform.set_scale(scale, &zoom),
            TransformOp::ZoomBy(factor) => {
                self.transform
                    .zoom_about(factor, self.config.canvas.center(), &zoom)
            }
        };
        if changed {
            self.touch_transform();
        }
        changed
    }

    fn touch_transform(&mut self) {
        self.revision += 1;
        self.request_redraw();
    }

    // ---- rendering ----

    fn request_redraw(&mut self) {
        self.dirty = true;
        if self.config.auto_redraw {
            self.redraw();
        }
    }

    /// Render the composite if a surface is mounted. Returns whether anything was drawn.
    pub fn redraw(&mut self) -> bool {
        let scene = Scene {
            background_rgba: self.config.background_rgba,
            photo: self.photo.as_ref().map(|p| (&p.image, self.transform)),
            frame: self.frame.image.as_ref(),
        };
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        surface.render(&scene);
        self.dirty = false;
        true
    }

    /// A mutation happened since the last render.
    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Render at full resolution and encode as PNG. `Ok(None)` when no surface is mounted.
    ///
    /// Never changes the transform.
    #[tracing::instrument(skip(self))]
    pub fn export_composite(&mut self) -> StoryframeResult<Option<ExportedImage>> {
        if !self.redraw() {
            tracing::debug!("export requested without a mounted surface");
            return Ok(None);
        }
        let Some(surface) = self.surface.as_ref() else {
            return Ok(None);
        };
        let canvas = surface.canvas();
        let png = encode_png(canvas.width, canvas.height, &surface.to_straight_rgba8())?;
        tracing::info!(
            width = canvas.width,
            height = canvas.height,
            bytes = png.len(),
            "composite exported"
        );
        Ok(Some(ExportedImage {
            width: canvas.width,
            height: canvas.height,
            png,
        }))
    }
}

impl CompositeHandle for FrameEngine {
    fn export_image(&mut self) -> StoryframeResult<Option<ExportedImage>> {
        self.export_composite()
    }

    fn is_ready(&self) -> bool {
        self.surface.is_some() && self.loader.in_flight() == 0
    }
}

fn short_key(key: &str) -> &str {
    match key.char_indices().nth(48) {
        Some((idx, _)) => &key[..idx],
        None => key,
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
