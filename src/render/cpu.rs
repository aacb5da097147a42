use std::sync::Arc;

use crate::{
    assets::decode::PreparedImage,
    foundation::{
        core::{Affine, Canvas},
        error::{StoryframeError, StoryframeResult},
        math::unpremultiply_rgba8_in_place,
    },
    transform::photo::PhotoTransform,
};

/// A decoded image turned into a `vello_cpu` paint.
#[derive(Clone)]
pub struct DrawableImage {
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for DrawableImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawableImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl DrawableImage {
    pub fn from_prepared(prepared: &PreparedImage) -> StoryframeResult<Self> {
        let pixmap =
            pixmap_from_premul_bytes(&prepared.rgba8_premul, prepared.width, prepared.height)?;
        Ok(Self {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: prepared.width,
            height: prepared.height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Everything one composite needs, borrowed from the engine.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// Straight RGBA8.
    pub background_rgba: [u8; 4],
    pub photo: Option<(&'a DrawableImage, PhotoTransform)>,
    pub frame: Option<&'a DrawableImage>,
}

/// The offscreen drawing surface at logical output resolution.
pub struct Surface {
    canvas: Canvas,
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    renders: u64,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("canvas", &self.canvas)
            .field("renders", &self.renders)
            .finish()
    }
}

impl Surface {
    pub fn new(canvas: Canvas) -> StoryframeResult<Self> {
        canvas.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| StoryframeError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| StoryframeError::render("surface height exceeds u16"))?;
        Ok(Self {
            canvas,
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            ctx: None,
            renders: 0,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// How many composites this surface has drawn.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Paint background, then photo, then the frame stretched over the whole canvas.
    pub fn render(&mut self, scene: &Scene<'_>) {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == self.width && ctx.height() == self.height => ctx,
            _ => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let full = vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        );

        let [r, g, b, a] = scene.background_rgba;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&full);

        if let Some((photo, transform)) = scene.photo {
            ctx.set_transform(affine_to_cpu(transform.to_affine()));
            ctx.set_paint(photo.paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(photo.width),
                f64::from(photo.height),
            ));
        }

        if let Some(frame) = scene.frame {
            let stretch = Affine::scale_non_uniform(
                f64::from(self.canvas.width) / f64::from(frame.width.max(1)),
                f64::from(self.canvas.height) / f64::from(frame.height.max(1)),
            );
            ctx.set_transform(affine_to_cpu(stretch));
            ctx.set_paint(frame.paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(frame.width),
                f64::from(frame.height),
            ));
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        self.ctx = Some(ctx);
        self.renders += 1;
    }

    /// Premultiplied RGBA8 of the last render.
    pub fn data_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Straight RGBA8 copy of the last render.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StoryframeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryframeError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryframeError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StoryframeError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
