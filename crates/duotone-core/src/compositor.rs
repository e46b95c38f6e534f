//! Dual-surface frame compositor.
//!
//! Each frame the UI is drawn into the primary surface: background first,
//! then the transition's target screen, then (while a transition runs) the
//! outgoing screen on top so it fades out over the incoming one. The video
//! frame goes through the color-map shader into the secondary surface. Both
//! are then blitted to the screen, the primary through the dither shader at
//! full opacity and the video on top at the viewer's blend factor.
//!
//! Surfaces are stored bottom-up, so every blit uses a flipped source rect.

use log::debug;

use duotone_types::backend::{GraphicsBackend, MediaBackend, SurfaceId, TextureId, VideoFrame};
use duotone_types::color::Color;
use duotone_types::error::Result;
use duotone_types::geometry::Rect;
use duotone_types::input::FrameInput;

use crate::app::AppState;
use crate::palette::ShaderSet;
use crate::screen::ScreenKind;
use crate::screens::{self, ScreenCtx};
use crate::ui::{DrawContext, HoverScales, colors};
use crate::viewer::aspect_fit;

/// How far the background follows the pointer, relative to its distance
/// from the screen center.
const POINTER_SWAY: f32 = 0.05;

/// The incoming screen ignores clicks until it is this far faded in.
const CLICK_ALPHA: f32 = 0.9;

#[derive(Debug, Clone, Copy)]
struct VideoTexture {
    id: TextureId,
    width: u32,
    height: u32,
    sequence: u64,
}

#[derive(Debug, Default)]
pub struct Compositor {
    primary: Option<SurfaceId>,
    secondary: Option<SurfaceId>,
    size: (u32, u32),
    video: Option<VideoTexture>,
    hover: HoverScales,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the surfaces were last allocated at.
    pub fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    /// (Re)create both surfaces when the window size changed.
    fn ensure_surfaces(&mut self, gfx: &mut dyn GraphicsBackend) -> Result<(SurfaceId, SurfaceId)> {
        let size = gfx.screen_size();
        if let (Some(primary), Some(secondary)) = (self.primary, self.secondary) {
            if size == self.size {
                return Ok((primary, secondary));
            }
        }
        self.release_surfaces(gfx)?;
        let (w, h) = (size.0.max(1), size.1.max(1));
        let primary = gfx.create_surface(w, h)?;
        let secondary = gfx.create_surface(w, h)?;
        debug!("surfaces allocated at {w}x{h}");
        self.primary = Some(primary);
        self.secondary = Some(secondary);
        self.size = size;
        Ok((primary, secondary))
    }

    fn release_surfaces(&mut self, gfx: &mut dyn GraphicsBackend) -> Result<()> {
        for surface in [self.primary.take(), self.secondary.take()].into_iter().flatten() {
            gfx.destroy_surface(surface)?;
        }
        Ok(())
    }

    /// Free every backend resource the compositor holds.
    pub fn release(&mut self, gfx: &mut dyn GraphicsBackend) -> Result<()> {
        self.release_surfaces(gfx)?;
        if let Some(video) = self.video.take() {
            gfx.destroy_texture(video.id)?;
        }
        Ok(())
    }

    /// Render one complete frame to the screen.
    pub fn render_frame(
        &mut self,
        app: &mut AppState,
        gfx: &mut dyn GraphicsBackend,
        media: &mut dyn MediaBackend,
        shaders: &ShaderSet,
        input: &FrameInput,
    ) -> Result<()> {
        let (primary, secondary) = self.ensure_surfaces(gfx)?;
        let bounds = Rect::sized(self.size.0 as f32, self.size.1 as f32);
        app.palettes.normalize();

        gfx.begin_surface(primary)?;
        let drawn = draw_ui(app, gfx, media, shaders, input, bounds, &mut self.hover);
        gfx.end_surface()?;
        drawn?;

        let video_drawn = self.draw_video(app, gfx, media, shaders, secondary, bounds)?;

        gfx.clear(Color::BLACK)?;
        if let Some(dither) = &shaders.dither {
            gfx.begin_shader(dither.id)?;
        }
        gfx.draw_surface(primary, bounds.flipped_y(), bounds, Color::WHITE)?;
        if shaders.dither.is_some() {
            gfx.end_shader()?;
        }

        if video_drawn {
            let alpha = app.transition.blend_for(ScreenKind::Viewing);
            gfx.draw_surface(
                secondary,
                bounds.flipped_y(),
                bounds,
                Color::WHITE.fade(alpha),
            )?;
        }
        Ok(())
    }

    /// Draw the decoded frame into `surface`. Returns whether anything was
    /// drawn.
    fn draw_video(
        &mut self,
        app: &mut AppState,
        gfx: &mut dyn GraphicsBackend,
        media: &dyn MediaBackend,
        shaders: &ShaderSet,
        surface: SurfaceId,
        bounds: Rect,
    ) -> Result<bool> {
        if !app.viewer.loaded || !app.transition.involves(ScreenKind::Viewing) {
            return Ok(false);
        }
        let Some(frame) = media.current_frame() else {
            return Ok(false);
        };
        let texture = self.upload_frame(gfx, &frame)?;
        let rect = aspect_fit(screens::viewer::video_area(bounds), frame.width, frame.height);
        app.viewer.display_rect = rect;

        gfx.begin_surface(surface)?;
        gfx.clear(Color::TRANSPARENT)?;
        if let Some(colormap) = &shaders.colormap {
            gfx.begin_shader(colormap.id)?;
        }
        let src = Rect::sized(frame.width as f32, frame.height as f32);
        let drawn = gfx.draw_texture(texture, src, rect, Color::WHITE);
        if shaders.colormap.is_some() {
            gfx.end_shader()?;
        }
        gfx.end_surface()?;
        drawn?;
        Ok(true)
    }

    /// Upload `frame` unless the texture already holds it.
    fn upload_frame(
        &mut self,
        gfx: &mut dyn GraphicsBackend,
        frame: &VideoFrame<'_>,
    ) -> Result<TextureId> {
        let fresh = VideoTexture {
            id: TextureId(0),
            width: frame.width,
            height: frame.height,
            sequence: frame.sequence,
        };
        if let Some(video) = self.video.as_mut() {
            let stale = video.sequence != frame.sequence
                || video.width != frame.width
                || video.height != frame.height;
            if stale {
                gfx.update_texture(video.id, frame.width, frame.height, frame.rgba)?;
                *video = VideoTexture { id: video.id, ..fresh };
            }
            return Ok(video.id);
        }
        let id = gfx.load_texture(frame.width, frame.height, frame.rgba)?;
        self.video = Some(VideoTexture { id, ..fresh });
        Ok(id)
    }
}

fn draw_ui(
    app: &mut AppState,
    gfx: &mut dyn GraphicsBackend,
    media: &mut dyn MediaBackend,
    shaders: &ShaderSet,
    input: &FrameInput,
    bounds: Rect,
    hover: &mut HoverScales,
) -> Result<()> {
    gfx.clear(colors::BACKGROUND)?;
    let pointer_offset = (input.pointer - bounds.center()) * POINTER_SWAY;
    app.background.draw(
        gfx,
        bounds,
        app.camera.position,
        pointer_offset,
        app.fade.eased(),
        colors::BACKDROP,
    )?;

    // Fix both alphas before any screen can start a new transition.
    let current = app.transition.current();
    let target = app.transition.target();
    let target_alpha = app.transition.blend_for(target);
    let outgoing = (app.transition.is_active() && current != target)
        .then(|| app.transition.blend_for(current));

    let gated;
    let target_input = if target_alpha > CLICK_ALPHA {
        input
    } else {
        gated = FrameInput {
            click: None,
            ..input.clone()
        };
        &gated
    };
    draw_one(app, target, target_alpha, target_input, gfx, media, shaders, bounds, hover)?;
    if let Some(alpha) = outgoing {
        let passive = input.passive();
        draw_one(app, current, alpha, &passive, gfx, media, shaders, bounds, hover)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_one(
    app: &mut AppState,
    screen: ScreenKind,
    alpha: f32,
    input: &FrameInput,
    gfx: &mut dyn GraphicsBackend,
    media: &mut dyn MediaBackend,
    shaders: &ShaderSet,
    bounds: Rect,
    hover: &mut HoverScales,
) -> Result<()> {
    let inverted = app.palettes.inverted;
    let mut ctx = ScreenCtx {
        draw: DrawContext::new(gfx, input, alpha, inverted).with_hover(hover),
        media,
        shaders,
        bounds,
    };
    screens::draw_screen(screen, app, &mut ctx)
}

#[cfg(test)]
mod tests;
