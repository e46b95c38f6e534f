//! Software RGBA rasterizer.
//!
//! Implements [`GraphicsBackend`] by drawing into CPU pixel buffers. The
//! screen framebuffer is stored top row first so it can be handed to SDL as
//! is; off-screen surfaces are stored bottom row first, like GPU render
//! targets, so they come out upside down unless blitted with a flipped
//! source rectangle.
//!
//! Every pixel written while a shader is bound goes through
//! [`ShaderProgram::shade`] before blending. Blending is source-over.

use std::collections::HashMap;
use std::path::Path;

use log::debug;

use duotone_types::backend::{GraphicsBackend, ShaderId, SurfaceId, TextureId, UniformLocation};
use duotone_types::bitmap_font;
use duotone_types::color::Color;
use duotone_types::error::{DuotoneError, Result};
use duotone_types::geometry::{Rect, Vec2};

use crate::shader::ShaderProgram;

/// An RGBA pixel buffer.
struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    /// Row 0 of `pixels` is the bottom row.
    bottom_up: bool,
}

impl Canvas {
    fn new(width: u32, height: u32, bottom_up: bool) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            bottom_up,
        }
    }

    /// Wrap tightly packed RGBA rows, top row first.
    fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba.len() != expected {
            return Err(DuotoneError::Backend(format!(
                "texture data size mismatch: expected {expected}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: rgba.to_vec(),
            bottom_up: false,
        })
    }

    /// Byte offset of the pixel at column `x`, `y` rows from the top.
    fn offset(&self, x: u32, y: u32) -> usize {
        let row = if self.bottom_up {
            self.height - 1 - y
        } else {
            y
        };
        ((row as usize) * (self.width as usize) + x as usize) * 4
    }

    /// Pixel at column `x` of storage row `row`.
    fn stored(&self, x: u32, row: u32) -> Color {
        let i = ((row as usize) * (self.width as usize) + x as usize) * 4;
        Color::rgba(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    fn fill(&mut self, color: Color) {
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    fn bounds(&self) -> ClipRect {
        ClipRect {
            x: 0,
            y: 0,
            w: self.width,
            h: self.height,
        }
    }
}

/// Integer clip rectangle in target pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClipRect {
    x: i32,
    y: i32,
    w: u32,
    h: u32,
}

impl ClipRect {
    const EMPTY: Self = Self {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    };

    /// Pixels whose centers lie inside `rect`.
    fn covering(rect: Rect) -> Self {
        let (x0, y0, x1, y1) = pixel_bounds(rect);
        Self {
            x: x0,
            y: y0,
            w: (x1 - x0).max(0) as u32,
            h: (y1 - y0).max(0) as u32,
        }
    }

    fn right(&self) -> i32 {
        self.x.saturating_add(self.w as i32)
    }

    fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h as i32)
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }
}

/// Compute the intersection of two clip rectangles.
fn intersect_clip(a: &ClipRect, b: &ClipRect) -> Option<ClipRect> {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let x2 = a.right().min(b.right());
    let y2 = a.bottom().min(b.bottom());
    if x2 > x && y2 > y {
        Some(ClipRect {
            x,
            y,
            w: (x2 - x) as u32,
            h: (y2 - y) as u32,
        })
    } else {
        None
    }
}

/// Half-open pixel range `(x0, y0, x1, y1)` covered by `rect`.
fn pixel_bounds(rect: Rect) -> (i32, i32, i32, i32) {
    let (left, right) = if rect.w < 0.0 {
        (rect.x + rect.w, rect.x)
    } else {
        (rect.x, rect.x + rect.w)
    };
    let (top, bottom) = if rect.h < 0.0 {
        (rect.y + rect.h, rect.y)
    } else {
        (rect.y, rect.y + rect.h)
    };
    (
        left.round() as i32,
        top.round() as i32,
        right.round() as i32,
        bottom.round() as i32,
    )
}

/// Horizontal inset of a rounded rectangle's edge on a row whose center is
/// `py` pixels below the top, for a rectangle of height `h` and corner
/// radius `r`.
fn corner_inset(h: f32, r: f32, py: f32) -> f32 {
    let dy = if py < r {
        r - py
    } else if py > h - r {
        py - (h - r)
    } else {
        return 0.0;
    };
    r - (r * r - dy * dy).max(0.0).sqrt()
}

/// Source-over blend of `src` into one RGBA pixel.
fn blend_over(dst: &mut [u8], src: Color) {
    if src.a == 255 {
        dst.copy_from_slice(&[src.r, src.g, src.b, 255]);
        return;
    }
    let sa = src.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for (d, s) in dst.iter_mut().zip([src.r, src.g, src.b]) {
        let mixed = (s as f32 * sa + *d as f32 * da * (1.0 - sa)) / out_a;
        *d = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Component-wise multiply, the way a tinted textured quad is shaded.
fn modulate(c: Color, tint: Color) -> Color {
    let m = |a: u8, b: u8| ((a as u32 * b as u32 + 127) / 255) as u8;
    Color::rgba(m(c.r, tint.r), m(c.g, tint.g), m(c.b, tint.b), m(c.a, tint.a))
}

/// Resolve the current render target.
fn target_canvas<'a>(
    screen: &'a mut Canvas,
    surfaces: &'a mut HashMap<SurfaceId, Canvas>,
    targets: &[SurfaceId],
) -> Result<&'a mut Canvas> {
    match targets.last() {
        Some(id) => surfaces
            .get_mut(id)
            .ok_or_else(|| DuotoneError::Backend(format!("surface {} destroyed while bound", id.0))),
        None => Ok(screen),
    }
}

/// Write access to the current target with clip and shader resolved.
struct Painter<'a> {
    canvas: &'a mut Canvas,
    clip: ClipRect,
    shader: Option<(&'a ShaderProgram, (Color, Color))>,
}

impl Painter<'_> {
    fn plot(&mut self, x: i32, y: i32, color: Color) {
        if !self.clip.contains(x, y) {
            return;
        }
        let color = match self.shader {
            Some((shader, colors)) => shader.shade(colors, x, y, color),
            None => color,
        };
        if color.a == 0 {
            return;
        }
        let i = self.canvas.offset(x as u32, y as u32);
        blend_over(&mut self.canvas.pixels[i..i + 4], color);
    }

    /// Fill pixels `x0..x1` of row `y`.
    fn span(&mut self, x0: i32, x1: i32, y: i32, color: Color) {
        if y < self.clip.y || y >= self.clip.bottom() {
            return;
        }
        for x in x0.max(self.clip.x)..x1.min(self.clip.right()) {
            self.plot(x, y, color);
        }
    }
}

/// CPU implementation of [`GraphicsBackend`].
pub struct SoftRenderer {
    screen: Canvas,
    surfaces: HashMap<SurfaceId, Canvas>,
    textures: HashMap<TextureId, Canvas>,
    shaders: HashMap<ShaderId, ShaderProgram>,
    /// Bound surfaces, innermost last. Empty means the screen.
    targets: Vec<SurfaceId>,
    clip_stack: Vec<ClipRect>,
    active_shader: Option<ShaderId>,
    next_id: u64,
}

impl SoftRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen: Canvas::new(width.max(1), height.max(1), false),
            surfaces: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            targets: Vec::new(),
            clip_stack: Vec::new(),
            active_shader: None,
            next_id: 1,
        }
    }

    /// Reallocate the screen framebuffer. Surfaces are left to their owner.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.screen.width, self.screen.height) {
            return;
        }
        debug!("framebuffer resized to {width}x{height}");
        self.screen = Canvas::new(width, height, false);
    }

    /// The screen framebuffer, RGBA, top row first.
    pub fn pixels(&self) -> &[u8] {
        &self.screen.pixels
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn painter(&mut self) -> Result<Painter<'_>> {
        let canvas = target_canvas(&mut self.screen, &mut self.surfaces, &self.targets)?;
        let bounds = canvas.bounds();
        let clip = match self.clip_stack.last() {
            Some(clip) => intersect_clip(clip, &bounds).unwrap_or(ClipRect::EMPTY),
            None => bounds,
        };
        let shader = self
            .active_shader
            .and_then(|id| self.shaders.get(&id))
            .map(|s| (s, s.colors()));
        Ok(Painter {
            canvas,
            clip,
            shader,
        })
    }

    /// Nearest-neighbour copy of `src` (in `source` storage rows) to `dst`.
    fn blit(&mut self, source: &Canvas, src: Rect, dst: Rect, tint: Color) -> Result<()> {
        let (x0, y0, x1, y1) = pixel_bounds(dst);
        if x1 <= x0 || y1 <= y0 || source.width == 0 || source.height == 0 {
            return Ok(());
        }
        // A negative extent walks the source backwards from its far edge.
        let origin_x = src.x + (-src.w).max(0.0);
        let origin_y = src.y + (-src.h).max(0.0);
        let max_x = source.width as f32 - 1.0;
        let max_y = source.height as f32 - 1.0;

        let mut painter = self.painter()?;
        for y in y0.max(painter.clip.y)..y1.min(painter.clip.bottom()) {
            let t = (y as f32 + 0.5 - dst.y) / dst.h;
            let row = (origin_y + t * src.h).floor().clamp(0.0, max_y) as u32;
            for x in x0.max(painter.clip.x)..x1.min(painter.clip.right()) {
                let s = (x as f32 + 0.5 - dst.x) / dst.w;
                let col = (origin_x + s * src.w).floor().clamp(0.0, max_x) as u32;
                painter.plot(x, y, modulate(source.stored(col, row), tint));
            }
        }
        Ok(())
    }
}

impl GraphicsBackend for SoftRenderer {
    fn screen_size(&self) -> (u32, u32) {
        (self.screen.width, self.screen.height)
    }

    fn create_surface(&mut self, width: u32, height: u32) -> Result<SurfaceId> {
        let id = SurfaceId(self.next_id());
        self.surfaces
            .insert(id, Canvas::new(width.max(1), height.max(1), true));
        Ok(id)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<()> {
        self.surfaces.remove(&surface);
        Ok(())
    }

    fn begin_surface(&mut self, surface: SurfaceId) -> Result<()> {
        if !self.surfaces.contains_key(&surface) {
            return Err(DuotoneError::Backend(format!("surface not found: {}", surface.0)));
        }
        self.targets.push(surface);
        Ok(())
    }

    fn end_surface(&mut self) -> Result<()> {
        self.targets
            .pop()
            .map(|_| ())
            .ok_or_else(|| DuotoneError::Backend("end_surface without begin_surface".into()))
    }

    fn load_shader(&mut self, path: &Path) -> Result<ShaderId> {
        let program = ShaderProgram::from_file(path)?;
        let id = ShaderId(self.next_id());
        debug!("shader {} loaded from {}", id.0, path.display());
        self.shaders.insert(id, program);
        Ok(id)
    }

    fn unload_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
        if self.active_shader == Some(shader) {
            self.active_shader = None;
        }
    }

    fn uniform_location(&self, shader: ShaderId, name: &str) -> Option<UniformLocation> {
        self.shaders.get(&shader)?.uniform_location(name)
    }

    fn set_uniform_vec4(
        &mut self,
        shader: ShaderId,
        location: UniformLocation,
        value: [f32; 4],
    ) -> Result<()> {
        self.shaders
            .get_mut(&shader)
            .ok_or_else(|| DuotoneError::Shader(format!("shader not found: {}", shader.0)))?
            .set_uniform(location, value)
    }

    fn begin_shader(&mut self, shader: ShaderId) -> Result<()> {
        if !self.shaders.contains_key(&shader) {
            return Err(DuotoneError::Shader(format!("shader not found: {}", shader.0)));
        }
        self.active_shader = Some(shader);
        Ok(())
    }

    fn end_shader(&mut self) -> Result<()> {
        self.active_shader = None;
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        target_canvas(&mut self.screen, &mut self.surfaces, &self.targets)?.fill(color);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        let (x0, y0, x1, y1) = pixel_bounds(rect);
        let mut painter = self.painter()?;
        for y in y0..y1 {
            painter.span(x0, x1, y, color);
        }
        Ok(())
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) -> Result<()> {
        let r = radius.min(rect.w / 2.0).min(rect.h / 2.0);
        if r < 0.5 {
            return self.fill_rect(rect, color);
        }
        let (_, y0, _, y1) = pixel_bounds(rect);
        let mut painter = self.painter()?;
        for y in y0..y1 {
            let inset = corner_inset(rect.h, r, y as f32 + 0.5 - rect.y);
            painter.span(
                (rect.x + inset).round() as i32,
                (rect.right() - inset).round() as i32,
                y,
                color,
            );
        }
        Ok(())
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        thickness: f32,
        color: Color,
    ) -> Result<()> {
        let t = thickness.max(1.0);
        let r = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
        let inner = rect.inset(t);
        let inner_r = (r - t).max(0.0);
        let (_, y0, _, y1) = pixel_bounds(rect);
        let mut painter = self.painter()?;
        for y in y0..y1 {
            let py = y as f32 + 0.5;
            let outer = corner_inset(rect.h, r, py - rect.y);
            let (ox0, ox1) = (
                (rect.x + outer).round() as i32,
                (rect.right() - outer).round() as i32,
            );
            if inner.w <= 0.0 || py < inner.y || py >= inner.bottom() {
                painter.span(ox0, ox1, y, color);
                continue;
            }
            let hole = corner_inset(inner.h, inner_r, py - inner.y);
            let (ix0, ix1) = (
                (inner.x + hole).round() as i32,
                (inner.right() - hole).round() as i32,
            );
            painter.span(ox0, ix0, y, color);
            painter.span(ix1, ox1, y, color);
        }
        Ok(())
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) -> Result<()> {
        let half = thickness.max(1.0) / 2.0;
        let d = to - from;
        let len_sq = d.x * d.x + d.y * d.y;
        let x0 = (from.x.min(to.x) - half).floor() as i32;
        let x1 = (from.x.max(to.x) + half).ceil() as i32;
        let y0 = (from.y.min(to.y) - half).floor() as i32;
        let y1 = (from.y.max(to.y) + half).ceil() as i32;

        let mut painter = self.painter()?;
        for y in y0..y1 {
            for x in x0..x1 {
                // Distance from the pixel center to the segment.
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - from;
                let t = if len_sq > 0.0 {
                    ((p.x * d.x + p.y * d.y) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                if (p - d * t).length() <= half {
                    painter.plot(x, y, color);
                }
            }
        }
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<()> {
        if radius <= 0.0 {
            return Ok(());
        }
        let y0 = (center.y - radius).floor() as i32;
        let y1 = (center.y + radius).ceil() as i32;
        let mut painter = self.painter()?;
        for y in y0..y1 {
            let py = y as f32 + 0.5 - center.y;
            if py.abs() > radius {
                continue;
            }
            let half = (radius * radius - py * py).sqrt();
            painter.span(
                (center.x - half).round() as i32,
                (center.x + half).round() as i32,
                y,
                color,
            );
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, font_size: u16, color: Color) -> Result<()> {
        let scale = bitmap_font::scale_for(font_size) as i32;
        let glyph_w = bitmap_font::GLYPH_WIDTH as i32 * scale;
        let (tx, ty) = (pos.x.round() as i32, pos.y.round() as i32);

        let mut painter = self.painter()?;
        let mut cx = tx;
        for ch in text.chars() {
            for (row, bits) in bitmap_font::glyph(ch).iter().enumerate() {
                for col in 0..bitmap_font::GLYPH_WIDTH {
                    if !bitmap_font::row_bit(*bits, col) {
                        continue;
                    }
                    let px = cx + col as i32 * scale;
                    let py = ty + row as i32 * scale;
                    for sy in 0..scale {
                        painter.span(px, px + scale, py + sy, color);
                    }
                }
            }
            cx += glyph_w;
        }
        Ok(())
    }

    fn measure_text(&self, text: &str, font_size: u16) -> Vec2 {
        let (w, h) = bitmap_font::measure(text, font_size);
        Vec2::new(w as f32, h as f32)
    }

    fn push_clip(&mut self, rect: Rect) -> Result<()> {
        let new_clip = ClipRect::covering(rect);
        let clip = match self.clip_stack.last() {
            Some(current) => intersect_clip(current, &new_clip).unwrap_or(ClipRect::EMPTY),
            None => new_clip,
        };
        self.clip_stack.push(clip);
        Ok(())
    }

    fn pop_clip(&mut self) -> Result<()> {
        self.clip_stack.pop();
        Ok(())
    }

    fn load_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureId> {
        let canvas = Canvas::from_rgba(width, height, rgba)?;
        let id = TextureId(self.next_id());
        self.textures.insert(id, canvas);
        Ok(id)
    }

    fn update_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<()> {
        let slot = self
            .textures
            .get_mut(&texture)
            .ok_or_else(|| DuotoneError::Backend(format!("texture not found: {}", texture.0)))?;
        if slot.width == width && slot.height == height && slot.pixels.len() == rgba.len() {
            slot.pixels.copy_from_slice(rgba);
        } else {
            *slot = Canvas::from_rgba(width, height, rgba)?;
        }
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) -> Result<()> {
        self.textures.remove(&texture);
        Ok(())
    }

    fn draw_texture(&mut self, texture: TextureId, src: Rect, dst: Rect, tint: Color) -> Result<()> {
        let source = self
            .textures
            .remove(&texture)
            .ok_or_else(|| DuotoneError::Backend(format!("texture not found: {}", texture.0)))?;
        let drawn = self.blit(&source, src, dst, tint);
        self.textures.insert(texture, source);
        drawn
    }

    fn draw_surface(&mut self, surface: SurfaceId, src: Rect, dst: Rect, tint: Color) -> Result<()> {
        if self.targets.last() == Some(&surface) {
            return Err(DuotoneError::Backend(format!(
                "surface {} drawn into itself",
                surface.0
            )));
        }
        let source = self
            .surfaces
            .remove(&surface)
            .ok_or_else(|| DuotoneError::Backend(format!("surface not found: {}", surface.0)))?;
        let drawn = self.blit(&source, src, dst, tint);
        self.surfaces.insert(surface, source);
        drawn
    }

    fn read_screen(&self) -> Result<Vec<u8>> {
        Ok(self.screen.pixels.clone())
    }
}
