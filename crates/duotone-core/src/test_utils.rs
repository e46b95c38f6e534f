//! Shared test utilities for duotone-core tests.
//!
//! Provides a [`MockBackend`] that records all draw calls for assertion, a
//! scriptable [`MockMedia`], and an in-memory [`MemFileSystem`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use duotone_types::backend::{
    GraphicsBackend, MediaBackend, PlaybackState, ShaderId, SurfaceId, TextureId,
    UniformLocation, VideoFrame,
};
use duotone_types::bitmap_font;
use duotone_types::color::Color;
use duotone_types::error::{DuotoneError, Result};
use duotone_types::geometry::{Rect, Vec2};

use crate::directory::{FileSystem, FsEntry};

/// A recorded call on the mock backend.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum DrawCall {
    Clear(Color),
    FillRect { rect: Rect, color: Color },
    FillRoundedRect { rect: Rect, radius: f32, color: Color },
    StrokeRoundedRect { rect: Rect, color: Color },
    Line { from: Vec2, to: Vec2, color: Color },
    FillCircle { center: Vec2, radius: f32, color: Color },
    Text { text: String, pos: Vec2, font_size: u16, color: Color },
    Texture { texture: TextureId, src: Rect, dst: Rect, tint: Color },
    Surface { surface: SurfaceId, src: Rect, dst: Rect, tint: Color },
    BeginSurface(SurfaceId),
    EndSurface,
    BeginShader(ShaderId),
    EndShader,
    SetUniform { shader: ShaderId, location: UniformLocation, value: [f32; 4] },
    PushClip(Rect),
    PopClip,
}

impl DrawCall {
    /// Color of a primitive, if the call draws one.
    pub fn color(&self) -> Option<Color> {
        match self {
            DrawCall::Clear(color)
            | DrawCall::FillRect { color, .. }
            | DrawCall::FillRoundedRect { color, .. }
            | DrawCall::StrokeRoundedRect { color, .. }
            | DrawCall::Line { color, .. }
            | DrawCall::FillCircle { color, .. }
            | DrawCall::Text { color, .. } => Some(*color),
            DrawCall::Texture { tint, .. } | DrawCall::Surface { tint, .. } => Some(*tint),
            _ => None,
        }
    }
}

/// A mock backend that records all draw calls for test assertions.
pub struct MockBackend {
    pub calls: Vec<DrawCall>,
    pub size: (u32, u32),
    /// Shader paths that fail to load.
    pub failing_shaders: Vec<PathBuf>,
    /// Uniform names every shader declares.
    pub known_uniforms: Vec<String>,
    pub unloaded_shaders: Vec<ShaderId>,
    pub created_surfaces: Vec<(SurfaceId, u32, u32)>,
    pub destroyed_surfaces: Vec<SurfaceId>,
    /// Texture uploads as `(id, width, height)`, creations and updates alike.
    pub texture_uploads: Vec<(TextureId, u32, u32)>,
    next_id: u64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            size: (1280, 720),
            failing_shaders: Vec::new(),
            known_uniforms: vec!["lightColor".to_string(), "darkColor".to_string()],
            unloaded_shaders: Vec::new(),
            created_surfaces: Vec::new(),
            destroyed_surfaces: Vec::new(),
            texture_uploads: Vec::new(),
            next_id: 1,
        }
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Count of `FillRect` calls.
    pub fn fill_rect_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::FillRect { .. }))
            .count()
    }

    /// Text draw calls as `(text, x, y)`, in draw order.
    pub fn text_positions(&self) -> Vec<(&str, f32, f32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, pos, .. } => Some((text.as_str(), pos.x, pos.y)),
                _ => None,
            })
            .collect()
    }

    /// Whether any text call contains `needle`.
    pub fn has_text(&self, needle: &str) -> bool {
        self.text_positions().iter().any(|(t, _, _)| t.contains(needle))
    }

    /// Alpha of the first text call containing `needle`.
    pub fn text_alpha(&self, needle: &str) -> Option<u8> {
        self.calls.iter().find_map(|c| match c {
            DrawCall::Text { text, color, .. } if text.contains(needle) => Some(color.a),
            _ => None,
        })
    }
}

impl GraphicsBackend for MockBackend {
    fn screen_size(&self) -> (u32, u32) {
        self.size
    }

    fn create_surface(&mut self, width: u32, height: u32) -> Result<SurfaceId> {
        let id = SurfaceId(self.next());
        self.created_surfaces.push((id, width, height));
        Ok(id)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<()> {
        self.destroyed_surfaces.push(surface);
        Ok(())
    }

    fn begin_surface(&mut self, surface: SurfaceId) -> Result<()> {
        self.calls.push(DrawCall::BeginSurface(surface));
        Ok(())
    }

    fn end_surface(&mut self) -> Result<()> {
        self.calls.push(DrawCall::EndSurface);
        Ok(())
    }

    fn load_shader(&mut self, path: &Path) -> Result<ShaderId> {
        if self.failing_shaders.iter().any(|p| p == path) {
            return Err(DuotoneError::Shader(format!("{}: not found", path.display())));
        }
        Ok(ShaderId(self.next()))
    }

    fn unload_shader(&mut self, shader: ShaderId) {
        self.unloaded_shaders.push(shader);
    }

    fn uniform_location(&self, _shader: ShaderId, name: &str) -> Option<UniformLocation> {
        self.known_uniforms
            .iter()
            .position(|n| n == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn set_uniform_vec4(
        &mut self,
        shader: ShaderId,
        location: UniformLocation,
        value: [f32; 4],
    ) -> Result<()> {
        self.calls.push(DrawCall::SetUniform {
            shader,
            location,
            value,
        });
        Ok(())
    }

    fn begin_shader(&mut self, shader: ShaderId) -> Result<()> {
        self.calls.push(DrawCall::BeginShader(shader));
        Ok(())
    }

    fn end_shader(&mut self) -> Result<()> {
        self.calls.push(DrawCall::EndShader);
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.calls.push(DrawCall::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.calls.push(DrawCall::FillRect { rect, color });
        Ok(())
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) -> Result<()> {
        self.calls.push(DrawCall::FillRoundedRect {
            rect,
            radius,
            color,
        });
        Ok(())
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        _radius: f32,
        _thickness: f32,
        color: Color,
    ) -> Result<()> {
        self.calls.push(DrawCall::StrokeRoundedRect { rect, color });
        Ok(())
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, _thickness: f32, color: Color) -> Result<()> {
        self.calls.push(DrawCall::Line { from, to, color });
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<()> {
        self.calls.push(DrawCall::FillCircle {
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, font_size: u16, color: Color) -> Result<()> {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            pos,
            font_size,
            color,
        });
        Ok(())
    }

    fn measure_text(&self, text: &str, font_size: u16) -> Vec2 {
        let (w, h) = bitmap_font::measure(text, font_size);
        Vec2::new(w as f32, h as f32)
    }

    fn push_clip(&mut self, rect: Rect) -> Result<()> {
        self.calls.push(DrawCall::PushClip(rect));
        Ok(())
    }

    fn pop_clip(&mut self) -> Result<()> {
        self.calls.push(DrawCall::PopClip);
        Ok(())
    }

    fn load_texture(&mut self, width: u32, height: u32, _rgba: &[u8]) -> Result<TextureId> {
        let id = TextureId(self.next());
        self.texture_uploads.push((id, width, height));
        Ok(id)
    }

    fn update_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        _rgba: &[u8],
    ) -> Result<()> {
        self.texture_uploads.push((texture, width, height));
        Ok(())
    }

    fn destroy_texture(&mut self, _texture: TextureId) -> Result<()> {
        Ok(())
    }

    fn draw_texture(&mut self, texture: TextureId, src: Rect, dst: Rect, tint: Color) -> Result<()> {
        self.calls.push(DrawCall::Texture {
            texture,
            src,
            dst,
            tint,
        });
        Ok(())
    }

    fn draw_surface(&mut self, surface: SurfaceId, src: Rect, dst: Rect, tint: Color) -> Result<()> {
        self.calls.push(DrawCall::Surface {
            surface,
            src,
            dst,
            tint,
        });
        Ok(())
    }

    fn read_screen(&self) -> Result<Vec<u8>> {
        Ok(vec![0; (self.size.0 * self.size.1 * 4) as usize])
    }
}

/// A media backend whose behaviour tests can script.
pub struct MockMedia {
    pub loaded: Option<PathBuf>,
    pub load_count: usize,
    pub fail_loads: bool,
    pub state: PlaybackState,
    pub looping: bool,
    pub volume: f32,
    /// Total seconds passed to `advance`.
    pub advanced: f32,
    /// Size of the frame exposed while loaded.
    pub frame_size: (u32, u32),
    pub sequence: u64,
    pixels: Vec<u8>,
}

impl MockMedia {
    pub fn new() -> Self {
        Self {
            loaded: None,
            load_count: 0,
            fail_loads: false,
            state: PlaybackState::Stopped,
            looping: false,
            volume: 1.0,
            advanced: 0.0,
            frame_size: (320, 180),
            sequence: 0,
            pixels: Vec::new(),
        }
    }
}

impl MediaBackend for MockMedia {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.load_count += 1;
        if self.fail_loads {
            return Err(DuotoneError::Media(format!("{}: cannot decode", path.display())));
        }
        self.loaded = Some(path.to_path_buf());
        self.state = PlaybackState::Playing;
        let (w, h) = self.frame_size;
        self.pixels = vec![128; (w * h * 4) as usize];
        self.sequence += 1;
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = None;
        self.state = PlaybackState::Stopped;
    }

    fn advance(&mut self, dt: f32) {
        self.advanced += dt;
        if self.state == PlaybackState::Playing {
            self.sequence += 1;
        }
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn play(&mut self) {
        if self.loaded.is_some() {
            self.state = PlaybackState::Playing;
        }
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn current_frame(&self) -> Option<VideoFrame<'_>> {
        self.loaded.as_ref()?;
        Some(VideoFrame {
            width: self.frame_size.0,
            height: self.frame_size.1,
            rgba: &self.pixels,
            sequence: self.sequence,
        })
    }
}

/// In-memory [`FileSystem`] whose working directory is `/` unless set.
/// Unknown paths fail with `NotFound`.
pub struct MemFileSystem {
    dirs: HashMap<PathBuf, Vec<FsEntry>>,
    cwd: PathBuf,
}

impl MemFileSystem {
    pub fn new() -> Self {
        Self {
            dirs: HashMap::new(),
            cwd: PathBuf::from("/"),
        }
    }

    pub fn set_current_dir(&mut self, path: impl Into<PathBuf>) {
        self.cwd = path.into();
    }

    pub fn add_dir(&mut self, path: impl Into<PathBuf>, entries: Vec<FsEntry>) {
        self.dirs.insert(path.into(), entries);
    }
}

impl Default for MemFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemFileSystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        self.dirs
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}
