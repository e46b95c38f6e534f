//! Backend trait definitions.
//!
//! The core never calls platform APIs directly. Rendering goes through
//! [`GraphicsBackend`], raw input through [`InputBackend`], and video/audio
//! decoding through [`MediaBackend`].
//!
//! # Coordinates and surfaces
//!
//! All drawing uses screen space: origin top-left, y down, in pixels.
//! Off-screen surfaces are stored bottom-up, so blitting one to the screen
//! the right way up needs a source rectangle with a negative height (see
//! [`Rect::flipped_y`]).

use std::path::Path;

pub use crate::color::Color;
use crate::error::Result;
pub use crate::geometry::{Rect, Vec2};
use crate::input::InputEvent;

/// Opaque handle to an off-screen color surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Opaque handle to a loaded shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u64);

/// Location of a named uniform inside a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Opaque handle to an RGBA texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Rendering backend.
///
/// Drawing happens between `begin_surface`/`end_surface` (into an off-screen
/// surface) or directly into the screen framebuffer when no surface is bound.
/// While a shader is bound with `begin_shader`, every pixel written passes
/// through it.
pub trait GraphicsBackend {
    /// Current drawable size of the window in pixels.
    fn screen_size(&self) -> (u32, u32);

    // -- Surfaces ------------------------------------------------------------

    /// Allocate an off-screen RGBA surface, cleared to transparent.
    fn create_surface(&mut self, width: u32, height: u32) -> Result<SurfaceId>;

    /// Release a surface. Unknown ids are ignored.
    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<()>;

    /// Redirect subsequent drawing into `surface`.
    fn begin_surface(&mut self, surface: SurfaceId) -> Result<()>;

    /// Return drawing to the previous target.
    fn end_surface(&mut self) -> Result<()>;

    // -- Shaders -------------------------------------------------------------

    /// Load and compile a shader program from a source file.
    fn load_shader(&mut self, path: &Path) -> Result<ShaderId>;

    /// Release a shader program. Unknown ids are ignored.
    fn unload_shader(&mut self, shader: ShaderId);

    /// Look up a uniform by name. `None` if the program does not declare it.
    fn uniform_location(&self, shader: ShaderId, name: &str) -> Option<UniformLocation>;

    /// Set a 4-component float uniform.
    fn set_uniform_vec4(
        &mut self,
        shader: ShaderId,
        location: UniformLocation,
        value: [f32; 4],
    ) -> Result<()>;

    /// Run subsequent pixel writes through `shader`.
    fn begin_shader(&mut self, shader: ShaderId) -> Result<()>;

    /// Stop shading.
    fn end_shader(&mut self) -> Result<()>;

    // -- Primitives ----------------------------------------------------------

    /// Fill the current target (ignores clipping).
    fn clear(&mut self, color: Color) -> Result<()>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    /// Filled rectangle with rounded corners. `radius` is clamped to half
    /// the smaller side.
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) -> Result<()> {
        let _ = radius;
        self.fill_rect(rect, color)
    }

    /// Rounded rectangle outline drawn inward from `rect`.
    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        thickness: f32,
        color: Color,
    ) -> Result<()> {
        let _ = radius;
        let t = thickness.max(1.0);
        self.fill_rect(Rect::new(rect.x, rect.y, rect.w, t), color)?;
        self.fill_rect(Rect::new(rect.x, rect.bottom() - t, rect.w, t), color)?;
        self.fill_rect(
            Rect::new(rect.x, rect.y + t, t, (rect.h - t * 2.0).max(0.0)),
            color,
        )?;
        self.fill_rect(
            Rect::new(rect.right() - t, rect.y + t, t, (rect.h - t * 2.0).max(0.0)),
            color,
        )
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) -> Result<()>;

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<()>;

    /// Draw text with the built-in font; `pos` is the top-left corner.
    fn draw_text(&mut self, text: &str, pos: Vec2, font_size: u16, color: Color) -> Result<()>;

    /// Size of `text` at `font_size`.
    fn measure_text(&self, text: &str, font_size: u16) -> Vec2;

    /// Restrict drawing to the intersection of `rect` and the current clip.
    fn push_clip(&mut self, rect: Rect) -> Result<()>;

    fn pop_clip(&mut self) -> Result<()>;

    // -- Textures ------------------------------------------------------------

    /// Upload tightly packed RGBA pixels (top row first).
    fn load_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureId>;

    /// Replace a texture's pixels; the size may change.
    fn update_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<()>;

    fn destroy_texture(&mut self, texture: TextureId) -> Result<()>;

    /// Draw `src` of a texture into `dst`, multiplied by `tint`.
    fn draw_texture(&mut self, texture: TextureId, src: Rect, dst: Rect, tint: Color)
    -> Result<()>;

    /// Draw `src` of a surface into `dst`, multiplied by `tint`.
    ///
    /// A negative `src.h` reads rows in reverse order.
    fn draw_surface(&mut self, surface: SurfaceId, src: Rect, dst: Rect, tint: Color)
    -> Result<()>;

    // -- Frame ---------------------------------------------------------------

    /// Read back the screen framebuffer as RGBA, top row first.
    fn read_screen(&self) -> Result<Vec<u8>>;
}

/// Input backend.
///
/// Maps platform-specific input to the platform-agnostic `InputEvent` enum.
pub trait InputBackend {
    /// Poll for pending input events.
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

/// Playback state reported by a media backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

/// A decoded video frame borrowed from the media backend.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA, top row first.
    pub rgba: &'a [u8],
    /// Increments every time a new frame is decoded.
    pub sequence: u64,
}

/// Video/audio decoding and playback timing.
pub trait MediaBackend {
    /// Open a stream and start playing it. Replaces any loaded stream.
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Close the current stream, if any.
    fn unload(&mut self);

    /// Advance decoding by `dt` seconds of playback.
    fn advance(&mut self, dt: f32);

    fn state(&self) -> PlaybackState;

    fn play(&mut self);

    fn pause(&mut self);

    /// Restart from the beginning at end of stream instead of stopping.
    fn set_looping(&mut self, looping: bool);

    /// Output volume, `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);

    /// The most recently decoded frame.
    fn current_frame(&self) -> Option<VideoFrame<'_>>;
}
