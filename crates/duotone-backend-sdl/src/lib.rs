//! SDL2 backend for duotone.
//!
//! [`SdlBackend`] owns the window, the event pump and the audio subsystem.
//! Drawing is done on the CPU by [`SoftRenderer`]; [`SdlBackend::present`]
//! uploads the finished framebuffer into one streaming texture and shows
//! it. Video and audio come from [`FfmpegMedia`].

pub mod media;
pub mod raster;
pub mod shader;

use std::path::Path;

use sdl2::audio::{AudioQueue, AudioSpecDesired};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::{AudioSubsystem, EventPump};

use duotone_types::backend::{
    GraphicsBackend, InputBackend, ShaderId, SurfaceId, TextureId, UniformLocation,
};
use duotone_types::color::Color;
use duotone_types::error::{DuotoneError, Result};
use duotone_types::geometry::{Rect, Vec2};
use duotone_types::input::{InputEvent, Key};

pub use media::{AudioSink, FfmpegMedia};
pub use raster::SoftRenderer;
pub use shader::ShaderProgram;

/// SDL2 window, input and audio backend.
///
/// # Safety
///
/// `frame` is declared before `texture_creator` so that Rust's drop order
/// (declaration order) destroys the texture before the creator it borrows
/// from. The `Texture<'static>` lifetime is erased via transmute in
/// `present()`; this is sound because the `TextureCreator` always outlives
/// the texture.
pub struct SdlBackend {
    renderer: SoftRenderer,
    canvas: Canvas<Window>,
    event_pump: EventPump,
    audio: AudioSubsystem,
    frame: Option<Texture<'static>>,
    frame_size: (u32, u32),
    texture_creator: TextureCreator<WindowContext>,
}

impl SdlBackend {
    /// Open a resizable window and start text input.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let sdl = sdl2::init().map_err(|e| DuotoneError::Backend(e.to_string()))?;
        let video = sdl
            .video()
            .map_err(|e| DuotoneError::Backend(e.to_string()))?;
        let audio = sdl
            .audio()
            .map_err(|e| DuotoneError::Backend(e.to_string()))?;
        let window = video
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| DuotoneError::Backend(e.to_string()))?;
        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(|e| DuotoneError::Backend(e.to_string()))?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl
            .event_pump()
            .map_err(|e| DuotoneError::Backend(e.to_string()))?;
        video.text_input().start();

        log::info!("SDL2 backend initialized: {width}x{height}");

        Ok(Self {
            renderer: SoftRenderer::new(width, height),
            canvas,
            event_pump,
            audio,
            frame: None,
            frame_size: (0, 0),
            texture_creator,
        })
    }

    /// Open a paused stereo `f32` queue at the media sample rate.
    pub fn open_audio_queue(&self) -> Result<AudioQueue<f32>> {
        let desired = AudioSpecDesired {
            freq: Some(media::SAMPLE_RATE as i32),
            channels: Some(media::CHANNELS as u8),
            samples: Some(1024),
        };
        self.audio
            .open_queue::<f32, _>(None, &desired)
            .map_err(DuotoneError::Backend)
    }

    /// Show the framebuffer.
    pub fn present(&mut self) -> Result<()> {
        let (width, height) = self.renderer.screen_size();
        if self.frame.is_none() || self.frame_size != (width, height) {
            self.frame = None;
            let texture = self
                .texture_creator
                .create_texture_streaming(PixelFormatEnum::ABGR8888, width, height)
                .map_err(|e| DuotoneError::Backend(e.to_string()))?;
            // SAFETY: The texture borrows from self.texture_creator which lives in the
            // same struct. `frame` is declared before `texture_creator`, so Rust drops
            // the texture first. The erased lifetime is therefore always valid.
            let texture: Texture<'static> = unsafe { std::mem::transmute(texture) };
            self.frame = Some(texture);
            self.frame_size = (width, height);
        }
        let Some(texture) = self.frame.as_mut() else {
            return Ok(());
        };
        texture
            .update(None, self.renderer.pixels(), width as usize * 4)
            .map_err(|e| DuotoneError::Backend(e.to_string()))?;
        self.canvas.clear();
        self.canvas
            .copy(texture, None, None)
            .map_err(DuotoneError::Backend)?;
        self.canvas.present();
        Ok(())
    }
}

impl InputBackend for SdlBackend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::TextInput { text, .. } => {
                    events.extend(text.chars().map(InputEvent::TextInput));
                },
                Event::Window {
                    win_event: WindowEvent::SizeChanged(w, h),
                    ..
                } => {
                    let (width, height) = (w.max(1) as u32, h.max(1) as u32);
                    self.renderer.resize(width, height);
                    events.push(InputEvent::Resized { width, height });
                },
                other => events.extend(map_sdl_event(other)),
            }
        }
        events
    }
}

/// Map an SDL2 event to a duotone input event.
fn map_sdl_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Quit { .. } => Some(InputEvent::Quit),
        Event::KeyDown {
            keycode: Some(key), ..
        } => map_key(key).map(InputEvent::KeyPress),
        Event::MouseMotion { x, y, .. } => Some(InputEvent::CursorMove { x, y }),
        Event::MouseButtonDown {
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } => Some(InputEvent::PointerClick { x, y }),
        Event::MouseButtonUp {
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } => Some(InputEvent::PointerRelease { x, y }),
        Event::MouseWheel { y, .. } => Some(InputEvent::Wheel { dy: y as f32 }),
        _ => None,
    }
}

fn map_key(key: Keycode) -> Option<Key> {
    match key {
        Keycode::Escape => Some(Key::Escape),
        Keycode::Return | Keycode::KpEnter => Some(Key::Enter),
        Keycode::Backspace => Some(Key::Backspace),
        Keycode::Space => Some(Key::Space),
        Keycode::Tab => Some(Key::Tab),
        Keycode::Left => Some(Key::Left),
        Keycode::Right => Some(Key::Right),
        Keycode::Up => Some(Key::Up),
        Keycode::Down => Some(Key::Down),
        Keycode::F12 => Some(Key::Screenshot),
        _ => None,
    }
}

impl GraphicsBackend for SdlBackend {
    fn screen_size(&self) -> (u32, u32) {
        self.renderer.screen_size()
    }

    fn create_surface(&mut self, width: u32, height: u32) -> Result<SurfaceId> {
        self.renderer.create_surface(width, height)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<()> {
        self.renderer.destroy_surface(surface)
    }

    fn begin_surface(&mut self, surface: SurfaceId) -> Result<()> {
        self.renderer.begin_surface(surface)
    }

    fn end_surface(&mut self) -> Result<()> {
        self.renderer.end_surface()
    }

    fn load_shader(&mut self, path: &Path) -> Result<ShaderId> {
        self.renderer.load_shader(path)
    }

    fn unload_shader(&mut self, shader: ShaderId) {
        self.renderer.unload_shader(shader);
    }

    fn uniform_location(&self, shader: ShaderId, name: &str) -> Option<UniformLocation> {
        self.renderer.uniform_location(shader, name)
    }

    fn set_uniform_vec4(
        &mut self,
        shader: ShaderId,
        location: UniformLocation,
        value: [f32; 4],
    ) -> Result<()> {
        self.renderer.set_uniform_vec4(shader, location, value)
    }

    fn begin_shader(&mut self, shader: ShaderId) -> Result<()> {
        self.renderer.begin_shader(shader)
    }

    fn end_shader(&mut self) -> Result<()> {
        self.renderer.end_shader()
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.renderer.clear(color)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.renderer.fill_rect(rect, color)
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) -> Result<()> {
        self.renderer.fill_rounded_rect(rect, radius, color)
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        thickness: f32,
        color: Color,
    ) -> Result<()> {
        self.renderer
            .stroke_rounded_rect(rect, radius, thickness, color)
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) -> Result<()> {
        self.renderer.draw_line(from, to, thickness, color)
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<()> {
        self.renderer.fill_circle(center, radius, color)
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, font_size: u16, color: Color) -> Result<()> {
        self.renderer.draw_text(text, pos, font_size, color)
    }

    fn measure_text(&self, text: &str, font_size: u16) -> Vec2 {
        self.renderer.measure_text(text, font_size)
    }

    fn push_clip(&mut self, rect: Rect) -> Result<()> {
        self.renderer.push_clip(rect)
    }

    fn pop_clip(&mut self) -> Result<()> {
        self.renderer.pop_clip()
    }

    fn load_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureId> {
        self.renderer.load_texture(width, height, rgba)
    }

    fn update_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<()> {
        self.renderer.update_texture(texture, width, height, rgba)
    }

    fn destroy_texture(&mut self, texture: TextureId) -> Result<()> {
        self.renderer.destroy_texture(texture)
    }

    fn draw_texture(&mut self, texture: TextureId, src: Rect, dst: Rect, tint: Color) -> Result<()> {
        self.renderer.draw_texture(texture, src, dst, tint)
    }

    fn draw_surface(&mut self, surface: SurfaceId, src: Rect, dst: Rect, tint: Color) -> Result<()> {
        self.renderer.draw_surface(surface, src, dst, tint)
    }

    fn read_screen(&self) -> Result<Vec<u8>> {
        self.renderer.read_screen()
    }
}
