//! duotone desktop entry point.
//!
//! Opens the SDL window, loads the dither and color-map shaders, and runs
//! the frame loop: poll input, update the app state, composite the frame,
//! present. F12 saves a screenshot; closing the window or pressing Escape
//! on the start screen quits.

mod cli;
mod screenshot;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use duotone_backend_sdl::{AudioSink, FfmpegMedia, SdlBackend};
use duotone_core::directory::StdFileSystem;
use duotone_core::palette::ShaderSet;
use duotone_core::{AppState, Compositor};
use duotone_types::backend::{GraphicsBackend, InputBackend, MediaBackend};
use duotone_types::geometry::Vec2;
use duotone_types::input::{FrameInput, Key};

use cli::CliArgs;

/// Longest step fed to the animations, so a stall does not skip a
/// transition entirely.
const MAX_FRAME_SECS: f32 = 0.1;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse(std::env::args().skip(1))?;
    let cwd = std::env::current_dir()?;
    let config = cli::resolve_config(&args, &cwd, |key| std::env::var(key).ok())?;
    log::info!(
        "Starting duotone ({}x{})",
        config.screen_width,
        config.screen_height,
    );

    let mut backend = SdlBackend::new(
        &config.window_title,
        config.screen_width,
        config.screen_height,
    )?;
    let sink = match backend.open_audio_queue() {
        Ok(queue) => Some(Box::new(queue) as Box<dyn AudioSink>),
        Err(e) => {
            log::warn!("audio unavailable, playing silently: {e}");
            None
        },
    };
    let mut media = FfmpegMedia::new(sink);

    let mut shaders = ShaderSet::load(
        &mut backend,
        &config.dither_shader_path(),
        &config.colormap_shader_path(),
    );
    let mut app = AppState::new(&config, Box::new(StdFileSystem));
    app.palettes.apply(&mut backend, &shaders);
    let mut compositor = Compositor::new();

    let mut pointer = Vec2::ZERO;
    let mut last = Instant::now();
    loop {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_FRAME_SECS);
        last = now;

        let events = backend.poll_events();
        let input = FrameInput::collect(pointer, &events);
        pointer = input.pointer;

        app.update(&input, dt, &mut media);
        compositor.render_frame(&mut app, &mut backend, &mut media, &shaders, &input)?;
        if input.keys.contains(&Key::Screenshot) {
            take_screenshot(&backend);
        }
        backend.present()?;

        if app.quit {
            break;
        }
    }

    log::info!("Shutting down");
    media.unload();
    compositor.release(&mut backend)?;
    shaders.unload(&mut backend);
    Ok(())
}

fn take_screenshot(backend: &SdlBackend) {
    let (width, height) = backend.screen_size();
    let saved = backend.read_screen().map_err(anyhow::Error::from).and_then(|rgba| {
        screenshot::save(Path::new(screenshot::SCREENSHOT_DIR), width, height, &rgba)
    });
    match saved {
        Ok(path) => log::info!("Saved {}", path.display()),
        Err(e) => log::warn!("screenshot failed: {e}"),
    }
}
