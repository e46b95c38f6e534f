//! Tests for the frame compositor and the screens it drives.

use std::path::{Path, PathBuf};

use duotone_types::backend::SurfaceId;
use duotone_types::config::AppConfig;
use duotone_types::geometry::Vec2;

use super::*;
use crate::directory::FsEntry;
use crate::screens::explorer::{ITEM_HEIGHT, Layout};
use crate::screens::start;
use crate::test_utils::{DrawCall, MemFileSystem, MockBackend, MockMedia};

struct Harness {
    app: AppState,
    gfx: MockBackend,
    media: MockMedia,
    shaders: ShaderSet,
    compositor: Compositor,
}

impl Harness {
    fn new() -> Self {
        let mut fs = MemFileSystem::new();
        fs.add_dir(
            "/videos",
            vec![
                FsEntry::file("cat.mp4"),
                FsEntry::dir("trips"),
                FsEntry::file("notes.txt"),
            ],
        );
        fs.add_dir("/videos/trips", vec![FsEntry::file("beach.mov")]);
        let config = AppConfig {
            start_dir: Some(PathBuf::from("/videos")),
            ..AppConfig::default()
        };
        let mut gfx = MockBackend::new();
        let shaders = ShaderSet::load(&mut gfx, Path::new("dither.toml"), Path::new("colormap.toml"));
        Self {
            app: AppState::new(&config, Box::new(fs)),
            gfx,
            media: MockMedia::new(),
            shaders,
            compositor: Compositor::new(),
        }
    }

    /// Advance time without input.
    fn tick(&mut self, dt: f32) {
        self.app
            .update(&FrameInput::default(), dt, &mut self.media);
    }

    fn settle(&mut self) {
        self.tick(1.0);
    }

    fn render(&mut self, input: &FrameInput) {
        self.gfx.calls.clear();
        self.compositor
            .render_frame(
                &mut self.app,
                &mut self.gfx,
                &mut self.media,
                &self.shaders,
                input,
            )
            .unwrap();
    }

    fn surfaces(&self) -> (SurfaceId, SurfaceId) {
        (
            self.gfx.created_surfaces[0].0,
            self.gfx.created_surfaces[1].0,
        )
    }

    fn index_of_text(&self, needle: &str) -> Option<usize> {
        self.gfx
            .calls
            .iter()
            .position(|c| matches!(c, DrawCall::Text { text, .. } if text.contains(needle)))
    }

    fn surface_blits(&self) -> Vec<(SurfaceId, Rect, Color)> {
        self.gfx
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Surface { surface, src, tint, .. } => Some((*surface, *src, *tint)),
                _ => None,
            })
            .collect()
    }
}

fn click_at(p: Vec2) -> FrameInput {
    FrameInput {
        pointer: p,
        click: Some(p),
        ..FrameInput::default()
    }
}

fn screen_bounds() -> Rect {
    Rect::sized(1280.0, 720.0)
}

// ---------------------------------------------------------------------------
// Pipeline order
// ---------------------------------------------------------------------------

#[test]
fn settled_frame_draws_ui_then_dithers_to_screen() {
    let mut h = Harness::new();
    h.settle();
    h.render(&FrameInput::default());

    let (primary, _) = h.surfaces();
    let dither = h.shaders.dither.as_ref().unwrap().id;
    assert_eq!(h.gfx.calls[0], DrawCall::BeginSurface(primary));
    assert!(h.gfx.has_text("Browse"));

    let end = h
        .gfx
        .calls
        .iter()
        .position(|c| *c == DrawCall::EndSurface)
        .unwrap();
    let tail = &h.gfx.calls[end + 1..];
    assert_eq!(tail[0], DrawCall::Clear(Color::BLACK));
    assert_eq!(tail[1], DrawCall::BeginShader(dither));
    assert!(matches!(tail[2], DrawCall::Surface { surface, .. } if surface == primary));
    assert_eq!(tail[3], DrawCall::EndShader);
    assert_eq!(tail.len(), 4);
}

#[test]
fn blits_flip_rows() {
    let mut h = Harness::new();
    h.settle();
    h.render(&FrameInput::default());
    for (_, src, _) in h.surface_blits() {
        assert_eq!(src, screen_bounds().flipped_y());
        assert!(src.h < 0.0);
    }
}

#[test]
fn first_frame_fades_in() {
    let mut h = Harness::new();
    h.render(&FrameInput::default());
    assert_eq!(h.gfx.text_alpha("Browse"), Some(0));
    h.tick(0.25);
    h.render(&FrameInput::default());
    let a = h.gfx.text_alpha("Browse").unwrap();
    assert!(a > 0 && a < 255);
}

#[test]
fn target_drawn_before_outgoing_screen() {
    let mut h = Harness::new();
    h.settle();
    h.app.transition_to(ScreenKind::Explorer);
    h.tick(0.1);
    h.render(&FrameInput::default());

    let incoming = h.index_of_text("/videos_").unwrap();
    let outgoing = h.index_of_text("Browse").unwrap();
    assert!(incoming < outgoing);

    let f = h.app.transition.blend_factor();
    let expect = |v: f32| (255.0 * v).round() as u8;
    assert_eq!(h.gfx.text_alpha("/videos_"), Some(expect(f)));
    assert_eq!(h.gfx.text_alpha("Browse"), Some(expect(1.0 - f)));
}

#[test]
fn settled_frame_draws_only_current_screen() {
    let mut h = Harness::new();
    h.settle();
    h.app.transition_to(ScreenKind::Explorer);
    h.settle();
    h.render(&FrameInput::default());
    assert!(h.gfx.has_text("/videos_"));
    assert!(!h.gfx.has_text("Browse"));
}

#[test]
fn background_drawn_under_screens() {
    let mut h = Harness::new();
    h.settle();
    h.render(&FrameInput::default());
    let first_circle = h
        .gfx
        .calls
        .iter()
        .position(|c| matches!(c, DrawCall::FillCircle { .. }))
        .unwrap();
    assert!(first_circle < h.index_of_text("Browse").unwrap());
}

// ---------------------------------------------------------------------------
// Input routing
// ---------------------------------------------------------------------------

#[test]
fn outgoing_screen_ignores_clicks() {
    let mut h = Harness::new();
    h.settle();
    h.app.transition_to(ScreenKind::Explorer);
    h.tick(0.1);
    let quit = start::button_rects(screen_bounds())[2];
    h.render(&click_at(quit.center()));
    assert!(!h.app.quit);
}

#[test]
fn settled_start_quit_button() {
    let mut h = Harness::new();
    h.settle();
    let quit = start::button_rects(screen_bounds())[2];
    h.render(&click_at(quit.center()));
    assert!(h.app.quit);
}

#[test]
fn clicks_wait_for_fade_in() {
    let mut h = Harness::new();
    h.tick(0.05);
    let quit = start::button_rects(screen_bounds())[2];
    h.render(&click_at(quit.center()));
    assert!(!h.app.quit);

    // Keys are not gated.
    let mut h = Harness::new();
    h.settle();
    h.app.transition_to(ScreenKind::Explorer);
    h.tick(0.05);
    let escape = FrameInput {
        keys: vec![duotone_types::input::Key::Escape],
        ..FrameInput::default()
    };
    h.render(&escape);
    assert_eq!(h.app.transition.target(), ScreenKind::Start);
}

#[test]
fn hover_growth_carries_across_frames() {
    let mut h = Harness::new();
    h.settle();
    let browse = start::button_rects(screen_bounds())[0];
    let over = FrameInput {
        pointer: browse.center(),
        ..FrameInput::default()
    };
    let outline_width = |h: &Harness| {
        h.gfx
            .calls
            .iter()
            .find_map(|c| match c {
                DrawCall::StrokeRoundedRect { rect, .. }
                    if (rect.center().y - browse.center().y).abs() < 1e-3 =>
                {
                    Some(rect.w)
                },
                _ => None,
            })
            .unwrap()
    };

    h.render(&over);
    let first = outline_width(&h);
    for _ in 0..5 {
        h.render(&over);
    }
    assert!(outline_width(&h) > first);
    assert!(first > browse.w);
}

#[test]
fn browse_button_opens_explorer() {
    let mut h = Harness::new();
    h.settle();
    let browse = start::button_rects(screen_bounds())[0];
    h.render(&click_at(browse.center()));
    assert_eq!(h.app.transition.target(), ScreenKind::Explorer);
    assert_eq!(h.app.camera.target, crate::screen::camera_target(ScreenKind::Explorer));
}

#[test]
fn explorer_two_step_click_navigates() {
    let mut h = Harness::new();
    h.settle();
    h.app.transition_to(ScreenKind::Explorer);
    h.settle();

    let layout = Layout::new(screen_bounds());
    // Row 1 is the "trips" folder.
    let row = Vec2::new(layout.list.x + 40.0, layout.list.y + ITEM_HEIGHT * 1.5);
    h.render(&click_at(row));
    assert_eq!(h.app.listing.selected_index(), Some(1));
    assert_eq!(h.app.listing.current_path(), Path::new("/videos"));

    h.render(&click_at(row));
    assert_eq!(h.app.listing.current_path(), Path::new("/videos/trips"));
    // Re-listing restarts the explorer fade.
    assert!(h.app.transition.is_active());
    assert_eq!(h.app.transition.target(), ScreenKind::Explorer);
}

#[test]
fn explorer_video_opens_viewer() {
    let mut h = Harness::new();
    h.settle();
    h.app.transition_to(ScreenKind::Explorer);
    h.settle();

    let layout = Layout::new(screen_bounds());
    // Row 2 is "cat.mp4" (folders come first).
    let row = Vec2::new(layout.list.x + 40.0, layout.list.y + ITEM_HEIGHT * 2.5);
    h.render(&click_at(row));
    h.render(&click_at(row));
    assert_eq!(h.app.transition.target(), ScreenKind::Viewing);
    assert_eq!(h.app.viewer.path(), Some(Path::new("/videos/cat.mp4")));
}

#[test]
fn view_button_needs_selected_video() {
    let mut h = Harness::new();
    h.settle();
    h.app.transition_to(ScreenKind::Explorer);
    h.settle();
    let layout = Layout::new(screen_bounds());

    h.render(&FrameInput::default());
    assert!(!h.gfx.has_text("View"));

    h.app.listing.select(2);
    h.render(&click_at(layout.view.center()));
    assert_eq!(h.app.transition.target(), ScreenKind::Viewing);
    assert_eq!(h.app.viewer.path(), Some(Path::new("/videos/cat.mp4")));
}

#[test]
fn escape_on_settled_start_quits() {
    let escape = FrameInput {
        keys: vec![duotone_types::input::Key::Escape],
        ..FrameInput::default()
    };

    let mut h = Harness::new();
    h.tick(0.05);
    h.render(&escape);
    assert!(!h.app.quit);

    h.settle();
    h.render(&escape);
    assert!(h.app.quit);
}

#[test]
fn escape_walks_back() {
    let mut h = Harness::new();
    h.settle();
    h.app.transition_to(ScreenKind::Explorer);
    h.settle();
    let escape = FrameInput {
        keys: vec![duotone_types::input::Key::Escape],
        ..FrameInput::default()
    };
    h.render(&escape);
    assert_eq!(h.app.transition.target(), ScreenKind::Start);
}

// ---------------------------------------------------------------------------
// Video layer
// ---------------------------------------------------------------------------

fn open_viewer(h: &mut Harness) {
    h.settle();
    h.app.viewer.open(PathBuf::from("/videos/cat.mp4"));
    h.app.transition_to(ScreenKind::Viewing);
}

#[test]
fn video_goes_through_colormap_into_secondary() {
    let mut h = Harness::new();
    open_viewer(&mut h);
    h.tick(0.25);
    h.render(&FrameInput::default());

    let (_, secondary) = h.surfaces();
    let colormap = h.shaders.colormap.as_ref().unwrap().id;
    let begin = h
        .gfx
        .calls
        .iter()
        .position(|c| *c == DrawCall::BeginSurface(secondary))
        .unwrap();
    let section = &h.gfx.calls[begin..];
    assert_eq!(section[1], DrawCall::Clear(Color::TRANSPARENT));
    assert_eq!(section[2], DrawCall::BeginShader(colormap));
    assert!(matches!(section[3], DrawCall::Texture { .. }));
    assert_eq!(section[4], DrawCall::EndShader);
    assert_eq!(section[5], DrawCall::EndSurface);

    let blits = h.surface_blits();
    assert_eq!(blits.len(), 2);
    assert_eq!(blits[1].0, secondary);
    let expected = (255.0 * h.app.transition.blend_for(ScreenKind::Viewing)).round() as u8;
    assert_eq!(blits[1].2.a, expected);
}

#[test]
fn display_rect_is_aspect_fit() {
    let mut h = Harness::new();
    open_viewer(&mut h);
    h.settle();
    h.render(&FrameInput::default());

    let area = crate::screens::viewer::video_area(screen_bounds());
    let rect = h.app.viewer.display_rect;
    assert_eq!(rect, aspect_fit(area, 320, 180));
    let drawn = h.gfx.calls.iter().find_map(|c| match c {
        DrawCall::Texture { dst, .. } => Some(*dst),
        _ => None,
    });
    assert_eq!(drawn, Some(rect));
}

#[test]
fn no_video_layer_outside_viewer() {
    let mut h = Harness::new();
    open_viewer(&mut h);
    h.settle();
    h.render(&FrameInput::default());
    assert!(h.app.viewer.loaded);

    // Leaving: video fades out with the viewer, then disappears.
    h.app.transition_to(ScreenKind::Explorer);
    h.tick(0.1);
    h.render(&FrameInput::default());
    assert_eq!(h.surface_blits().len(), 2);
    h.settle();
    h.render(&FrameInput::default());
    assert_eq!(h.surface_blits().len(), 1);
}

#[test]
fn frame_uploaded_once_per_sequence() {
    let mut h = Harness::new();
    open_viewer(&mut h);
    h.render(&FrameInput::default());
    h.render(&FrameInput::default());
    assert_eq!(h.gfx.texture_uploads.len(), 1);
    h.tick(1.0 / 30.0);
    h.render(&FrameInput::default());
    assert_eq!(h.gfx.texture_uploads.len(), 2);
    assert_eq!(h.gfx.texture_uploads[0].0, h.gfx.texture_uploads[1].0);
}

#[test]
fn failed_media_shows_message_and_no_layer() {
    let mut h = Harness::new();
    h.media.fail_loads = true;
    open_viewer(&mut h);
    h.settle();
    h.render(&FrameInput::default());
    assert!(!h.app.viewer.loaded);
    assert!(h.gfx.has_text("cannot be played"));
    assert_eq!(h.surface_blits().len(), 1);
}

#[test]
fn space_toggles_playback() {
    let mut h = Harness::new();
    open_viewer(&mut h);
    h.settle();
    h.render(&FrameInput::default());
    let space = FrameInput {
        keys: vec![duotone_types::input::Key::Space],
        ..FrameInput::default()
    };
    h.render(&space);
    assert_eq!(h.media.state, duotone_types::backend::PlaybackState::Paused);
}

// ---------------------------------------------------------------------------
// Surfaces and shaders
// ---------------------------------------------------------------------------

#[test]
fn resize_recreates_surfaces() {
    let mut h = Harness::new();
    h.render(&FrameInput::default());
    h.render(&FrameInput::default());
    assert_eq!(h.gfx.created_surfaces.len(), 2);

    h.gfx.size = (800, 600);
    h.render(&FrameInput::default());
    assert_eq!(h.gfx.destroyed_surfaces.len(), 2);
    assert_eq!(h.gfx.created_surfaces.len(), 4);
    assert_eq!(h.gfx.created_surfaces[3].1, 800);
    assert_eq!(h.compositor.surface_size(), (800, 600));
}

#[test]
fn missing_dither_blits_unshaded() {
    let mut h = Harness::new();
    h.shaders.unload(&mut h.gfx);
    h.settle();
    h.render(&FrameInput::default());
    assert!(!h.gfx.calls.iter().any(|c| matches!(c, DrawCall::BeginShader(_))));
    assert_eq!(h.surface_blits().len(), 1);
}

#[test]
fn palette_selection_heals_after_one_frame() {
    let mut h = Harness::new();
    h.settle();
    h.app.palettes.active_index = 3;
    h.render(&FrameInput::default());
    let selected: Vec<usize> = (0..h.app.palettes.len())
        .filter(|i| h.app.palettes.is_selected(*i))
        .collect();
    assert_eq!(selected, vec![3]);
}

#[test]
fn palette_screen_click_applies() {
    let mut h = Harness::new();
    h.settle();
    h.app.return_screen = ScreenKind::Start;
    h.app.transition_to(ScreenKind::Palettes);
    h.settle();

    let row = crate::screens::palettes::row_rect(screen_bounds(), 0);
    h.render(&click_at(row.center()));
    assert_eq!(h.app.palettes.active_index, 0);
    assert!(h.gfx.calls.iter().any(|c| matches!(c, DrawCall::SetUniform { .. })));

    let tab = FrameInput {
        keys: vec![duotone_types::input::Key::Tab],
        ..FrameInput::default()
    };
    h.render(&tab);
    assert!(h.app.palettes.inverted);

    let back = FrameInput {
        keys: vec![duotone_types::input::Key::Escape],
        ..FrameInput::default()
    };
    h.render(&back);
    assert_eq!(h.app.transition.target(), ScreenKind::Start);
}
