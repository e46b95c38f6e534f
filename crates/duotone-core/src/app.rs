//! Application state owned by the frame loop.

use std::path::PathBuf;

use log::{debug, info};

use duotone_types::backend::MediaBackend;
use duotone_types::config::AppConfig;
use duotone_types::input::FrameInput;

use crate::animation::FadeClock;
use crate::background::BackgroundField;
use crate::camera::Camera;
use crate::directory::{DirectoryListing, FileSystem};
use crate::palette::PaletteSet;
use crate::screen::{ScreenKind, camera_target};
use crate::transition::TransitionController;
use crate::viewer::ViewerState;

/// Length of the application-wide fade-in.
pub const APP_FADE_SECS: f32 = 1.5;
/// Seed for the background decoration layout.
const BACKGROUND_SEED: u64 = 0x00D0_70DE;

/// Everything the screens read and mutate, passed by reference into each
/// update and draw call.
pub struct AppState {
    pub transition: TransitionController,
    pub camera: Camera,
    pub fade: FadeClock,
    pub background: BackgroundField,
    pub listing: DirectoryListing,
    pub palettes: PaletteSet,
    pub viewer: ViewerState,
    /// Screen the palette picker goes back to.
    pub return_screen: ScreenKind,
    pub quit: bool,
    pub(crate) fs: Box<dyn FileSystem>,
}

impl AppState {
    /// Build the initial state: fading into the start screen with the
    /// explorer already listing the start directory.
    pub fn new(config: &AppConfig, fs: Box<dyn FileSystem>) -> Self {
        let start_dir = config
            .start_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let mut listing = DirectoryListing::new();
        listing.navigate(fs.as_ref(), &start_dir);
        info!(
            "starting in {} with {} entries",
            listing.current_path().display(),
            listing.entries().len()
        );

        Self {
            transition: TransitionController::starting_at(
                ScreenKind::Start,
                config.transition_secs,
            ),
            camera: Camera::new(camera_target(ScreenKind::Start)),
            fade: FadeClock::new(APP_FADE_SECS),
            background: BackgroundField::new(BACKGROUND_SEED),
            listing,
            palettes: PaletteSet::builtin(config.initial_palette),
            viewer: ViewerState::new(config.volume),
            return_screen: ScreenKind::Start,
            quit: false,
            fs,
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Start a transition to `screen` and pan the camera there.
    pub fn transition_to(&mut self, screen: ScreenKind) {
        self.transition.request(screen);
        self.camera.retarget(camera_target(screen));
    }

    /// Per-frame update, run before drawing.
    pub fn update(&mut self, input: &FrameInput, dt: f32, media: &mut dyn MediaBackend) {
        if input.quit {
            self.quit = true;
        }

        if self.transition.advance(dt) {
            let current = self.transition.current();
            debug!("transition committed to {}", current.name());
            self.listing.reset_scroll();
            if current != ScreenKind::Viewing && self.viewer.loaded {
                self.viewer.close(media);
            }
        }

        self.camera.update(dt);
        self.fade.update(dt);
        self.listing.update_scroll(dt);
        if self.viewer.loaded {
            media.advance(dt);
        }
    }
}
