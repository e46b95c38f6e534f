//! Video viewer state.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use duotone_types::backend::{MediaBackend, PlaybackState};
use duotone_types::geometry::Rect;

#[derive(Debug, Clone)]
pub struct ViewerState {
    path: Option<PathBuf>,
    /// `false` forces the stream to be (re)loaded on the next sync.
    pub loaded: bool,
    /// Set when loading `path` failed; cleared by [`Self::open`].
    load_failed: bool,
    /// Where the video frame was last drawn.
    pub display_rect: Rect,
    pub looping: bool,
    pub muted: bool,
    /// Volume used while not muted.
    pub volume: f32,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            path: None,
            loaded: false,
            load_failed: false,
            display_rect: Rect::default(),
            looping: true,
            muted: false,
            volume: 1.0,
        }
    }
}

impl ViewerState {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Choose a video; it is loaded on the next [`Self::sync`].
    pub fn open(&mut self, path: PathBuf) {
        debug!("viewer open {}", path.display());
        self.path = Some(path);
        self.loaded = false;
        self.load_failed = false;
    }

    /// Load the chosen stream if needed.
    ///
    /// A failed load is logged once and leaves `loaded == false` until a
    /// different video is opened.
    pub fn sync(&mut self, media: &mut dyn MediaBackend) {
        if self.loaded || self.load_failed {
            return;
        }
        let Some(path) = self.path.as_deref() else {
            return;
        };
        match media.load(path) {
            Ok(()) => {
                media.set_looping(self.looping);
                media.set_volume(self.effective_volume());
                self.loaded = true;
            },
            Err(e) => {
                warn!("cannot play {}: {e}", path.display());
                self.load_failed = true;
            },
        }
    }

    pub fn toggle_playback(&mut self, media: &mut dyn MediaBackend) {
        if !self.loaded {
            return;
        }
        match media.state() {
            PlaybackState::Playing => media.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => media.play(),
        }
    }

    pub fn toggle_loop(&mut self, media: &mut dyn MediaBackend) {
        self.looping = !self.looping;
        if self.loaded {
            media.set_looping(self.looping);
        }
    }

    pub fn toggle_mute(&mut self, media: &mut dyn MediaBackend) {
        self.muted = !self.muted;
        if self.loaded {
            media.set_volume(self.effective_volume());
        }
    }

    /// Unload the stream. The chosen path is kept so it can be reopened.
    pub fn close(&mut self, media: &mut dyn MediaBackend) {
        if self.loaded {
            media.unload();
        }
        self.loaded = false;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }
}

/// Largest rectangle with the aspect ratio `width:height` that fits inside
/// `bounds`, centered along the axis it does not fill.
pub fn aspect_fit(bounds: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 || bounds.w <= 0.0 || bounds.h <= 0.0 {
        let c = bounds.center();
        return Rect::new(c.x, c.y, 0.0, 0.0);
    }
    let aspect = width as f32 / height as f32;
    if aspect > bounds.w / bounds.h {
        let h = bounds.w / aspect;
        Rect::new(bounds.x, bounds.y + (bounds.h - h) / 2.0, bounds.w, h)
    } else {
        let w = bounds.h * aspect;
        Rect::new(bounds.x + (bounds.w - w) / 2.0, bounds.y, w, bounds.h)
    }
}
