//! Timed screen transitions.
//!
//! A [`TransitionController`] owns the *current* screen (what the user was
//! looking at) and the *target* screen (what they asked for). While a
//! transition is active the target fades in over the current one; when the
//! timer runs out the target is committed as the new current screen.

use log::debug;

use crate::animation::easing::ease_out_cubic;
use crate::screen::ScreenKind;

#[derive(Debug, Clone)]
pub struct TransitionController {
    current: ScreenKind,
    target: ScreenKind,
    elapsed: f32,
    duration: f32,
    active: bool,
}

impl TransitionController {
    /// A controller already fading into `screen`, so the first frame fades in.
    pub fn starting_at(screen: ScreenKind, duration: f32) -> Self {
        Self {
            current: screen,
            target: screen,
            elapsed: 0.0,
            duration: duration.max(0.0),
            active: true,
        }
    }

    /// Start fading towards `screen`.
    ///
    /// Requesting the screen that is already showing restarts its fade-in.
    pub fn request(&mut self, screen: ScreenKind) {
        debug!(
            "transition {} -> {}",
            self.current.name(),
            screen.name()
        );
        self.target = screen;
        self.elapsed = 0.0;
        self.active = true;
    }

    /// Advance the timer. Returns `true` on the frame the target is committed.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        if dt > 0.0 {
            self.elapsed += dt;
        }
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.current = self.target;
            self.active = false;
            return true;
        }
        false
    }

    /// Eased fade-in progress of the target screen, `0.0..=1.0`.
    pub fn blend_factor(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ease_out_cubic((self.elapsed / self.duration).min(1.0))
    }

    /// Alpha multiplier `screen` should draw with this frame.
    ///
    /// The target fades in, the outgoing screen fades out with the inverse
    /// curve, and a settled screen draws fully opaque.
    pub fn blend_for(&self, screen: ScreenKind) -> f32 {
        if !self.active {
            return if screen == self.current { 1.0 } else { 0.0 };
        }
        if screen == self.target {
            self.blend_factor()
        } else if screen == self.current {
            1.0 - self.blend_factor()
        } else {
            0.0
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> ScreenKind {
        self.current
    }

    pub fn target(&self) -> ScreenKind {
        self.target
    }

    /// Whether `screen` is on screen this frame (current or target).
    pub fn involves(&self, screen: ScreenKind) -> bool {
        self.current == screen || self.target == screen
    }
}
