//! Easing curves and the global fade-in clock.

/// Easing functions.
///
/// Input `t` is clamped to `[0.0, 1.0]`. Output is the eased value.
pub mod easing {
    /// Linear easing (no acceleration).
    pub fn linear(t: f32) -> f32 {
        t.clamp(0.0, 1.0)
    }

    /// Cubic ease-out (fast start, slow end).
    pub fn ease_out_cubic(t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let t1 = t - 1.0;
        t1 * t1 * t1 + 1.0
    }
}

/// A one-shot timer that runs from 0 to 1 over a fixed window and then
/// holds at 1.
///
/// Drives the application-wide fade-in (background decoration, first
/// frame). It is unrelated to the screen transition clock.
#[derive(Debug, Clone, Copy)]
pub struct FadeClock {
    elapsed: f32,
    duration: f32,
}

impl FadeClock {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    pub fn update(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
    }

    /// Linear progress in `[0.0, 1.0]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        easing::linear(self.elapsed / self.duration)
    }

    /// Progress through [`easing::ease_out_cubic`].
    pub fn eased(&self) -> f32 {
        easing::ease_out_cubic(self.progress())
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}
