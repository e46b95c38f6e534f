//! Background camera that drifts toward the active screen's position.

use duotone_types::geometry::Vec2;

use crate::animation::easing::ease_out_cubic;

/// Seconds over which the approach curve ramps up after a retarget.
const BLEND_WINDOW: f32 = 1.0;
/// Fraction of the eased remaining distance covered each frame.
const DAMPING: f32 = 0.1;
/// Distance below which the camera snaps onto its target.
const SNAP_DISTANCE: f32 = 0.01;

/// Camera offset used for background parallax.
///
/// Movement is eased twice: an ease-out curve over a one second window
/// after each retarget, then a per-frame damping step. The camera keeps
/// settling toward the target rather than arriving at a fixed time.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec2,
    pub target: Vec2,
    blend_elapsed: f32,
}

impl Camera {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            target: position,
            blend_elapsed: BLEND_WINDOW,
        }
    }

    pub fn retarget(&mut self, target: Vec2) {
        self.target = target;
        self.blend_elapsed = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        if dt > 0.0 {
            self.blend_elapsed += dt;
        }
        let eased = ease_out_cubic((self.blend_elapsed / BLEND_WINDOW).min(1.0));
        let remaining = self.target - self.position;
        self.position = self.position + remaining * (eased * DAMPING);
        if (self.target - self.position).length() < SNAP_DISTANCE {
            self.position = self.target;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }
}
