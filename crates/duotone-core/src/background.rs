//! Decorative parallax circles behind every screen.

use duotone_types::backend::GraphicsBackend;
use duotone_types::color::Color;
use duotone_types::error::Result;
use duotone_types::geometry::{Rect, Vec2};

/// Number of circles in the field.
pub const CIRCLE_COUNT: usize = 40;

/// Opacity every circle reaches once the fade-in completes.
pub const MAX_OPACITY: f32 = 0.3;

/// Horizontal room beyond the screen width the circles are spread over, so
/// panning the camera across all screens keeps them in view.
const WORLD_MARGIN: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Position in normalized world space (`x` in `0..=1` spans the screen
    /// width plus the camera margin, `y` spans the screen height).
    pub base: Vec2,
    pub radius: f32,
    /// How strongly this circle follows camera and pointer, `0.1..=0.3`.
    pub parallax: f32,
}

/// Fixed-capacity set of background circles.
#[derive(Debug, Clone)]
pub struct BackgroundField {
    circles: [Circle; CIRCLE_COUNT],
}

impl BackgroundField {
    /// Scatter the circles deterministically from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = XorShift::new(seed);
        let circles = std::array::from_fn(|_| Circle {
            base: Vec2::new(rng.next_f32(), rng.next_f32()),
            radius: 50.0 + rng.next_f32() * 250.0,
            parallax: 0.1 + rng.next_f32() * 0.2,
        });
        Self { circles }
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    /// Screen position of `circle` for the given camera and pointer offset.
    pub fn position_of(circle: &Circle, bounds: Rect, camera: Vec2, pointer_offset: Vec2) -> Vec2 {
        let base = Vec2::new(
            bounds.x + circle.base.x * (bounds.w + WORLD_MARGIN),
            bounds.y + circle.base.y * bounds.h,
        );
        base - camera * circle.parallax + pointer_offset * circle.parallax
    }

    /// Draw every circle at the same opacity, `fade` (the eased fade-in
    /// value) times [`MAX_OPACITY`].
    pub fn draw(
        &self,
        gfx: &mut dyn GraphicsBackend,
        bounds: Rect,
        camera: Vec2,
        pointer_offset: Vec2,
        fade: f32,
        color: Color,
    ) -> Result<()> {
        if fade <= 0.0 {
            return Ok(());
        }
        let color = color.fade(fade.min(1.0) * MAX_OPACITY);
        for circle in &self.circles {
            let pos = Self::position_of(circle, bounds, camera, pointer_offset);
            if pos.x + circle.radius < bounds.x || pos.x - circle.radius > bounds.right() {
                continue;
            }
            gfx.fill_circle(pos, circle.radius, color)?;
        }
        Ok(())
    }
}

/// xorshift64, enough for scattering decorations.
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self(seed.wrapping_add(0x9E37_79B9_7F4A_7C15) | 1)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[0.0, 1.0)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{DrawCall, MockBackend};

    #[test]
    fn same_seed_same_field() {
        let a = BackgroundField::new(7);
        let b = BackgroundField::new(7);
        assert_eq!(a.circles(), b.circles());
        let c = BackgroundField::new(8);
        assert_ne!(a.circles(), c.circles());
    }

    #[test]
    fn parallax_factors_in_range() {
        let field = BackgroundField::new(42);
        for c in field.circles() {
            assert!((0.1..=0.3).contains(&c.parallax));
            assert!((0.0..1.0).contains(&c.base.x));
        }
    }

    #[test]
    fn parallax_formula() {
        let circle = Circle {
            base: Vec2::new(0.5, 0.5),
            radius: 10.0,
            parallax: 0.2,
        };
        let bounds = Rect::sized(400.0, 300.0);
        let p = BackgroundField::position_of(
            &circle,
            bounds,
            Vec2::new(100.0, 0.0),
            Vec2::new(10.0, -20.0),
        );
        // base = (500, 150); minus camera*0.2 = (20, 0); plus pointer*0.2 = (2, -4)
        assert_eq!(p, Vec2::new(482.0, 146.0));
    }

    #[test]
    fn invisible_before_fade_starts() {
        let field = BackgroundField::new(1);
        let mut backend = MockBackend::new();
        field
            .draw(&mut backend, Rect::sized(1280.0, 720.0), Vec2::ZERO, Vec2::ZERO, 0.0, Color::WHITE)
            .unwrap();
        assert!(backend.calls.is_empty());
    }

    fn circle_alphas(fade: f32) -> Vec<u8> {
        let field = BackgroundField::new(1);
        let mut backend = MockBackend::new();
        field
            .draw(&mut backend, Rect::sized(1280.0, 720.0), Vec2::ZERO, Vec2::ZERO, fade, Color::WHITE)
            .unwrap();
        backend
            .calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillCircle { color, .. } => Some(color.a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn all_circles_share_one_opacity() {
        let half = circle_alphas(0.5);
        assert!(!half.is_empty());
        assert!(half.iter().all(|&a| a == half[0]));

        let full = circle_alphas(1.0);
        let expected = Color::WHITE.fade(MAX_OPACITY).a;
        assert!(full.iter().all(|&a| a == expected));
        assert!(half[0] < expected);
    }
}
