//! Immediate-mode drawing helpers shared by the screens.
//!
//! Every primitive issued through a [`DrawContext`] has its alpha scaled by
//! the screen's blend factor, so a whole screen fades in or out together.
//! The UI is drawn in grays; the dither pass maps luminance onto the active
//! palette afterwards.

use std::collections::HashMap;

use duotone_types::backend::GraphicsBackend;
use duotone_types::color::Color;
use duotone_types::error::Result;
use duotone_types::geometry::{Rect, Vec2};
use duotone_types::input::FrameInput;

use crate::icons::Icon;

/// Side length of one icon pixel.
pub const ICON_PIXEL: f32 = 2.0;
/// Drawn icon size.
pub const ICON_SIZE: f32 = 8.0 * ICON_PIXEL;

pub const FONT_SMALL: u16 = 8;
pub const FONT_MEDIUM: u16 = 16;
pub const FONT_LARGE: u16 = 32;

pub mod colors {
    use duotone_types::color::Color;

    pub const BACKGROUND: Color = Color::gray(12);
    pub const PANEL: Color = Color::gray(36);
    pub const BUTTON: Color = Color::gray(64);
    pub const BUTTON_HOVER: Color = Color::gray(104);
    pub const OUTLINE: Color = Color::gray(150);
    pub const TEXT: Color = Color::gray(235);
    pub const TEXT_DIM: Color = Color::gray(140);
    pub const HIGHLIGHT: Color = Color::gray(190);
    pub const SHADOW: Color = Color::rgba(0, 0, 0, 170);
    pub const BACKDROP: Color = Color::gray(150);
}

const BUTTON_RADIUS: f32 = 6.0;
const SHADOW_OFFSET: f32 = 4.0;
/// Scale a hovered button grows to.
pub const HOVER_SCALE: f32 = 1.1;
/// Fraction of the remaining distance to the target scale covered per frame.
const HOVER_EASE: f32 = 0.2;
/// Scales this close to 1 count as at rest and are forgotten.
const HOVER_REST: f32 = 1e-3;

/// Per-button hover scales carried between frames.
///
/// Buttons are identified by their rect. Only buttons that are hovered or
/// still shrinking back are stored.
#[derive(Debug, Default)]
pub struct HoverScales {
    scales: HashMap<[u32; 4], f32>,
}

impl HoverScales {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(rect: Rect) -> [u32; 4] {
        [rect.x.to_bits(), rect.y.to_bits(), rect.w.to_bits(), rect.h.to_bits()]
    }

    /// Current scale of the button at `rect`.
    pub fn get(&self, rect: Rect) -> f32 {
        self.scales.get(&Self::key(rect)).copied().unwrap_or(1.0)
    }

    /// Ease the button at `rect` one frame toward its hover target and
    /// return the new scale.
    pub fn step(&mut self, rect: Rect, hovered: bool) -> f32 {
        let key = Self::key(rect);
        let current = self.scales.get(&key).copied().unwrap_or(1.0);
        let target = if hovered { HOVER_SCALE } else { 1.0 };
        let next = current + (target - current) * HOVER_EASE;
        if !hovered && (next - 1.0).abs() < HOVER_REST {
            self.scales.remove(&key);
            1.0
        } else {
            self.scales.insert(key, next);
            next
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}

/// `rect` grown or shrunk by `scale` around its center.
pub fn scaled_about_center(rect: Rect, scale: f32) -> Rect {
    let w = rect.w * scale;
    let h = rect.h * scale;
    Rect::new(rect.x + (rect.w - w) / 2.0, rect.y + (rect.h - h) / 2.0, w, h)
}

/// Backend plus the per-screen state every helper needs.
pub struct DrawContext<'a> {
    pub backend: &'a mut dyn GraphicsBackend,
    pub input: &'a FrameInput,
    /// Blend factor of the screen being drawn.
    pub alpha: f32,
    /// Whether the palette is inverted (drop shadows are hidden then).
    pub inverted: bool,
    /// Hover animation state; buttons stay at rest without it.
    hover: Option<&'a mut HoverScales>,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        backend: &'a mut dyn GraphicsBackend,
        input: &'a FrameInput,
        alpha: f32,
        inverted: bool,
    ) -> Self {
        Self {
            backend,
            input,
            alpha,
            inverted,
            hover: None,
        }
    }

    /// Animate button hover through `scales`.
    pub fn with_hover(mut self, scales: &'a mut HoverScales) -> Self {
        self.hover = Some(scales);
        self
    }

    fn faded(&self, color: Color) -> Color {
        color.fade(self.alpha)
    }

    pub fn hovered(&self, rect: Rect) -> bool {
        rect.contains(self.input.pointer)
    }

    /// Whether the pointer was pressed inside `rect` this frame.
    pub fn clicked(&self, rect: Rect) -> bool {
        self.input.click.is_some_and(|p| rect.contains(p))
    }

    pub fn fill(&mut self, rect: Rect, color: Color) -> Result<()> {
        let c = self.faded(color);
        self.backend.fill_rect(rect, c)
    }

    pub fn panel(&mut self, rect: Rect, radius: f32, color: Color) -> Result<()> {
        let c = self.faded(color);
        self.backend.fill_rounded_rect(rect, radius, c)
    }

    pub fn outline(&mut self, rect: Rect, radius: f32, thickness: f32, color: Color) -> Result<()> {
        let c = self.faded(color);
        self.backend.stroke_rounded_rect(rect, radius, thickness, c)
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) -> Result<()> {
        let c = self.faded(color);
        self.backend.draw_line(from, to, thickness, c)
    }

    pub fn label(&mut self, text: &str, pos: Vec2, font_size: u16, color: Color) -> Result<()> {
        let c = self.faded(color);
        self.backend.draw_text(text, pos, font_size, c)
    }

    /// Draw `text` centered inside `rect`.
    pub fn label_centered(
        &mut self,
        text: &str,
        rect: Rect,
        font_size: u16,
        color: Color,
    ) -> Result<()> {
        let size = self.backend.measure_text(text, font_size);
        let pos = Vec2::new(
            (rect.x + (rect.w - size.x) / 2.0).floor(),
            (rect.y + (rect.h - size.y) / 2.0).floor(),
        );
        self.label(text, pos, font_size, color)
    }

    /// Draw an 8x8 icon as [`ICON_PIXEL`]-sized blocks.
    pub fn icon(&mut self, icon: Icon, pos: Vec2, color: Color) -> Result<()> {
        let c = self.faded(color);
        for y in 0..8 {
            for x in 0..8 {
                if icon.pixel(x, y) {
                    let block = Rect::new(
                        pos.x + x as f32 * ICON_PIXEL,
                        pos.y + y as f32 * ICON_PIXEL,
                        ICON_PIXEL,
                        ICON_PIXEL,
                    );
                    self.backend.fill_rect(block, c)?;
                }
            }
        }
        Ok(())
    }

    /// Labelled button with an optional leading icon. Returns `true` when
    /// it was clicked this frame.
    ///
    /// Hovering grows the button toward [`HOVER_SCALE`]; hit testing always
    /// uses the unscaled `rect`.
    pub fn button(&mut self, hit: Rect, label: &str, icon: Option<Icon>) -> Result<bool> {
        let hover = self.hovered(hit);
        let scale = match self.hover.as_deref_mut() {
            Some(scales) => scales.step(hit, hover),
            None => 1.0,
        };
        let rect = scaled_about_center(hit, scale);
        if !self.inverted {
            self.panel(
                rect.translate(Vec2::new(SHADOW_OFFSET, SHADOW_OFFSET)),
                BUTTON_RADIUS,
                colors::SHADOW,
            )?;
        }
        let body = if hover {
            colors::BUTTON_HOVER
        } else {
            colors::BUTTON
        };
        self.panel(rect, BUTTON_RADIUS, body)?;
        self.outline(rect, BUTTON_RADIUS, 1.0, colors::OUTLINE)?;

        match icon {
            Some(icon) if label.is_empty() => {
                let pos = Vec2::new(
                    rect.center().x - ICON_SIZE / 2.0,
                    rect.center().y - ICON_SIZE / 2.0,
                );
                self.icon(icon, pos, colors::TEXT)?;
            },
            Some(icon) => {
                let pos = Vec2::new(rect.x + 10.0, rect.center().y - ICON_SIZE / 2.0);
                self.icon(icon, pos, colors::TEXT)?;
                let text_rect = Rect::new(
                    rect.x + ICON_SIZE + 10.0,
                    rect.y,
                    rect.w - ICON_SIZE - 10.0,
                    rect.h,
                );
                self.label_centered(label, text_rect, FONT_MEDIUM, colors::TEXT)?;
            },
            None => self.label_centered(label, rect, FONT_MEDIUM, colors::TEXT)?,
        }
        Ok(self.clicked(hit))
    }
}
