//! Palette picker.

use duotone_types::error::Result;
use duotone_types::geometry::{Rect, Vec2};
use duotone_types::input::Key;

use super::ScreenCtx;
use crate::app::AppState;
use crate::icons::Icon;
use crate::ui::{FONT_LARGE, FONT_MEDIUM, colors};

const ROW_W: f32 = 420.0;
const ROW_H: f32 = 40.0;
const ROW_GAP: f32 = 8.0;
const SWATCH: f32 = 24.0;

/// Rect of palette row `index`.
pub fn row_rect(bounds: Rect, index: usize) -> Rect {
    Rect::new(
        bounds.center().x - ROW_W / 2.0,
        bounds.y + 96.0 + index as f32 * (ROW_H + ROW_GAP),
        ROW_W,
        ROW_H,
    )
}

/// Invert and Back button rects, below `rows` palette rows.
pub fn button_rects(bounds: Rect, rows: usize) -> [Rect; 2] {
    let below = row_rect(bounds, rows);
    let w = (ROW_W - ROW_GAP) / 2.0;
    [
        Rect::new(below.x, below.y + 8.0, w, ROW_H),
        Rect::new(below.x + w + ROW_GAP, below.y + 8.0, w, ROW_H),
    ]
}

pub fn draw(app: &mut AppState, ctx: &mut ScreenCtx<'_>) -> Result<()> {
    app.palettes.normalize();

    let bounds = ctx.bounds;
    ctx.draw.label_centered(
        "Palettes",
        Rect::new(bounds.x, bounds.y + 32.0, bounds.w, 40.0),
        FONT_LARGE,
        colors::TEXT,
    )?;

    let mut picked = None;
    for (i, entry) in app.palettes.entries().iter().enumerate() {
        let row = row_rect(bounds, i);
        let selected = app.palettes.is_selected(i);
        let fill = if selected {
            colors::HIGHLIGHT
        } else if ctx.draw.hovered(row) {
            colors::BUTTON_HOVER
        } else {
            colors::PANEL
        };
        ctx.draw.panel(row, 6.0, fill)?;
        if selected {
            ctx.draw.outline(row, 6.0, 2.0, colors::TEXT)?;
        }
        let text = if selected {
            colors::BACKGROUND
        } else {
            colors::TEXT
        };
        let y = row.center().y - f32::from(FONT_MEDIUM) / 2.0;
        ctx.draw
            .label(entry.name, Vec2::new(row.x + 16.0, y), FONT_MEDIUM, text)?;

        let swatch_y = row.center().y - SWATCH / 2.0;
        let light = Rect::new(row.right() - 2.0 * SWATCH - 20.0, swatch_y, SWATCH, SWATCH);
        let dark = Rect::new(row.right() - SWATCH - 12.0, swatch_y, SWATCH, SWATCH);
        ctx.draw.panel(light, 4.0, entry.light)?;
        ctx.draw.panel(dark, 4.0, entry.dark)?;

        if ctx.draw.clicked(row) {
            picked = Some(i);
        }
    }

    let [invert, back] = button_rects(bounds, app.palettes.len());
    let invert_label = if app.palettes.inverted {
        "Inverted"
    } else {
        "Invert"
    };
    let invert_hit = ctx.draw.button(invert, invert_label, None)?;
    let back_hit = ctx.draw.button(back, "Back", Some(Icon::Back))?;

    let input = ctx.draw.input;
    let count = app.palettes.len();
    if count > 0 {
        let active = app.palettes.active_index;
        if input.pressed(Key::Up) || input.pressed(Key::Left) {
            picked = Some((active + count - 1) % count);
        } else if input.pressed(Key::Down) || input.pressed(Key::Right) {
            picked = Some((active + 1) % count);
        }
    }
    if let Some(index) = picked {
        app.palettes.select(index);
        app.palettes.apply(&mut *ctx.draw.backend, ctx.shaders);
    }

    if invert_hit || input.pressed(Key::Tab) {
        app.palettes
            .toggle_inversion(&mut *ctx.draw.backend, ctx.shaders);
    }
    if back_hit || input.pressed(Key::Escape) {
        let back_to = app.return_screen;
        app.transition_to(back_to);
    }
    Ok(())
}
