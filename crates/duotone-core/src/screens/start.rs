//! Start screen: title and the three entry points. Escape quits once the
//! screen has settled.

use duotone_types::error::Result;
use duotone_types::geometry::{Rect, Vec2};
use duotone_types::input::Key;

use super::ScreenCtx;
use crate::app::AppState;
use crate::icons::Icon;
use crate::screen::ScreenKind;
use crate::ui::{FONT_LARGE, FONT_MEDIUM, colors};

const BUTTON_W: f32 = 220.0;
const BUTTON_H: f32 = 40.0;
const BUTTON_GAP: f32 = 16.0;

/// Rects of the Browse, Palettes and Quit buttons.
pub fn button_rects(bounds: Rect) -> [Rect; 3] {
    let x = bounds.center().x - BUTTON_W / 2.0;
    let top = bounds.y + bounds.h * 0.5;
    std::array::from_fn(|i| {
        Rect::new(
            x,
            top + i as f32 * (BUTTON_H + BUTTON_GAP),
            BUTTON_W,
            BUTTON_H,
        )
    })
}

pub fn draw(app: &mut AppState, ctx: &mut ScreenCtx<'_>) -> Result<()> {
    let bounds = ctx.bounds;
    let title = Rect::new(bounds.x, bounds.y + bounds.h * 0.22, bounds.w, 48.0);
    ctx.draw
        .label_centered("duotone", title, FONT_LARGE, colors::TEXT)?;
    ctx.draw.label_centered(
        "two colors, any video",
        Rect::new(title.x, title.bottom() + 8.0, title.w, 24.0),
        FONT_MEDIUM,
        colors::TEXT_DIM,
    )?;
    ctx.draw.line(
        Vec2::new(bounds.center().x - 120.0, title.bottom() + 44.0),
        Vec2::new(bounds.center().x + 120.0, title.bottom() + 44.0),
        2.0,
        colors::OUTLINE,
    )?;

    let [browse, palettes, quit] = button_rects(bounds);
    let browse_hit = ctx.draw.button(browse, "Browse", Some(Icon::Folder))?;
    let palettes_hit = ctx.draw.button(palettes, "Palettes", Some(Icon::Palette))?;
    let quit_hit = ctx.draw.button(quit, "Quit", None)?;

    if browse_hit || ctx.draw.input.pressed(Key::Enter) {
        // Re-list the directory so the explorer shows fresh contents.
        let path = app.listing.current_path().to_path_buf();
        app.listing.navigate(app.fs.as_ref(), &path);
        app.transition_to(ScreenKind::Explorer);
    } else if palettes_hit {
        app.return_screen = ScreenKind::Start;
        app.transition_to(ScreenKind::Palettes);
    } else if quit_hit {
        app.quit = true;
    } else if ctx.draw.input.pressed(Key::Escape) && !app.transition.is_active() {
        // Escape steps back on every other screen; only a settled start
        // screen treats it as quit.
        app.quit = true;
    }
    Ok(())
}
