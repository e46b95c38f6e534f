//! Video viewer screen: frame outline and playback controls.
//!
//! The video itself is drawn by the compositor into its own surface; this
//! screen only draws what sits around it.

use duotone_types::backend::PlaybackState;
use duotone_types::error::Result;
use duotone_types::geometry::{Rect, Vec2};
use duotone_types::input::Key;

use super::ScreenCtx;
use crate::app::AppState;
use crate::icons::Icon;
use crate::screen::ScreenKind;
use crate::ui::{FONT_MEDIUM, colors};

const MARGIN: f32 = 16.0;
const BAR_HEIGHT: f32 = 48.0;
const CONTROL_W: f32 = 40.0;
const CONTROL_H: f32 = 32.0;

/// Area the video is fitted into.
pub fn video_area(bounds: Rect) -> Rect {
    Rect::new(
        bounds.x + MARGIN,
        bounds.y + MARGIN,
        (bounds.w - MARGIN * 2.0).max(0.0),
        (bounds.h - MARGIN * 3.0 - BAR_HEIGHT).max(0.0),
    )
}

pub fn control_bar(bounds: Rect) -> Rect {
    Rect::new(
        bounds.x + MARGIN,
        bounds.bottom() - MARGIN - BAR_HEIGHT,
        (bounds.w - MARGIN * 2.0).max(0.0),
        BAR_HEIGHT,
    )
}

/// Back, play/pause, loop and mute button rects, left to right.
pub fn control_rects(bounds: Rect) -> [Rect; 4] {
    let bar = control_bar(bounds);
    let y = bar.center().y - CONTROL_H / 2.0;
    std::array::from_fn(|i| {
        Rect::new(
            bar.x + 8.0 + i as f32 * (CONTROL_W + 8.0),
            y,
            CONTROL_W,
            CONTROL_H,
        )
    })
}

pub fn draw(app: &mut AppState, ctx: &mut ScreenCtx<'_>) -> Result<()> {
    app.viewer.sync(ctx.media);

    let bounds = ctx.bounds;
    let area = video_area(bounds);
    if app.viewer.loaded {
        let frame = app.viewer.display_rect;
        if frame.w > 0.0 && frame.h > 0.0 {
            ctx.draw
                .outline(frame.inset(-2.0), 0.0, 2.0, colors::OUTLINE)?;
        }
    } else {
        let message = if app.viewer.path().is_some() {
            "This video cannot be played"
        } else {
            "No video selected"
        };
        ctx.draw
            .label_centered(message, area, FONT_MEDIUM, colors::TEXT_DIM)?;
    }

    let bar = control_bar(bounds);
    ctx.draw.panel(bar, 8.0, colors::PANEL)?;

    let [back, play, looping, mute] = control_rects(bounds);
    let playing = app.viewer.loaded && ctx.media.state() == PlaybackState::Playing;
    let back_hit = ctx.draw.button(back, "", Some(Icon::Back))?;
    let play_hit = ctx.draw.button(
        play,
        "",
        Some(if playing { Icon::Pause } else { Icon::Play }),
    )?;
    let loop_hit = ctx.draw.button(
        looping,
        "",
        Some(if app.viewer.looping { Icon::Loop } else { Icon::Unloop }),
    )?;
    let mute_hit = ctx.draw.button(
        mute,
        "",
        Some(if app.viewer.muted { Icon::Mute } else { Icon::Sound }),
    )?;

    if let Some(name) = app.viewer.path().and_then(|p| p.file_name()) {
        let name = name.to_string_lossy();
        let x = mute.right() + 16.0;
        let y = bar.center().y - f32::from(FONT_MEDIUM) / 2.0;
        ctx.draw
            .label(&name, Vec2::new(x, y), FONT_MEDIUM, colors::TEXT)?;
    }

    let input = ctx.draw.input;
    if back_hit || input.pressed(Key::Escape) {
        app.transition_to(ScreenKind::Explorer);
        return Ok(());
    }
    if play_hit || input.pressed(Key::Space) {
        app.viewer.toggle_playback(ctx.media);
    }
    if loop_hit {
        app.viewer.toggle_loop(ctx.media);
    }
    if mute_hit {
        app.viewer.toggle_mute(ctx.media);
    }
    Ok(())
}
