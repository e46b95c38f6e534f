//! Directory explorer screen.

use duotone_types::error::Result;
use duotone_types::geometry::{Rect, Vec2};
use duotone_types::input::Key;

use super::ScreenCtx;
use crate::app::AppState;
use crate::directory::{Activation, EntryKind};
use crate::icons::Icon;
use crate::screen::ScreenKind;
use crate::ui::{FONT_MEDIUM, ICON_SIZE, colors};

pub const ITEM_HEIGHT: f32 = 28.0;
/// Pixels scrolled per wheel notch.
const WHEEL_STEP: f32 = 30.0;
const MARGIN: f32 = 16.0;
const BAR_HEIGHT: f32 = 32.0;
const VIEW_WIDTH: f32 = 160.0;

/// Back button, path box, palette button, list area and the view button
/// below the list.
pub struct Layout {
    pub back: Rect,
    pub path_box: Rect,
    pub palette: Rect,
    pub list: Rect,
    pub view: Rect,
}

impl Layout {
    pub fn new(bounds: Rect) -> Self {
        let top = bounds.y + MARGIN;
        let back = Rect::new(bounds.x + MARGIN, top, 40.0, BAR_HEIGHT);
        let palette = Rect::new(bounds.right() - MARGIN - 40.0, top, 40.0, BAR_HEIGHT);
        let path_box = Rect::new(
            back.right() + 12.0,
            top,
            (palette.x - 12.0 - back.right() - 12.0).max(0.0),
            BAR_HEIGHT,
        );
        let list_top = top + BAR_HEIGHT + MARGIN;
        let view_top = bounds.bottom() - MARGIN - BAR_HEIGHT;
        let list = Rect::new(
            bounds.x + MARGIN,
            list_top,
            (bounds.w - MARGIN * 2.0).max(0.0),
            (view_top - MARGIN - list_top).max(0.0),
        );
        let view = Rect::new(
            bounds.right() - MARGIN - VIEW_WIDTH,
            view_top,
            VIEW_WIDTH,
            BAR_HEIGHT,
        );
        Self {
            back,
            path_box,
            palette,
            list,
            view,
        }
    }

    /// Row under `point`, given the current scroll offset.
    pub fn row_at(&self, point: Vec2, scroll: f32) -> Option<usize> {
        if !self.list.contains(point) {
            return None;
        }
        let row = ((point.y - self.list.y - scroll) / ITEM_HEIGHT).floor();
        (row >= 0.0).then_some(row as usize)
    }
}

pub fn draw(app: &mut AppState, ctx: &mut ScreenCtx<'_>) -> Result<()> {
    let layout = Layout::new(ctx.bounds);

    handle_typing(app, ctx);

    let back_hit = ctx.draw.button(layout.back, "", Some(Icon::Back))?;
    let palette_hit = ctx.draw.button(layout.palette, "", Some(Icon::Palette))?;
    draw_path_box(app, ctx, layout.path_box)?;
    draw_rows(app, ctx, &layout)?;

    // Offered only while a video row is selected.
    let selected_video = app
        .listing
        .selected_index()
        .and_then(|i| app.listing.entries().get(i))
        .filter(|entry| entry.kind == EntryKind::Video)
        .map(|entry| entry.path.clone());
    let mut view_hit = false;
    if selected_video.is_some() {
        view_hit = ctx.draw.button(layout.view, "View", Some(Icon::Video))?;
    }

    let input = ctx.draw.input;
    if layout.list.contains(input.pointer) && input.wheel != 0.0 {
        app.listing
            .scroll_by(input.wheel, WHEEL_STEP, ITEM_HEIGHT, layout.list.h);
    }

    if back_hit || input.pressed(Key::Escape) {
        app.transition_to(ScreenKind::Start);
        return Ok(());
    }
    if palette_hit {
        app.return_screen = ScreenKind::Explorer;
        app.transition_to(ScreenKind::Palettes);
        return Ok(());
    }
    if let Some(path) = selected_video.filter(|_| view_hit) {
        app.viewer.open(path);
        app.transition_to(ScreenKind::Viewing);
        return Ok(());
    }

    let clicked_row = input
        .click
        .and_then(|p| layout.row_at(p, app.listing.scroll_offset))
        .filter(|i| *i < app.listing.entries().len());
    if let Some(index) = clicked_row {
        match app.listing.click(app.fs.as_ref(), index) {
            Activation::Navigated => app.transition_to(ScreenKind::Explorer),
            Activation::OpenVideo(path) => {
                app.viewer.open(path);
                app.transition_to(ScreenKind::Viewing);
            },
            Activation::Selected | Activation::None => {},
        }
    }
    Ok(())
}

fn handle_typing(app: &mut AppState, ctx: &ScreenCtx<'_>) {
    let input = ctx.draw.input;
    for ch in input.text.chars() {
        app.listing.push_input_char(ch);
    }
    for key in &input.keys {
        match key {
            Key::Backspace => app.listing.pop_input_char(),
            Key::Enter => {
                if app.listing.submit_input(app.fs.as_ref()) {
                    app.transition_to(ScreenKind::Explorer);
                }
            },
            _ => {},
        }
    }
}

fn draw_path_box(app: &AppState, ctx: &mut ScreenCtx<'_>, rect: Rect) -> Result<()> {
    ctx.draw.panel(rect, 4.0, colors::PANEL)?;
    ctx.draw.outline(rect, 4.0, 1.0, colors::OUTLINE)?;

    let text = format!("{}_", app.listing.input);
    let inner = rect.inset(8.0);
    let width = ctx.draw.backend.measure_text(&text, FONT_MEDIUM).x;
    // Keep the caret end visible when the path is wider than the box.
    let x = if width > inner.w {
        inner.right() - width
    } else {
        inner.x
    };
    let y = rect.center().y - f32::from(FONT_MEDIUM) / 2.0;
    ctx.draw.backend.push_clip(inner)?;
    ctx.draw
        .label(&text, Vec2::new(x, y), FONT_MEDIUM, colors::TEXT)?;
    ctx.draw.backend.pop_clip()
}

fn draw_rows(app: &AppState, ctx: &mut ScreenCtx<'_>, layout: &Layout) -> Result<()> {
    let list = layout.list;
    ctx.draw.panel(list, 6.0, colors::PANEL)?;
    ctx.draw.backend.push_clip(list)?;

    let hovered = layout.row_at(ctx.draw.input.pointer, app.listing.scroll_offset);
    for (i, entry) in app.listing.entries().iter().enumerate() {
        let y = list.y + i as f32 * ITEM_HEIGHT + app.listing.scroll_offset;
        if y + ITEM_HEIGHT < list.y || y > list.bottom() {
            continue;
        }
        let row = Rect::new(list.x, y, list.w, ITEM_HEIGHT);
        draw_row(
            ctx,
            row,
            entry.kind,
            &entry.display_name,
            entry.selected,
            hovered == Some(i),
        )?;
    }
    ctx.draw.backend.pop_clip()
}

fn draw_row(
    ctx: &mut ScreenCtx<'_>,
    row: Rect,
    kind: EntryKind,
    name: &str,
    selected: bool,
    hovered: bool,
) -> Result<()> {
    if selected {
        ctx.draw.fill(row, colors::HIGHLIGHT)?;
    } else if hovered {
        ctx.draw.fill(row, colors::BUTTON)?;
    }
    let icon = match kind {
        EntryKind::ParentLink => Icon::Parent,
        EntryKind::Folder => Icon::Folder,
        EntryKind::Video => Icon::Video,
    };
    let text_color = if selected {
        colors::BACKGROUND
    } else {
        colors::TEXT
    };
    let icon_y = row.center().y - ICON_SIZE / 2.0;
    ctx.draw
        .icon(icon, Vec2::new(row.x + 8.0, icon_y), text_color)?;
    let text_y = row.center().y - f32::from(FONT_MEDIUM) / 2.0;
    ctx.draw.label(
        name,
        Vec2::new(row.x + 16.0 + ICON_SIZE, text_y),
        FONT_MEDIUM,
        text_color,
    )
}
