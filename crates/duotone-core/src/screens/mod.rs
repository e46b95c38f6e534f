//! The four top-level screen renderers.
//!
//! Each renderer draws itself through a [`ScreenCtx`] and reacts to the
//! input in it. The compositor hands the outgoing screen of a transition a
//! passive input snapshot, so only the incoming screen responds to the user.
//! Renderers are the only callers of [`AppState::transition_to`].

pub mod explorer;
pub mod palettes;
pub mod start;
pub mod viewer;

use duotone_types::backend::MediaBackend;
use duotone_types::error::Result;
use duotone_types::geometry::Rect;

use crate::app::AppState;
use crate::palette::ShaderSet;
use crate::screen::ScreenKind;
use crate::ui::DrawContext;

/// What a screen renderer draws with.
pub struct ScreenCtx<'a> {
    pub draw: DrawContext<'a>,
    pub media: &'a mut dyn MediaBackend,
    pub shaders: &'a ShaderSet,
    /// Area the screen lays itself out in.
    pub bounds: Rect,
}

/// Draw `screen` and apply whatever input it consumed.
pub fn draw_screen(screen: ScreenKind, app: &mut AppState, ctx: &mut ScreenCtx<'_>) -> Result<()> {
    match screen {
        ScreenKind::Start => start::draw(app, ctx),
        ScreenKind::Explorer => explorer::draw(app, ctx),
        ScreenKind::Viewing => viewer::draw(app, ctx),
        ScreenKind::Palettes => palettes::draw(app, ctx),
    }
}
