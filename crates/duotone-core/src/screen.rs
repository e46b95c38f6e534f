//! Top-level screens and their camera layout.

use duotone_types::geometry::Vec2;

/// One of the four top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Palettes,
    Start,
    Explorer,
    Viewing,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 4] = [
        ScreenKind::Palettes,
        ScreenKind::Start,
        ScreenKind::Explorer,
        ScreenKind::Viewing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScreenKind::Palettes => "palettes",
            ScreenKind::Start => "start",
            ScreenKind::Explorer => "explorer",
            ScreenKind::Viewing => "viewer",
        }
    }
}

/// Camera position the background pans to while `screen` is shown.
///
/// The screens sit on a horizontal strip 200 px apart, palettes leftmost.
pub fn camera_target(screen: ScreenKind) -> Vec2 {
    let x = match screen {
        ScreenKind::Palettes => 0.0,
        ScreenKind::Start => 200.0,
        ScreenKind::Explorer => 400.0,
        ScreenKind::Viewing => 600.0,
    };
    Vec2::new(x, 0.0)
}
