//! duotone-core: platform-agnostic application logic.
//!
//! Screens, transitions, the directory explorer, palettes and the
//! compositor all talk to the platform only through the backend traits in
//! `duotone-types`. No platform-specific code lives here.

pub mod animation;
pub mod app;
pub mod background;
pub mod camera;
pub mod compositor;
pub mod directory;
pub mod icons;
pub mod palette;
pub mod screen;
pub mod screens;
pub mod transition;
pub mod ui;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_utils;

pub use duotone_types::{backend, bitmap_font, color, config, error, geometry, input};

pub use app::AppState;
pub use compositor::Compositor;
pub use screen::ScreenKind;
