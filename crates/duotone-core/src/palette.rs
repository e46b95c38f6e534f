//! Two-color palettes and the shaders they are pushed to.
//!
//! Each palette is a light/dark pair. The active palette feeds two shaders:
//! the UI dither pass, which honours the global "invert colors" flag, and
//! the video color-map pass, which always gets light/dark in order.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, info, warn};

use duotone_types::backend::{GraphicsBackend, ShaderId, UniformLocation};
use duotone_types::color::Color;

/// Uniform receiving the color bright pixels map to.
pub const LIGHT_UNIFORM: &str = "lightColor";
/// Uniform receiving the color dark pixels map to.
pub const DARK_UNIFORM: &str = "darkColor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub light: Color,
    pub dark: Color,
}

pub const BUILTIN_PALETTES: [PaletteEntry; 5] = [
    PaletteEntry {
        name: "Classic",
        light: Color::rgb(255, 255, 255),
        dark: Color::rgb(0, 0, 0),
    },
    PaletteEntry {
        name: "Gaming Male Child",
        light: Color::rgb(136, 192, 112),
        dark: Color::rgb(8, 24, 32),
    },
    PaletteEntry {
        name: "Seppy",
        light: Color::rgb(214, 169, 86),
        dark: Color::rgb(27, 7, 1),
    },
    PaletteEntry {
        name: "There's a Bomb in my Pop",
        light: Color::rgb(104, 141, 242),
        dark: Color::rgb(46, 11, 7),
    },
    PaletteEntry {
        name: "Kitty Coffee",
        light: Color::rgb(243, 190, 231),
        dark: Color::rgb(26, 23, 39),
    },
];

/// A loaded shader with its two color uniforms resolved.
#[derive(Debug, Clone)]
pub struct ShaderHandle {
    pub id: ShaderId,
    pub name: String,
    light: Option<UniformLocation>,
    dark: Option<UniformLocation>,
}

impl ShaderHandle {
    /// Load a shader and resolve its color uniforms.
    ///
    /// Failure to load is logged and yields `None`; a missing uniform is
    /// logged once here and every later color push becomes a no-op.
    pub fn load(gfx: &mut dyn GraphicsBackend, path: &Path) -> Option<Self> {
        let name = path.display().to_string();
        let id = match gfx.load_shader(path) {
            Ok(id) => id,
            Err(e) => {
                warn!("shader {name} failed to load: {e}");
                return None;
            },
        };
        info!("loaded shader {name}");
        let lookup = |uniform: &str| {
            let loc = gfx.uniform_location(id, uniform);
            if loc.is_none() {
                warn!("shader {name} has no uniform {uniform}");
            }
            loc
        };
        let light = lookup(LIGHT_UNIFORM);
        let dark = lookup(DARK_UNIFORM);
        Some(Self {
            id,
            name,
            light,
            dark,
        })
    }

    /// Push the color pair to the shader's `lightColor`/`darkColor`.
    ///
    /// Both uniforms must resolve; otherwise nothing is pushed, so the
    /// shader never holds half of a palette.
    pub fn set_colors(&self, gfx: &mut dyn GraphicsBackend, light: Color, dark: Color) {
        let (Some(light_loc), Some(dark_loc)) = (self.light, self.dark) else {
            debug!("shader {}: color uniforms missing, skipping push", self.name);
            return;
        };
        for (loc, color) in [(light_loc, light), (dark_loc, dark)] {
            if let Err(e) = gfx.set_uniform_vec4(self.id, loc, color.to_vec4()) {
                warn!("shader {}: uniform update failed: {e}", self.name);
            }
        }
    }
}

/// The two shaders the palette drives. Either may be missing.
#[derive(Debug, Clone, Default)]
pub struct ShaderSet {
    /// Full-screen dither applied to the UI surface.
    pub dither: Option<ShaderHandle>,
    /// Color map applied to the video frame.
    pub colormap: Option<ShaderHandle>,
}

impl ShaderSet {
    pub fn load(gfx: &mut dyn GraphicsBackend, dither: &Path, colormap: &Path) -> Self {
        Self {
            dither: ShaderHandle::load(gfx, dither),
            colormap: ShaderHandle::load(gfx, colormap),
        }
    }

    pub fn unload(&mut self, gfx: &mut dyn GraphicsBackend) {
        for handle in [self.dither.take(), self.colormap.take()].into_iter().flatten() {
            gfx.unload_shader(handle.id);
        }
    }
}

/// The palette table, the active selection and the inversion flag.
#[derive(Debug, Clone)]
pub struct PaletteSet {
    entries: Vec<PaletteEntry>,
    flags: Vec<bool>,
    /// Index of the active palette. May be set directly; [`Self::normalize`]
    /// brings the selection flags back in line.
    pub active_index: usize,
    /// Swap light and dark in the UI dither pass.
    pub inverted: bool,
    warned_missing: HashSet<&'static str>,
}

impl PaletteSet {
    pub fn new(entries: Vec<PaletteEntry>, initial: usize) -> Self {
        let mut set = Self {
            flags: vec![false; entries.len()],
            entries,
            active_index: initial,
            inverted: false,
            warned_missing: HashSet::new(),
        };
        set.normalize();
        set
    }

    pub fn builtin(initial: usize) -> Self {
        Self::new(BUILTIN_PALETTES.to_vec(), initial)
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Recompute the selection flags from `active_index`.
    ///
    /// Idempotent; run once per frame so the flags never drift.
    pub fn normalize(&mut self) {
        if self.entries.is_empty() {
            self.active_index = 0;
            return;
        }
        if self.active_index >= self.entries.len() {
            self.active_index = self.entries.len() - 1;
        }
        for (i, flag) in self.flags.iter_mut().enumerate() {
            *flag = i == self.active_index;
        }
    }

    pub fn select(&mut self, index: usize) {
        self.active_index = index;
        self.normalize();
    }

    pub fn active(&self) -> Option<&PaletteEntry> {
        self.entries.get(self.active_index)
    }

    /// Colors for the UI dither pass, honouring inversion.
    pub fn ui_colors(&self) -> Option<(Color, Color)> {
        let p = self.active()?;
        Some(if self.inverted {
            (p.dark, p.light)
        } else {
            (p.light, p.dark)
        })
    }

    /// Push the active palette to both shaders.
    pub fn apply(&mut self, gfx: &mut dyn GraphicsBackend, shaders: &ShaderSet) {
        self.apply_ui(gfx, shaders);
        let Some(p) = self.active().copied() else {
            return;
        };
        match &shaders.colormap {
            Some(shader) => shader.set_colors(gfx, p.light, p.dark),
            None => self.warn_missing("colormap"),
        }
    }

    /// Flip inversion and re-push the UI dither colors only.
    pub fn toggle_inversion(&mut self, gfx: &mut dyn GraphicsBackend, shaders: &ShaderSet) {
        self.inverted = !self.inverted;
        debug!("colors inverted: {}", self.inverted);
        self.apply_ui(gfx, shaders);
    }

    fn apply_ui(&mut self, gfx: &mut dyn GraphicsBackend, shaders: &ShaderSet) {
        let Some((first, second)) = self.ui_colors() else {
            return;
        };
        match &shaders.dither {
            Some(shader) => shader.set_colors(gfx, first, second),
            None => self.warn_missing("dither"),
        }
    }

    fn warn_missing(&mut self, which: &'static str) {
        if self.warned_missing.insert(which) {
            warn!("{which} shader unavailable, palette not applied to it");
        }
    }
}
