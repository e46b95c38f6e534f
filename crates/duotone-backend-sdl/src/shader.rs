//! CPU shader programs.
//!
//! A program is described by a small TOML file instead of GLSL:
//!
//! ```toml
//! program = "ordered-dither"   # or "duotone-map"
//! matrix = 4                   # Bayer matrix size: 2, 4 or 8
//! pixel_scale = 2              # screen pixels per dither cell
//!
//! [uniforms]
//! lightColor = [1.0, 1.0, 1.0, 1.0]
//! darkColor = [0.0, 0.0, 0.0, 1.0]
//! ```
//!
//! Only uniforms listed in `[uniforms]` can be looked up; the listed value
//! is the default until the application sets it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use duotone_types::backend::UniformLocation;
use duotone_types::color::Color;
use duotone_types::error::{DuotoneError, Result};

const LIGHT: &str = "lightColor";
const DARK: &str = "darkColor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ProgramKind {
    OrderedDither,
    DuotoneMap,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgramSource {
    program: ProgramKind,
    #[serde(default = "default_matrix")]
    matrix: u32,
    #[serde(default = "default_pixel_scale")]
    pixel_scale: u32,
    #[serde(default = "default_contrast")]
    contrast: f32,
    #[serde(default)]
    uniforms: BTreeMap<String, [f32; 4]>,
}

fn default_matrix() -> u32 {
    4
}

fn default_pixel_scale() -> u32 {
    1
}

fn default_contrast() -> f32 {
    1.0
}

#[derive(Debug, Clone)]
enum Effect {
    /// Threshold luminance against a tiled Bayer matrix.
    Dither {
        size: u32,
        pixel_scale: u32,
        thresholds: Vec<f32>,
    },
    /// Map luminance onto the dark..light gradient.
    Map { contrast: f32 },
}

#[derive(Debug, Clone)]
pub struct ShaderProgram {
    effect: Effect,
    names: Vec<String>,
    values: Vec<[f32; 4]>,
}

impl ShaderProgram {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DuotoneError::Shader(format!("{}: {e}", path.display())))?;
        Self::parse(&text).map_err(|e| match e {
            DuotoneError::TomlParse(e) => {
                DuotoneError::Shader(format!("{}: {e}", path.display()))
            },
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self> {
        let source: ProgramSource = toml::from_str(text)?;
        let effect = match source.program {
            ProgramKind::OrderedDither => {
                if !matches!(source.matrix, 2 | 4 | 8) {
                    return Err(DuotoneError::Shader(format!(
                        "unsupported dither matrix size {}",
                        source.matrix
                    )));
                }
                Effect::Dither {
                    size: source.matrix,
                    pixel_scale: source.pixel_scale.max(1),
                    thresholds: bayer_thresholds(source.matrix),
                }
            },
            ProgramKind::DuotoneMap => Effect::Map {
                contrast: source.contrast.max(0.0),
            },
        };
        let (names, values) = source.uniforms.into_iter().unzip();
        Ok(Self {
            effect,
            names,
            values,
        })
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| UniformLocation(i as u32))
    }

    pub fn set_uniform(&mut self, location: UniformLocation, value: [f32; 4]) -> Result<()> {
        let slot = self
            .values
            .get_mut(location.0 as usize)
            .ok_or_else(|| DuotoneError::Shader(format!("no uniform at {}", location.0)))?;
        *slot = value;
        Ok(())
    }

    fn uniform(&self, name: &str, fallback: Color) -> Color {
        self.uniform_location(name)
            .map(|loc| Color::from_vec4(self.values[loc.0 as usize]))
            .unwrap_or(fallback)
    }

    /// Resolve the two palette colors once per draw call.
    pub fn colors(&self) -> (Color, Color) {
        (
            self.uniform(LIGHT, Color::WHITE),
            self.uniform(DARK, Color::BLACK),
        )
    }

    /// Shade one pixel written at screen position (`x`, `y`). Alpha passes
    /// through unchanged.
    pub fn shade(&self, colors: (Color, Color), x: i32, y: i32, src: Color) -> Color {
        let (light, dark) = colors;
        let lum = src.luminance();
        let out = match &self.effect {
            Effect::Dither {
                size,
                pixel_scale,
                thresholds,
            } => {
                let cx = (x.max(0) as u32 / pixel_scale) % size;
                let cy = (y.max(0) as u32 / pixel_scale) % size;
                if lum > thresholds[(cy * size + cx) as usize] {
                    light
                } else {
                    dark
                }
            },
            Effect::Map { contrast } => {
                let t = ((lum - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
                duotone_types::color::lerp_color(dark, light, t)
            },
        };
        out.with_alpha(src.a)
    }
}

/// Normalized thresholds of an `n`x`n` Bayer matrix, row-major.
pub fn bayer_thresholds(n: u32) -> Vec<f32> {
    let mut m = vec![0u32];
    let mut size = 1;
    while size < n {
        let next = size * 2;
        let mut grown = vec![0u32; (next * next) as usize];
        for y in 0..size {
            for x in 0..size {
                let v = 4 * m[(y * size + x) as usize];
                grown[(y * next + x) as usize] = v;
                grown[(y * next + x + size) as usize] = v + 2;
                grown[((y + size) * next + x) as usize] = v + 3;
                grown[((y + size) * next + x + size) as usize] = v + 1;
            }
        }
        m = grown;
        size = next;
    }
    let cells = (n * n) as f32;
    m.into_iter().map(|v| (v as f32 + 0.5) / cells).collect()
}
