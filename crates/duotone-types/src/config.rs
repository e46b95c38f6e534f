//! Application configuration.
//!
//! Defaults cover everything; an optional read-only TOML file and a few
//! environment variables may override them. Nothing is ever written back.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DuotoneError, Result};

/// Environment variable overriding the initial explorer directory.
pub const ENV_START_DIR: &str = "DUOTONE_START_DIR";
/// Environment variable overriding the shader directory.
pub const ENV_SHADER_DIR: &str = "DUOTONE_SHADER_DIR";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_title: String,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Directory holding the shader programs.
    pub shader_dir: PathBuf,
    /// UI dithering shader, relative to `shader_dir`.
    pub dither_shader: String,
    /// Video color-mapping shader, relative to `shader_dir`.
    pub colormap_shader: String,
    /// Screen transition length in seconds.
    pub transition_secs: f32,
    /// Palette selected at startup.
    pub initial_palette: usize,
    /// Playback volume when not muted, `0.0..=1.0`.
    pub volume: f32,
    /// Initial explorer directory. `None` uses the process working directory.
    pub start_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "duotone".to_string(),
            screen_width: 1280,
            screen_height: 720,
            shader_dir: PathBuf::from("resources/shaders"),
            dither_shader: "dither.toml".to_string(),
            colormap_shader: "colormap.toml".to_string(),
            transition_secs: 0.5,
            initial_palette: 2,
            volume: 1.0,
            start_dir: None,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(s)?;
        config.sanitize();
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DuotoneError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_START_DIR).filter(|s| !s.is_empty()) {
            self.start_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(ENV_SHADER_DIR).filter(|s| !s.is_empty()) {
            self.shader_dir = PathBuf::from(dir);
        }
    }

    pub fn dither_shader_path(&self) -> PathBuf {
        self.shader_dir.join(&self.dither_shader)
    }

    pub fn colormap_shader_path(&self) -> PathBuf {
        self.shader_dir.join(&self.colormap_shader)
    }

    fn sanitize(&mut self) {
        self.screen_width = self.screen_width.max(1);
        self.screen_height = self.screen_height.max(1);
        self.volume = self.volume.clamp(0.0, 1.0);
        if !(self.transition_secs > 0.0) {
            log::warn!(
                "transition_secs {} is not positive, using default",
                self.transition_secs
            );
            self.transition_secs = Self::default().transition_secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_surface() {
        let c = AppConfig::default();
        assert_eq!((c.screen_width, c.screen_height), (1280, 720));
        assert_eq!(c.transition_secs, 0.5);
        assert!(c.start_dir.is_none());
        assert_eq!(
            c.dither_shader_path(),
            PathBuf::from("resources/shaders/dither.toml")
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = AppConfig::from_toml_str("screen_width = 800\nvolume = 0.25\n").unwrap();
        assert_eq!(c.screen_width, 800);
        assert_eq!(c.screen_height, 720);
        assert_eq!(c.volume, 0.25);
    }

    #[test]
    fn sanitize_clamps() {
        let c = AppConfig::from_toml_str("volume = 3.0\ntransition_secs = -1.0\n").unwrap();
        assert_eq!(c.volume, 1.0);
        assert_eq!(c.transition_secs, 0.5);
    }

    #[test]
    fn bad_toml_is_error() {
        assert!(AppConfig::from_toml_str("screen_width = \"wide\"").is_err());
    }

    #[test]
    fn env_overrides() {
        let mut c = AppConfig::default();
        c.apply_env(|k| match k {
            ENV_START_DIR => Some("/media/videos".to_string()),
            ENV_SHADER_DIR => Some(String::new()),
            _ => None,
        });
        assert_eq!(c.start_dir, Some(PathBuf::from("/media/videos")));
        assert_eq!(c.shader_dir, PathBuf::from("resources/shaders"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = AppConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, DuotoneError::Config(_)));
    }
}
