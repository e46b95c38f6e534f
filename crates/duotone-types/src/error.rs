//! Error types for duotone.

use std::io;

/// Errors produced by the duotone framework and its backends.
#[derive(Debug, thiserror::Error)]
pub enum DuotoneError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("shader error: {0}")]
    Shader(String),

    #[error("media error: {0}")]
    Media(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DuotoneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let e = DuotoneError::Backend("init failed".into());
        assert_eq!(format!("{e}"), "backend error: init failed");
    }

    #[test]
    fn shader_error_display() {
        let e = DuotoneError::Shader("unknown program".into());
        assert_eq!(format!("{e}"), "shader error: unknown program");
    }

    #[test]
    fn media_error_display() {
        let e = DuotoneError::Media("no video stream".into());
        assert_eq!(format!("{e}"), "media error: no video stream");
    }

    #[test]
    fn config_error_display() {
        let e = DuotoneError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: DuotoneError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: DuotoneError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: DuotoneError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }
}
