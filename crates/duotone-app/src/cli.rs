//! Command-line arguments and config resolution.
//!
//! ```text
//! duotone [--config FILE] [START_DIR]
//! ```
//!
//! Precedence, lowest first: built-in defaults, the config file
//! (`--config`, else `duotone.toml` in the working directory if present),
//! environment variables, then the positional start directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use duotone_types::config::AppConfig;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "duotone.toml";

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub start_dir: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments, not including the program name.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().context("--config needs a file argument")?;
                    parsed.config = Some(PathBuf::from(path));
                },
                flag if flag.starts_with('-') => bail!("unknown option: {flag}"),
                _ if parsed.start_dir.is_some() => bail!("unexpected argument: {arg}"),
                _ => parsed.start_dir = Some(PathBuf::from(arg)),
            }
        }
        Ok(parsed)
    }
}

/// Build the effective configuration.
pub fn resolve_config(
    args: &CliArgs,
    cwd: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            let implicit = cwd.join(DEFAULT_CONFIG_FILE);
            if implicit.is_file() {
                log::info!("using config {}", implicit.display());
                AppConfig::from_file(&implicit)?
            } else {
                AppConfig::default()
            }
        },
    };
    config.apply_env(env);
    if let Some(dir) = &args.start_dir {
        config.start_dir = Some(dir.clone());
    }
    Ok(config)
}
