//! PNG snapshots of the framebuffer.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Result, ensure};

/// Directory screenshots are written to, relative to the working directory.
pub const SCREENSHOT_DIR: &str = "screenshots";

/// Save `rgba` into `dir` under a timestamped name. Returns the file path.
pub fn save(dir: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<PathBuf> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("duotone-{millis}.png"));
    save_png(&path, width, height, rgba)?;
    Ok(path)
}

fn save_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    ensure!(
        rgba.len() == width as usize * height as usize * 4,
        "framebuffer is {} bytes, expected {width}x{height} RGBA",
        rgba.len()
    );
    let file = fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    Ok(())
}
