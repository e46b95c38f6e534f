//! Directory explorer model.
//!
//! A [`DirectoryListing`] holds the folders and video files directly inside
//! one path. Row 0 is always a link to the parent directory, followed by
//! folders, then videos, each group in the order the filesystem returned
//! them. The listing is rebuilt from scratch on every navigation.

mod fs;

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};

use crate::animation::easing::linear;

pub use fs::{FileSystem, FsEntry, StdFileSystem};

/// File name suffixes treated as playable video (case-sensitive).
pub const VIDEO_EXTENSIONS: [&str; 4] = [".mov", ".mp4", ".mkv", ".avi"];

/// How quickly the visible scroll offset closes on its target, per second.
const SCROLL_SPEED: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    ParentLink,
    Folder,
    Video,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub display_name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub selected: bool,
}

/// Outcome of a click or activation on a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// Nothing happened (index out of range).
    None,
    /// The row became selected; a second click activates it.
    Selected,
    /// The listing now shows a different directory.
    Navigated,
    /// A video row was activated.
    OpenVideo(PathBuf),
}

/// Checked on the raw bytes so names that are not valid UTF-8 still match.
pub fn is_video_name(name: impl AsRef<OsStr>) -> bool {
    let bytes = name.as_ref().as_encoded_bytes();
    VIDEO_EXTENSIONS
        .iter()
        .any(|ext| bytes.ends_with(ext.as_bytes()))
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Parent of `path`, or `path` itself when it has none (filesystem root).
fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

fn absolute(fs: &dyn FileSystem, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match fs.current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            warn!("cannot resolve {} against the working directory: {e}", path.display());
            path.to_path_buf()
        },
    }
}

#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    current_path: PathBuf,
    /// Text in the editable path box.
    pub input: String,
    entries: Vec<DirectoryEntry>,
    selected: Option<usize>,
    /// Offset the list is drawn at (eases toward `target_scroll`).
    pub scroll_offset: f32,
    /// Where the list is scrolling to. Always `<= 0`.
    pub target_scroll: f32,
}

impl DirectoryListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Replace the listing with the contents of `path`.
    ///
    /// An unreadable directory yields only the parent link.
    /// Relative paths are resolved against the filesystem's current
    /// directory, so the parent link always leads somewhere new until the
    /// root is reached.
    pub fn navigate(&mut self, fs: &dyn FileSystem, path: &Path) {
        let path = normalize_path(&absolute(fs, path));
        debug!("navigate {}", path.display());

        let children = match fs.read_dir(&path) {
            Ok(children) => children,
            Err(e) => {
                warn!("cannot read directory {}: {e}", path.display());
                Vec::new()
            },
        };

        let wanted = children
            .iter()
            .filter(|c| c.is_dir || is_video_name(&c.name))
            .count();
        let mut entries = Vec::with_capacity(wanted + 1);
        entries.push(DirectoryEntry {
            display_name: "..".to_string(),
            path: parent_of(&path),
            kind: EntryKind::ParentLink,
            selected: false,
        });
        let folders = children.iter().filter(|c| c.is_dir);
        let videos = children
            .iter()
            .filter(|c| !c.is_dir && is_video_name(&c.name));
        let rows = folders
            .map(|c| (c, EntryKind::Folder))
            .chain(videos.map(|c| (c, EntryKind::Video)));
        entries.extend(rows.map(|(c, kind)| DirectoryEntry {
            display_name: c.name.to_string_lossy().into_owned(),
            path: path.join(&c.name),
            kind,
            selected: false,
        }));

        self.input = path.display().to_string();
        self.current_path = path;
        self.entries = entries;
        self.selected = None;
        self.reset_scroll();
    }

    /// Mark row `index` as the only selected row. Out-of-range is ignored.
    pub fn select(&mut self, index: usize) {
        if index >= self.entries.len() {
            return;
        }
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.selected = i == index;
        }
        self.selected = Some(index);
    }

    /// Open row `index`: folders and the parent link navigate, videos are
    /// handed back to the caller.
    pub fn activate(&mut self, fs: &dyn FileSystem, index: usize) -> Activation {
        let Some(entry) = self.entries.get(index) else {
            return Activation::None;
        };
        match entry.kind {
            EntryKind::Video => Activation::OpenVideo(entry.path.clone()),
            EntryKind::Folder | EntryKind::ParentLink => {
                let path = entry.path.clone();
                self.navigate(fs, &path);
                Activation::Navigated
            },
        }
    }

    /// Two-step click: the first click on a row selects it, a click on the
    /// already selected row activates it.
    pub fn click(&mut self, fs: &dyn FileSystem, index: usize) -> Activation {
        if index >= self.entries.len() {
            return Activation::None;
        }
        if self.selected == Some(index) {
            self.activate(fs, index)
        } else {
            self.select(index);
            Activation::Selected
        }
    }

    /// Lowest allowed scroll offset for a list of this length.
    pub fn min_scroll(&self, item_height: f32, list_height: f32) -> f32 {
        let content = self.entries.len() as f32 * item_height;
        (list_height - content).min(0.0)
    }

    /// Scroll by a wheel delta of `step` pixels per notch (positive scrolls
    /// toward the top).
    pub fn scroll_by(&mut self, wheel: f32, step: f32, item_height: f32, list_height: f32) {
        if !wheel.is_finite() {
            return;
        }
        let min = self.min_scroll(item_height, list_height);
        self.target_scroll = (self.target_scroll + wheel * step).clamp(min, 0.0);
    }

    /// Ease the visible offset toward the target.
    pub fn update_scroll(&mut self, dt: f32) {
        let step = linear(dt * SCROLL_SPEED);
        self.scroll_offset += (self.target_scroll - self.scroll_offset) * step;
        if (self.target_scroll - self.scroll_offset).abs() < 0.5 {
            self.scroll_offset = self.target_scroll;
        }
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0.0;
        self.target_scroll = 0.0;
    }

    pub fn push_input_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.input.push(ch);
        }
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    /// Navigate to the path typed into the path box.
    ///
    /// Returns `false` (and leaves the listing alone) when the box is empty.
    pub fn submit_input(&mut self, fs: &dyn FileSystem) -> bool {
        let typed = self.input.trim();
        if typed.is_empty() {
            return false;
        }
        let target = PathBuf::from(typed);
        self.navigate(fs, &target);
        true
    }
}
