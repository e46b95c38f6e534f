//! Filesystem access used by the directory explorer.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

/// A direct child of a directory, as reported by a [`FileSystem`].
///
/// `name` is the raw file name, so paths built from it exist on disk even
/// when the name is not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub name: OsString,
    pub is_dir: bool,
}

impl FsEntry {
    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

/// Enumerates directory children.
///
/// Entries are returned in whatever order the underlying source produces;
/// callers must not assume any sorting.
pub trait FileSystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>>;

    /// Directory relative paths are resolved against.
    fn current_dir(&self) -> io::Result<PathBuf>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("skipping unreadable entry in {}: {e}", path.display());
                    continue;
                },
            };
            // Follow symlinks so linked folders browse like folders.
            let is_dir = match std::fs::metadata(entry.path()) {
                Ok(meta) => meta.is_dir(),
                Err(_) => false,
            };
            out.push(FsEntry {
                name: entry.file_name(),
                is_dir,
            });
        }
        Ok(out)
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
}
