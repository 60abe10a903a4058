use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub modified: SystemTime,
}

pub trait DirectoryLister {
    /// Return the immediate entries of `dir`, never descending into subdirectories.
    fn list(&self, dir: &Path) -> io::Result<Vec<DirectoryEntry>>;
}

pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
        if !fs::metadata(dir)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", dir.display()),
            ));
        }

        let mut entries = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path().to_path_buf();

            // Follow symlinks like the shell would; a dangling link still has its own mtime
            let meta = match fs::metadata(&path) {
                Ok(m) => m,
                Err(_) => entry.metadata().map_err(io::Error::from)?,
            };

            entries.push(DirectoryEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: meta.is_dir(),
                modified: meta.modified()?,
                path,
            });
        }

        Ok(entries)
    }
}
