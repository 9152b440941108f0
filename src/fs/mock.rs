// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(SystemTime),
    Dir(Vec<String>), // List of child names
}

/// In-memory tree rooted at `"."`.
///
/// Paths must be spelled the way `read_dir` hands them back, i.e. prefixed
/// with `./` (`"./app/models/article.rb"`).
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    clock: Arc<AtomicU64>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            clock: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Add (or re-create) a file. Every call stamps a fresh modification time.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let mtime = self.tick();
        self.insert_file(path.as_ref(), mtime);
    }

    /// Simulate an edit: bump the modification time of an existing file.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mtime = self.tick();
        self.set_modified(path, mtime);
    }

    pub fn set_modified(&self, path: impl AsRef<Path>, mtime: SystemTime) {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(MockEntry::File(t)) = files.get_mut(path.as_ref()) {
            *t = mtime;
        }
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if files.remove(path).is_none() {
            return;
        }
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
                children.retain(|c| c.as_str() != name.to_string_lossy());
            }
        }
    }

    fn tick(&self) -> SystemTime {
        let secs = self.clock.fetch_add(1, Ordering::SeqCst);
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn insert_file(&self, path: &Path, mtime: SystemTime) {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.insert(path.to_path_buf(), MockEntry::File(mtime));

        if let Some(parent) = path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };

            self.ensure_dir_entry(&mut files, parent);
            Self::link_child(&mut files, parent, path);
        }
    }

    fn ensure_dir_entry(&self, files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };

            if parent != path {
                self.ensure_dir_entry(files, parent);
                Self::link_child(files, parent, path);
            }
        }
    }

    fn link_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(files.get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(files.get(path), Some(MockEntry::Dir(_)))
    }

    // The mock tree has no links.
    fn is_symlink(&self, _path: &Path) -> bool {
        false
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        match files.get(path) {
            Some(MockEntry::File(mtime)) => Ok(*mtime),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
