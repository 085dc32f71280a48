use std::io;
use std::path::{Path, PathBuf};

/// Enumerates the entries of a directory.
///
/// `path` is the normalised request path (`""` for the root, `/docs` for a
/// subdirectory). Entries are returned in the order the source yields them.
/// An error means the path could not be opened as a directory.
pub trait DirectoryLister: Send + Sync {
    fn list(&self, path: &str) -> io::Result<Vec<String>>;
}

/// Lists directories from the local filesystem below a root directory.
///
/// Like POSIX `readdir`, the result starts with `.` and `..`; the entries
/// themselves follow in filesystem order. The request path is joined onto
/// the root without validation, so `..` segments are not confined.
#[derive(Debug, Clone)]
pub struct FsLister {
    root: PathBuf,
}

impl FsLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

impl DirectoryLister for FsLister {
    fn list(&self, path: &str) -> io::Result<Vec<String>> {
        let dir = self.resolve(path);
        let mut entries = vec![".".to_string(), "..".to_string()];

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            entries.push(entry.file_name().to_string_lossy().into_owned());
        }

        tracing::trace!(dir = %dir.display(), count = entries.len(), "Listed directory");
        Ok(entries)
    }
}
