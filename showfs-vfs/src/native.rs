//! Native file system implementation

use crate::error::{VfsError, VfsResult};
use crate::r#trait::FileStat;
use crate::VirtualFileSystem;
use std::path::Path;

/// A native OS file system implementation.
///
/// This wraps `std::fs` operations and provides the `VirtualFileSystem`
/// interface for local file access.
#[derive(Debug, Clone, Default)]
pub struct NativeFileSystem {}

impl NativeFileSystem {
    /// Create a new native file system.
    pub fn new() -> Self {
        Self {}
    }
}

impl VirtualFileSystem for NativeFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| VfsError::from_io(e, path))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        std::fs::write(path, content).map_err(|e| VfsError::from_io(e, path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn metadata(&self, path: &Path) -> VfsResult<FileStat> {
        let meta = std::fs::metadata(path).map_err(|e| VfsError::from_io(e, path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("/"));
        Ok(FileStat {
            name,
            size: meta.len(),
            modified: meta.modified().ok(),
            is_dir: meta.is_dir(),
        })
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| VfsError::from_io(e, path))? {
            let entry = entry.map_err(|e| VfsError::from_io(e, path))?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    fn create_dir(&self, path: &Path) -> VfsResult<()> {
        std::fs::create_dir(path).map_err(|e| VfsError::from_io(e, path))
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        std::fs::rename(from, to).map_err(|e| VfsError::from_io(e, from))
    }
}
