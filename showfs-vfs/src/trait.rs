//! VirtualFileSystem trait definition

use crate::error::VfsResult;
use std::path::Path;
use std::time::SystemTime;

/// Stat information captured for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// Last path component (`/` for the root)
    pub name: String,
    /// Size in bytes (0 for directories on the memory backend)
    pub size: u64,
    /// Last modification time, if the backend knows it
    pub modified: Option<SystemTime>,
    /// Whether the path is a directory
    pub is_dir: bool,
}

/// File system backend used by the object cache
///
/// All paths are absolute. Implemented by `MemoryFileSystem` (tests, tooling)
/// and `NativeFileSystem` (the real disk).
pub trait VirtualFileSystem: Send + Sync {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Create or truncate a file; the parent directory must exist
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Stat a path; `VfsError::NotFound` if it is missing
    fn metadata(&self, path: &Path) -> VfsResult<FileStat>;

    /// Entry names of a directory, sorted by name on every backend
    fn read_dir(&self, path: &Path) -> VfsResult<Vec<String>>;

    /// Create a single directory
    ///
    /// Fails with `VfsError::AlreadyExists` if the path exists and with
    /// `VfsError::NotFound` if the parent is missing.
    fn create_dir(&self, path: &Path) -> VfsResult<()>;

    /// Atomically replace `to` with `from`
    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()>;
}
