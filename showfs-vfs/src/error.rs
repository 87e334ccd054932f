//! VFS Error Types

use thiserror::Error;

/// Result type for VFS operations
pub type VfsResult<T> = Result<T, VfsError>;

/// Error type for VFS operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VfsError {
    /// File or directory not found
    #[error("Path not found: {path}")]
    NotFound { path: String },

    /// Permission denied
    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// Path already exists
    #[error("Path already exists: {path}")]
    AlreadyExists { path: String },

    /// Invalid path
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// IO error
    #[error("IO error: {message}")]
    Io { message: String },

    /// Custom error message
    #[error("{message}")]
    Custom { message: String },
}

impl VfsError {
    /// Whether this error means the path does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound { .. })
    }

    /// Map an `std::io::Error` for `path` onto the matching variant.
    pub fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        let path = path.to_string_lossy().to_string();
        match err.kind() {
            std::io::ErrorKind::NotFound => VfsError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => VfsError::PermissionDenied { path },
            std::io::ErrorKind::AlreadyExists => VfsError::AlreadyExists { path },
            _ => err.into(),
        }
    }
}

impl From<std::io::Error> for VfsError {
    fn from(err: std::io::Error) -> Self {
        VfsError::Io {
            message: err.to_string(),
        }
    }
}
