//! Showfs Virtual File System
//!
//! A virtual file system abstraction with multiple backend implementations.
//! The object cache performs all of its IO through [`VirtualFileSystem`], so
//! the same code runs against the real disk and against an in-memory tree.
//!
//! # Usage
//! ```rust
//! use showfs_vfs::{MemoryFileSystem, VirtualFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::with_files([("/show/a.txt", b"hello".to_vec())]);
//! assert!(fs.is_dir(Path::new("/show")));
//! assert_eq!(fs.read_dir(Path::new("/show")).unwrap(), vec!["a.txt".to_string()]);
//! ```

mod error;
mod memory;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;
pub use r#trait::{FileStat, VirtualFileSystem};

