//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::r#trait::FileStat;
use crate::VirtualFileSystem;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

#[derive(Debug, Clone)]
enum Entry {
    File { content: Vec<u8>, modified: SystemTime },
    Dir { modified: SystemTime },
}

/// An in-memory file system implementation.
///
/// Entries are stored in a `BTreeMap` keyed by normalized absolute path, so
/// directory listings come out sorted for free. The root directory always
/// exists; `with_files` creates missing ancestor directories implicitly,
/// while `write_file` and `create_dir` behave like their native counterparts
/// and require the parent to exist.
///
/// # Example
/// ```
/// use showfs_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new();
/// fs.write_file(Path::new("/test.txt"), b"hello").unwrap();
/// let content = fs.read_file(Path::new("/test.txt")).unwrap();
/// assert_eq!(content, b"hello");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    entries: Arc<RwLock<BTreeMap<String, Entry>>>,
}

impl MemoryFileSystem {
    /// Create a new file system holding only the root directory.
    pub fn new() -> Self {
        let mut map = BTreeMap::new();
        map.insert(
            String::from("/"),
            Entry::Dir {
                modified: SystemTime::now(),
            },
        );
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }

    /// Create a new memory file system pre-populated with files.
    ///
    /// Ancestor directories of every file are created as needed.
    ///
    /// # Arguments
    /// * `files` - Iterator of (path, content) tuples
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let fs = Self::new();
        if let Ok(mut map) = fs.entries.write() {
            let now = SystemTime::now();
            for (path, content) in files {
                let normalized = normalize(Path::new(path.as_ref()));
                insert_ancestors(&mut map, &normalized, now);
                map.insert(
                    normalized,
                    Entry::File {
                        content,
                        modified: now,
                    },
                );
            }
        }
        fs
    }

    /// Create a directory and all of its missing ancestors.
    pub fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize(path);
        let mut map = self.write_lock()?;
        if let Some(Entry::File { .. }) = map.get(&normalized) {
            return Err(VfsError::AlreadyExists { path: normalized });
        }
        let now = SystemTime::now();
        insert_ancestors(&mut map, &normalized, now);
        map.entry(normalized).or_insert(Entry::Dir { modified: now });
        Ok(())
    }

    fn read_lock(&self) -> VfsResult<RwLockReadGuard<'_, BTreeMap<String, Entry>>> {
        self.entries.read().map_err(|_| VfsError::Custom {
            message: String::from("Lock poisoned"),
        })
    }

    fn write_lock(&self) -> VfsResult<RwLockWriteGuard<'_, BTreeMap<String, Entry>>> {
        self.entries.write().map_err(|_| VfsError::Custom {
            message: String::from("Lock poisoned"),
        })
    }

    fn require_parent_dir(map: &BTreeMap<String, Entry>, normalized: &str) -> VfsResult<()> {
        match parent_of(normalized) {
            Some(parent) => match map.get(parent) {
                Some(Entry::Dir { .. }) => Ok(()),
                _ => Err(VfsError::NotFound {
                    path: parent.to_string(),
                }),
            },
            None => Ok(()),
        }
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a path string for internal storage.
/// Uses forward slashes and drops a trailing separator.
fn normalize(path: &Path) -> String {
    let mut s = path.to_string_lossy().replace('\\', "/");
    while s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    s
}

fn parent_of(normalized: &str) -> Option<&str> {
    if normalized == "/" {
        return None;
    }
    match normalized.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&normalized[..idx]),
        None => None,
    }
}

fn insert_ancestors(map: &mut BTreeMap<String, Entry>, normalized: &str, now: SystemTime) {
    let mut current = parent_of(normalized);
    while let Some(dir) = current {
        map.entry(dir.to_string())
            .or_insert(Entry::Dir { modified: now });
        current = parent_of(dir);
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = normalize(path);
        let map = self.read_lock()?;
        match map.get(&normalized) {
            Some(Entry::File { content, .. }) => Ok(content.clone()),
            Some(Entry::Dir { .. }) => Err(VfsError::InvalidPath {
                path: normalized,
                reason: String::from("is a directory"),
            }),
            None => Err(VfsError::NotFound { path: normalized }),
        }
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let normalized = normalize(path);
        let mut map = self.write_lock()?;
        Self::require_parent_dir(&map, &normalized)?;
        if let Some(Entry::Dir { .. }) = map.get(&normalized) {
            return Err(VfsError::InvalidPath {
                path: normalized,
                reason: String::from("is a directory"),
            });
        }
        map.insert(
            normalized,
            Entry::File {
                content: content.to_vec(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        match self.read_lock() {
            Ok(map) => map.contains_key(&normalize(path)),
            Err(_) => false,
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        match self.read_lock() {
            Ok(map) => matches!(map.get(&normalize(path)), Some(Entry::File { .. })),
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        match self.read_lock() {
            Ok(map) => matches!(map.get(&normalize(path)), Some(Entry::Dir { .. })),
            Err(_) => false,
        }
    }

    fn metadata(&self, path: &Path) -> VfsResult<FileStat> {
        let normalized = normalize(path);
        let map = self.read_lock()?;
        let name = match normalized.rfind('/') {
            Some(idx) if normalized.len() > 1 => normalized[idx + 1..].to_string(),
            _ => String::from("/"),
        };
        match map.get(&normalized) {
            Some(Entry::File { content, modified }) => Ok(FileStat {
                name,
                size: content.len() as u64,
                modified: Some(*modified),
                is_dir: false,
            }),
            Some(Entry::Dir { modified }) => Ok(FileStat {
                name,
                size: 0,
                modified: Some(*modified),
                is_dir: true,
            }),
            None => Err(VfsError::NotFound { path: normalized }),
        }
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<String>> {
        let normalized = normalize(path);
        let map = self.read_lock()?;
        match map.get(&normalized) {
            Some(Entry::Dir { .. }) => {}
            Some(Entry::File { .. }) => {
                return Err(VfsError::InvalidPath {
                    path: normalized,
                    reason: String::from("not a directory"),
                })
            }
            None => return Err(VfsError::NotFound { path: normalized }),
        }

        let prefix = if normalized == "/" {
            normalized.clone()
        } else {
            format!("{}/", normalized)
        };
        let mut names: Vec<String> = map
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| &key[prefix.len()..])
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(String::from)
            .collect();
        names.sort();
        Ok(names)
    }

    fn create_dir(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize(path);
        let mut map = self.write_lock()?;
        if map.contains_key(&normalized) {
            return Err(VfsError::AlreadyExists { path: normalized });
        }
        Self::require_parent_dir(&map, &normalized)?;
        map.insert(
            normalized,
            Entry::Dir {
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        let from = normalize(from);
        let to = normalize(to);
        let mut map = self.write_lock()?;
        Self::require_parent_dir(&map, &to)?;
        match map.get(&from) {
            Some(Entry::File { .. }) => {}
            Some(Entry::Dir { .. }) => {
                return Err(VfsError::InvalidPath {
                    path: from,
                    reason: String::from("directory rename is not supported"),
                })
            }
            None => return Err(VfsError::NotFound { path: from }),
        }
        if let Some(Entry::Dir { .. }) = map.get(&to) {
            return Err(VfsError::InvalidPath {
                path: to,
                reason: String::from("is a directory"),
            });
        }
        if let Some(entry) = map.remove(&from) {
            map.insert(to, entry);
        }
        Ok(())
    }
}
