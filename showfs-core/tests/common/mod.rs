//! 测试辅助工具
//!
//! 用内存文件系统搭建确定性的目录树

#![allow(dead_code)]

use showfs_core::{MetaLayout, NodeId, ObjectCache};
use showfs_vfs::{MemoryFileSystem, VirtualFileSystem};
use std::path::Path;

/// Builder for an in-memory show tree
#[derive(Default)]
pub struct TreeBuilder {
    files: Vec<(String, Vec<u8>)>,
    dirs: Vec<String>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty file (ancestors are created implicitly)
    pub fn file(mut self, path: &str) -> Self {
        self.files.push((path.to_string(), Vec::new()));
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.dirs.push(path.to_string());
        self
    }

    /// Flag a directory as show root
    pub fn show(self, path: &str) -> Self {
        self.meta(path, true, r#"{"is_show_root": true}"#)
    }

    /// Raw sidecar JSON for a directory (`is_dir`) or a file
    pub fn meta(mut self, path: &str, is_dir: bool, json: &str) -> Self {
        let record = if is_dir {
            format!("{}/.meta/_", path.trim_end_matches('/'))
        } else {
            let p = Path::new(path);
            let parent = p.parent().map(|d| d.display().to_string()).unwrap_or_default();
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            format!("{}/.meta/{}._", parent.trim_end_matches('/'), name)
        };
        self.files.push((record, json.as_bytes().to_vec()));
        self
    }

    /// Prototype directory `name` under `dir`
    pub fn proto(self, dir: &str, name: &str) -> Self {
        self.dir(&format!("{}/.meta/proto/{}", dir.trim_end_matches('/'), name))
    }

    pub fn build(self) -> MemoryFileSystem {
        let fs = MemoryFileSystem::with_files(self.files);
        for dir in &self.dirs {
            fs.create_dir_all(Path::new(dir))
                .expect("create test directory");
        }
        fs
    }
}

/// Cache over `fs` with the default layout, working in `cwd`
pub fn cache_at(fs: &MemoryFileSystem, cwd: &str) -> (ObjectCache, NodeId) {
    let mut cache = ObjectCache::new(Box::new(fs.clone()), MetaLayout::default(), cwd)
        .expect("create cache");
    let dir = cache.working_node().expect("materialize working dir");
    (cache, dir)
}

/// Read back a sidecar record as JSON
pub fn read_record(fs: &MemoryFileSystem, record: &str) -> serde_json::Value {
    let bytes = fs.read_file(Path::new(record)).expect("read record");
    serde_json::from_slice(&bytes).expect("decode record")
}

/// Paths of a result list
pub fn paths(value: &showfs_core::Value) -> Vec<String> {
    value
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}
