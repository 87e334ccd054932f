//! 会话测试辅助工具

#![allow(dead_code)]

use showfs_api::{Session, SessionConfig};
use showfs_vfs::{MemoryFileSystem, VirtualFileSystem};
use std::path::Path;

/// In-memory show tree used by most session tests:
///
/// ```text
/// /show                 (show root)
///   .meta/proto/Default, Shot, shot_
///   seq/.meta/proto/Default
///   seq/shot_010, seq/shot_020
/// /jobs
/// /tmp
/// ```
pub fn show_tree() -> MemoryFileSystem {
    let fs = MemoryFileSystem::with_files([
        ("/show/.meta/_", br#"{"is_show_root": true}"#.to_vec()),
        ("/tmp/loose.txt", Vec::new()),
    ]);
    for dir in [
        "/show/.meta/proto/Default",
        "/show/.meta/proto/Shot",
        "/show/.meta/proto/shot_",
        "/show/seq/.meta/proto/Default",
        "/show/seq/shot_010",
        "/show/seq/shot_020",
        "/jobs",
    ] {
        fs.create_dir_all(Path::new(dir)).expect("create test directory");
    }
    fs
}

/// Session over `fs` working in `cwd`
pub fn session(fs: &MemoryFileSystem, cwd: &str) -> Session {
    Session::new(Box::new(fs.clone()), SessionConfig::new(cwd)).expect("create session")
}

/// Read back a sidecar record as JSON
pub fn read_record(fs: &MemoryFileSystem, record: &str) -> serde_json::Value {
    let bytes = fs.read_file(Path::new(record)).expect("read record");
    serde_json::from_slice(&bytes).expect("decode record")
}

/// True when the `instances` list of a record is absent or empty
pub fn no_instances(record: &serde_json::Value) -> bool {
    record["instances"]
        .as_array()
        .map_or(true, |list| list.is_empty())
}
