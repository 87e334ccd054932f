//! 对象缓存与路径解析的集成测试

mod common;

use common::{cache_at, TreeBuilder};
use showfs_core::{CoreError, MetaLayout, ObjectCache};
use showfs_vfs::{NativeFileSystem, VirtualFileSystem};
use std::path::Path;

#[test]
fn test_same_path_same_node() {
    let fs = TreeBuilder::new()
        .show("/jobs/show")
        .file("/jobs/show/seq/shot/plate.exr")
        .build();
    let (mut cache, cwd) = cache_at(&fs, "/jobs/show/seq");

    let a = cache.materialize(Path::new("/jobs/show/seq/shot")).unwrap();
    let target = cache.resolve_target("shot", cwd).unwrap();
    let b = cache.materialize(&target).unwrap();
    let target = cache.resolve_target("//seq/shot/../shot", cwd).unwrap();
    let c = cache.materialize(&target).unwrap();

    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn test_show_chain_invariant() {
    let fs = TreeBuilder::new()
        .show("/jobs/show")
        .show("/jobs/show/nested")
        .file("/jobs/show/seq/shot/plate.exr")
        .file("/jobs/show/nested/inner/a.txt")
        .file("/jobs/loose/b.txt")
        .build();
    let (mut cache, _) = cache_at(&fs, "/");

    for path in [
        "/jobs/show/seq/shot/plate.exr",
        "/jobs/show/nested/inner/a.txt",
        "/jobs/loose/b.txt",
    ] {
        cache.materialize(Path::new(path)).unwrap();
    }

    for id in cache.ids() {
        let node = cache.node(id);
        if node.meta.is_show_root {
            assert_eq!(node.show, Some(id), "{}", node.path.display());
        } else {
            let expected = node.parent.and_then(|p| cache.show(p));
            assert_eq!(node.show, expected, "{}", node.path.display());
        }
    }

    let inner = cache.get(Path::new("/jobs/show/nested/inner/a.txt")).unwrap();
    let nested = cache.get(Path::new("/jobs/show/nested")).unwrap();
    assert_eq!(cache.show(inner), Some(nested));
    let loose = cache.get(Path::new("/jobs/loose/b.txt")).unwrap();
    assert_eq!(cache.show(loose), None);
}

#[test]
fn test_show_relative_round_trip() {
    let fs = TreeBuilder::new()
        .show("/jobs/show")
        .file("/jobs/show/seq/shot/plate.exr")
        .build();
    let (mut cache, cwd) = cache_at(&fs, "/jobs/show/seq");

    let rel = cache
        .show_relative(Path::new("/jobs/show/seq/shot/plate.exr"))
        .unwrap();
    assert_eq!(rel, "//seq/shot/plate.exr");
    assert_eq!(
        cache.resolve_target(&rel, cwd).unwrap(),
        Path::new("/jobs/show/seq/shot/plate.exr")
    );
}

#[test]
fn test_unresolved_show() {
    let fs = TreeBuilder::new().file("/tmp/x/y.txt").build();
    let (cache, cwd) = cache_at(&fs, "/tmp/x");
    assert!(matches!(
        cache.resolve_target("//y.txt", cwd),
        Err(CoreError::UnresolvedShow { .. })
    ));
}

#[test]
fn test_native_backend() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("show");
    std::fs::create_dir_all(root.join("seq")).unwrap();
    std::fs::write(root.join("seq/plate.exr"), b"pixels").unwrap();

    let mut cache =
        ObjectCache::new(Box::new(NativeFileSystem::new()), MetaLayout::default(), &root).unwrap();
    let show = cache.materialize(&root).unwrap();
    cache.mark_show_root(show);
    cache.sync_meta(show).unwrap();

    let plate = cache.materialize(&root.join("seq/plate.exr")).unwrap();
    assert_eq!(cache.show(plate), Some(show));
    assert_eq!(cache.node(plate).file_info.size, 6);
    cache.node_mut(plate).meta.set_user("artist", "kim");
    cache.sync_meta(plate).unwrap();

    let fs = NativeFileSystem::new();
    assert!(fs.is_file(&root.join(".meta/_")));
    assert!(fs.is_file(&root.join("seq/.meta/plate.exr._")));

    // a fresh cache sees the persisted state
    let mut fresh =
        ObjectCache::new(Box::new(NativeFileSystem::new()), MetaLayout::default(), &root).unwrap();
    let plate = fresh.materialize(&root.join("seq/plate.exr")).unwrap();
    let show = fresh.get(&root).unwrap();
    assert_eq!(fresh.show(plate), Some(show));
    assert_eq!(fresh.node(plate).meta.user_value("ARTIST"), Some("kim"));
}
