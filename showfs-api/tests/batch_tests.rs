//! 批量创建操作的集成测试

mod common;

use common::{read_record, session, show_tree};
use showfs_api::{ObjectKind, Session, SessionConfig};
use showfs_vfs::VirtualFileSystem;
use std::path::{Path, PathBuf};

#[test]
fn test_create_dirs_links_proto_by_prefix() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");

    let report = s
        .create_objects("seq/shot_030", ObjectKind::Dir, None)
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.created, vec![PathBuf::from("/show/seq/shot_030")]);
    assert!(fs.is_dir(Path::new("/show/seq/shot_030")));

    assert_eq!(
        s.proto_of("seq/shot_030").unwrap().as_deref(),
        Some("//.meta/proto/shot_")
    );
    let record = read_record(&fs, "/show/.meta/proto/shot_/.meta/_");
    assert_eq!(record["instances"], serde_json::json!(["//seq/shot_030"]));
}

#[test]
fn test_create_skips_existing_and_records_failures() {
    let fs = show_tree();
    let mut s = session(&fs, "/show/seq");

    let report = s.create_objects("*", ObjectKind::Dir, None).unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.skipped.len(), 2);

    let report = s
        .create_objects("missing/shot_040", ObjectKind::Dir, None)
        .unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, PathBuf::from("/show/seq/missing/shot_040"));
    assert_eq!(report.failed[0].error.phase, "io");
}

#[test]
fn test_explicit_proto_not_found_keeps_created_dir() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");

    let report = s
        .create_objects("seq/shot_050", ObjectKind::Dir, Some("Asset"))
        .unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].error.error_kind, "ProtoNotFound");
    assert!(fs.is_dir(Path::new("/show/seq/shot_050")));
}

#[test]
fn test_explicit_proto_wins_over_name_match() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    s.create_objects("*/shot_060", ObjectKind::Dir, Some("Default"))
        .unwrap();
    assert_eq!(
        s.proto_of("seq/shot_060").unwrap().as_deref(),
        Some("//seq/.meta/proto/Default")
    );
}

#[test]
fn test_create_file_outside_show_has_no_proto() {
    let fs = show_tree();
    let mut s = session(&fs, "/tmp");

    let report = s
        .create_objects("notes.txt", ObjectKind::File, None)
        .unwrap();
    assert_eq!(report.created, vec![PathBuf::from("/tmp/notes.txt")]);
    assert!(fs.is_file(Path::new("/tmp/notes.txt")));
    assert_eq!(s.proto_of("notes.txt").unwrap(), None);
}

#[test]
fn test_create_rejects_meta_selector() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    let err = s
        .create_objects("seq/x:name", ObjectKind::Dir, None)
        .unwrap_err();
    assert_eq!(err.to_report().error_kind, "GeneratorMetaNotAllowed");
}

#[test]
fn test_create_shows() {
    let fs = show_tree();
    let mut s = session(&fs, "/jobs");

    let report = s.create_shows("newshow").unwrap();
    assert_eq!(report.created, vec![PathBuf::from("/jobs/newshow")]);
    let record = read_record(&fs, "/jobs/newshow/.meta/_");
    assert_eq!(record["is_show_root"], true);
    assert_eq!(
        s.show_root("newshow").unwrap(),
        PathBuf::from("/jobs/newshow")
    );

    // creating again only skips
    let report = s.create_shows("newshow").unwrap();
    assert_eq!(report.skipped, vec![PathBuf::from("/jobs/newshow")]);

    // a fresh session reads the flag from disk
    let mut other = Session::new(Box::new(fs.clone()), SessionConfig::new("/jobs/newshow")).unwrap();
    assert_eq!(other.show_root(".").unwrap(), PathBuf::from("/jobs/newshow"));
}

#[test]
fn test_create_shows_empty_generation() {
    let fs = show_tree();
    let mut s = session(&fs, "/jobs");
    let err = s.create_shows("*/show").unwrap_err();
    assert_eq!(err.phase(), "eval");
    assert_eq!(err.to_report().error_kind, "EmptyGeneration");
}

#[test]
fn test_set_contract_pattern() {
    let fs = show_tree();
    let mut s = session(&fs, "/show/seq");

    let report = s.set_contract_pattern("*", "plate_####.exr").unwrap();
    assert_eq!(report.created.len(), 2);
    let record = read_record(&fs, "/show/seq/shot_020/.meta/_");
    assert_eq!(record["contract"]["pattern"], "plate_####.exr");
    assert_eq!(
        s.get("shot_010:contract.pattern").unwrap(),
        showfs_api::Value::List(vec![showfs_api::Value::from("plate_####.exr")])
    );

    let err = s.set_contract_pattern("shot_*/*", "x").unwrap_err();
    assert_eq!(err.to_report().error_kind, "EmptyGeneration");
}

#[test]
fn test_batch_report_serializes() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    let report = s
        .create_objects("seq/shot_070", ObjectKind::Dir, None)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["created"], serde_json::json!(["/show/seq/shot_070"]));
    assert_eq!(json["failed"], serde_json::json!([]));
}

#[test]
fn test_native_session_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().to_path_buf();
    let mut s = Session::native(SessionConfig::new(&root)).unwrap();

    s.create_shows("show").unwrap();
    assert!(root.join("show/.meta/_").is_file());

    let report = s.create_objects("show/shot_010", ObjectKind::Dir, None).unwrap();
    assert!(report.is_success());
    s.set_meta("show/shot_010", "frames", "48").unwrap();

    let raw = std::fs::read_to_string(root.join("show/shot_010/.meta/_")).unwrap();
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(record["user_data"]["frames"], "48");
    assert!(!root.join("show/shot_010/.meta/_.tmp").exists());
}
