//! 会话查询、元数据与原型操作的集成测试

mod common;

use common::{no_instances, read_record, session, show_tree};
use showfs_api::{ApiError, CoreError, Value};
use std::path::PathBuf;

#[test]
fn test_set_meta_then_get() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");

    s.set_meta("seq/shot_010", "Width", "1920").unwrap();
    assert_eq!(
        s.get("seq/shot_010:width").unwrap(),
        Value::List(vec![Value::Number(1920.0)])
    );

    let record = read_record(&fs, "/show/seq/shot_010/.meta/_");
    assert_eq!(record["user_data"]["Width"], "1920");
}

#[test]
fn test_set_meta_empty_value_removes_key() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    s.set_meta("seq", "client", "acme").unwrap();
    s.set_meta("seq", "CLIENT", "").unwrap();

    let err = s.get("seq:client").unwrap_err();
    assert!(matches!(
        err,
        ApiError::Core(CoreError::FieldNotFound { .. })
    ));
    let record = read_record(&fs, "/show/seq/.meta/_");
    assert!(record.get("user_data").is_none());
}

#[test]
fn test_get_keeps_padded_user_text() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    s.set_meta(".", "version", "010").unwrap();
    s.set_meta(".", "ratio", "1.50").unwrap();
    s.set_meta(".", "frames", "96").unwrap();

    assert_eq!(s.get(":version").unwrap(), Value::from("010"));
    assert_eq!(s.get(":ratio").unwrap(), Value::from("1.50"));
    assert_eq!(s.get(":frames").unwrap(), Value::Number(96.0));
}

#[test]
fn test_get_sees_state_of_a_fresh_session() {
    let fs = show_tree();
    session(&fs, "/show").set_meta("seq", "frames", "96").unwrap();

    let mut other = session(&fs, "/show/seq");
    assert_eq!(other.get(":frames * 2").unwrap(), Value::Number(192.0));
}

#[test]
fn test_show_root() {
    let fs = show_tree();
    let mut s = session(&fs, "/show/seq");
    assert_eq!(s.show_root("shot_010").unwrap(), PathBuf::from("/show"));
    assert_eq!(s.show_root(".").unwrap(), PathBuf::from("/show"));

    let err = s.show_root("/tmp").unwrap_err();
    assert_eq!(err.phase(), "resolve");
    assert_eq!(err.to_report().error_kind, "UnresolvedShow");
}

#[test]
fn test_missing_target_is_io_error() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    let err = s.proto_of("seq/shot_999").unwrap_err();
    assert_eq!(err.phase(), "io");
    assert_eq!(err.to_report().error_kind, "IOFailure");
}

#[test]
fn test_link_proto_and_relink() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    assert_eq!(s.proto_of("seq/shot_010").unwrap(), None);

    let proto = s.link_proto("seq/shot_010", "Shot").unwrap();
    assert_eq!(proto, PathBuf::from("/show/.meta/proto/Shot"));
    assert_eq!(
        s.proto_of("seq/shot_010").unwrap().as_deref(),
        Some("//.meta/proto/Shot")
    );
    let record = read_record(&fs, "/show/.meta/proto/Shot/.meta/_");
    assert_eq!(record["instances"], serde_json::json!(["//seq/shot_010"]));

    // nearest Default lives in seq
    let proto = s.link_proto("//seq/shot_010", "Default").unwrap();
    assert_eq!(proto, PathBuf::from("/show/seq/.meta/proto/Default"));
    assert!(no_instances(&read_record(
        &fs,
        "/show/.meta/proto/Shot/.meta/_"
    )));
    let record = read_record(&fs, "/show/seq/.meta/proto/Default/.meta/_");
    assert_eq!(record["instances"], serde_json::json!(["//seq/shot_010"]));
}

#[test]
fn test_link_proto_unknown_name() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    let err = s.link_proto("seq/shot_010", "Asset").unwrap_err();
    assert_eq!(err.phase(), "proto");
    assert_eq!(err.to_report().error_kind, "ProtoNotFound");
}

#[test]
fn test_list_protos() {
    let fs = show_tree();
    let mut s = session(&fs, "/show");
    let protos = s.list_protos("seq/shot_010").unwrap();
    let names: Vec<&str> = protos.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Default", "Shot", "shot_"]);
    assert_eq!(protos["Default"], "//seq/.meta/proto/Default");
    assert_eq!(protos["Shot"], "//.meta/proto/Shot");

    let err = s.list_protos("/tmp/loose.txt").unwrap_err();
    assert!(matches!(err, ApiError::Core(CoreError::NoShow { .. })));
}
