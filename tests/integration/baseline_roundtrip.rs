//! Baseline persistence integration tests

use super::test_utils::Fixture;
use shield::baseline::BaselineStore;
use shield::error::StorageError;
use shield::types::PermissionMode;
use std::fs;

/// Loading what was persisted yields an equal baseline
#[test]
fn test_load_of_persist_is_identity() {
    let fixture = Fixture::new();
    fixture.write("a.txt", "hello");
    fixture.write("b.txt", "world");
    fs::create_dir_all(fixture.watched().join("nested/deeper")).unwrap();
    fs::write(fixture.watched().join("nested/deeper/c.conf"), "x=1").unwrap();

    let built = fixture.baseline();
    assert_eq!(built.len(), 3);

    let loaded = fixture.store().load().unwrap();
    assert_eq!(loaded, built);
}

/// Re-persisting replaces the previous baseline entirely
#[test]
fn test_persist_replaces_previous_baseline() {
    let fixture = Fixture::new();
    let a = fixture.write("a.txt", "hello");
    fixture.baseline();

    fs::remove_file(&a).unwrap();
    fixture.write("b.txt", "world");
    let rebuilt = fixture.baseline();

    let loaded = fixture.store().load().unwrap();
    assert_eq!(loaded, rebuilt);
    assert!(loaded.get(&a).is_none());
}

/// Operator-edited baseline files in the legacy checksums-only form still load
#[test]
fn test_hand_written_legacy_document() {
    let fixture = Fixture::new();
    let path = fixture.dir.path().join("checksums.json");
    fs::write(
        &path,
        r#"{"checksums": {"/etc/hosts": "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"}}"#,
    )
    .unwrap();

    let loaded = fixture.store().load().unwrap();
    assert_eq!(loaded.len(), 1);
    let entry = loaded.get(std::path::Path::new("/etc/hosts")).unwrap();
    assert!(entry.content_digest.is_some());
    assert!(entry.permission_mode.is_none());
}

/// Every stored mode string uses the "0o" octal form
#[cfg(unix)]
#[test]
fn test_permissions_written_as_octal_strings() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::new();
    let a = fixture.write("a.txt", "hello");
    fs::set_permissions(&a, fs::Permissions::from_mode(0o640)).unwrap();
    fixture.baseline();

    let text = fs::read_to_string(fixture.dir.path().join("checksums.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let key = a.to_string_lossy().to_string();
    assert_eq!(value["permissions"][&key], "0o640");
    assert_eq!(
        "0o640".parse::<PermissionMode>().unwrap(),
        PermissionMode::new(0o640)
    );
}

/// A corrupt document is reported as corrupt, not as missing
#[test]
fn test_corrupt_document_distinguished_from_missing() {
    let fixture = Fixture::new();
    assert!(matches!(
        fixture.store().load(),
        Err(StorageError::BaselineNotFound(_))
    ));

    fs::write(fixture.dir.path().join("checksums.json"), "not json").unwrap();
    assert!(matches!(
        fixture.store().load(),
        Err(StorageError::BaselineCorrupt { .. })
    ));
}

/// Files whose names are not valid UTF-8 stay out of the baseline, so the
/// round trip holds and an unchanged tree reconciles clean
#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_names_do_not_break_round_trip() {
    use shield::reconcile::Reconciler;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = Fixture::new();
    fixture.write("a.txt", "hello");
    fs::write(
        fixture.watched().join(OsStr::from_bytes(b"bad\xffname")),
        "odd",
    )
    .unwrap();

    let built = fixture.baseline();
    assert_eq!(built.len(), 1);

    let loaded = fixture.store().load().unwrap();
    assert_eq!(loaded, built);
    assert!(Reconciler::default().reconcile(&loaded).is_empty());
}
