//! End-to-end drift scenarios through build, persist, load and reconcile

use super::test_utils::Fixture;
use shield::baseline::BaselineStore;
use shield::reconcile::{AlertKind, Reconciler};
use shield::scan::digest::compute_content_hash;
use shield::Baseline;
use std::fs;

fn reconcile_persisted(fixture: &Fixture) -> Vec<shield::Alert> {
    let loaded = fixture.store().load().unwrap();
    Reconciler::new(2).reconcile(&loaded)
}

#[test]
fn test_hello_world_scenario() {
    let fixture = Fixture::new();
    let a = fixture.write("a.txt", "hello");
    let b = fixture.write("b.txt", "world");
    fixture.baseline();

    // Immediately after baselining: nothing to report.
    assert!(reconcile_persisted(&fixture).is_empty());

    // Rewrite a.txt: one checksum alert for a.txt only.
    fs::write(&a, "HELLO").unwrap();
    let alerts = reconcile_persisted(&fixture);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Checksum);
    assert_eq!(alerts[0].path, a);
    assert_eq!(
        alerts[0].reference.as_deref(),
        Some(compute_content_hash(b"hello").to_hex().as_str())
    );
    assert_ne!(alerts[0].reference, alerts[0].observed);

    // Delete b.txt: missing for b.txt, checksum for a.txt persists.
    fs::remove_file(&b).unwrap();
    let alerts = reconcile_persisted(&fixture);
    assert_eq!(alerts.len(), 2);
    assert_eq!((alerts[0].kind, &alerts[0].path), (AlertKind::Checksum, &a));
    assert_eq!((alerts[1].kind, &alerts[1].path), (AlertKind::Missing, &b));
}

#[test]
fn test_reverting_content_clears_alert() {
    let fixture = Fixture::new();
    let a = fixture.write("a.txt", "hello");
    fixture.baseline();

    fs::write(&a, "tampered").unwrap();
    assert_eq!(reconcile_persisted(&fixture).len(), 1);

    fs::write(&a, "hello").unwrap();
    assert!(reconcile_persisted(&fixture).is_empty());
}

#[test]
fn test_new_files_are_not_reported() {
    let fixture = Fixture::new();
    fixture.write("a.txt", "hello");
    fixture.baseline();

    fixture.write("late.txt", "added after baseline");
    assert!(reconcile_persisted(&fixture).is_empty());
}

#[test]
fn test_empty_path_list() {
    let baseline = Baseline::build(&[]);
    assert!(baseline.is_empty());

    let reconciler = Reconciler::default();
    for _ in 0..3 {
        assert!(reconciler.reconcile(&baseline).is_empty());
    }
}

#[cfg(unix)]
#[test]
fn test_permission_drift_without_content_change() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::new();
    let a = fixture.write("a.txt", "hello");
    fs::set_permissions(&a, fs::Permissions::from_mode(0o600)).unwrap();
    fixture.baseline();

    fs::set_permissions(&a, fs::Permissions::from_mode(0o4755)).unwrap();
    let alerts = reconcile_persisted(&fixture);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Permissions);
    assert_eq!(alerts[0].reference.as_deref(), Some("0o600"));
    assert_eq!(alerts[0].observed.as_deref(), Some("0o4755"));
}

#[cfg(unix)]
#[test]
fn test_deleted_and_recreated_as_directory() {
    let fixture = Fixture::new();
    let a = fixture.write("a.txt", "hello");
    fixture.baseline();

    fs::remove_file(&a).unwrap();
    fs::create_dir(&a).unwrap();

    // A directory cannot be read as a file: the content can no longer be verified.
    let alerts = reconcile_persisted(&fixture);
    assert!(alerts.iter().any(|al| al.kind == AlertKind::Unreadable && al.path == a));
    assert!(alerts.iter().all(|al| al.kind != AlertKind::Missing));
}
