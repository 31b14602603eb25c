//! Property-based tests for drift detection

use proptest::prelude::*;
use shield::reconcile::{AlertKind, Reconciler};
use shield::Baseline;
use std::fs;
use tempfile::TempDir;

/// Untouched files never produce alerts, whatever their content
#[test]
fn test_unchanged_content_is_clean() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(32));
    runner
        .run(
            &prop::collection::vec(prop::collection::vec(any::<u8>(), 0..2048), 1..6),
            |contents| {
                let temp_dir = TempDir::new().unwrap();
                for (i, content) in contents.iter().enumerate() {
                    fs::write(temp_dir.path().join(format!("f{}.bin", i)), content).unwrap();
                }
                let baseline = Baseline::build(&[temp_dir.path().to_path_buf()]);
                prop_assert_eq!(baseline.len(), contents.len());
                prop_assert!(Reconciler::default().reconcile(&baseline).is_empty());
                Ok(())
            },
        )
        .unwrap();
}

/// Any content change yields exactly one checksum alert for that file
#[test]
fn test_changed_content_yields_one_checksum_alert() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(32));
    runner
        .run(
            &(
                prop::collection::vec(any::<u8>(), 0..4096),
                prop::collection::vec(any::<u8>(), 0..4096),
            )
                .prop_filter("contents must differ", |(a, b)| a != b),
            |(before, after)| {
                let temp_dir = TempDir::new().unwrap();
                let file = temp_dir.path().join("target.bin");
                fs::write(&file, &before).unwrap();
                let baseline = Baseline::build(&[file.clone()]);

                fs::write(&file, &after).unwrap();
                let alerts = Reconciler::default().reconcile(&baseline);
                prop_assert_eq!(alerts.len(), 1);
                prop_assert_eq!(alerts[0].kind, AlertKind::Checksum);
                Ok(())
            },
        )
        .unwrap();
}
