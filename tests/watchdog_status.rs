use chrono::Utc;
use std::path::Path;
use tradegrid::watchdog::{check_status, evaluate_status, StatusHealth};

fn write_status(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("ribs_status.json");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_missing_status_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does_not_exist.json");

    let (ok, message) = check_status(&path, 21600.0);
    assert!(!ok);
    assert!(message.contains("missing"));
}

#[test]
fn test_stale_status_detected_via_recorded_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let mtime = Utc::now().timestamp() as f64 - 3600.0;
    let contents = format!(
        r#"{{"iterations": 120, "latest_checkpoint": {{"path": "ribs_archive.json", "mtime": {}}}}}"#,
        mtime
    );
    let path = write_status(dir.path(), &contents);

    let (ok, message) = check_status(&path, 10.0);
    assert!(!ok);
    assert!(message.contains("stale"));
}

#[test]
fn test_fresh_status_passes() {
    let dir = tempfile::tempdir().unwrap();
    let contents = format!(
        r#"{{"iterations": 120, "latest_checkpoint": {{"path": "ribs_archive.json", "mtime": {}}}}}"#,
        Utc::now().timestamp()
    );
    let path = write_status(dir.path(), &contents);

    let (ok, message) = check_status(&path, 60.0);
    assert!(ok);
    assert_eq!(message, "OK");
}

#[test]
fn test_iso_timestamp_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_status(
        dir.path(),
        r#"{"iterations": 1, "last_completed": "2020-01-01T00:00:00"}"#,
    );

    let health = evaluate_status(&path, 21600.0);
    assert_eq!(health.exit_code(), 3);
    assert!(health.message().contains("stale"));
}

#[test]
fn test_exit_code_severities() {
    let dir = tempfile::tempdir().unwrap();

    let missing = evaluate_status(&dir.path().join("absent.json"), 60.0);
    assert_eq!(missing.exit_code(), 1);

    let corrupt_path = write_status(dir.path(), "{truncated");
    let corrupt = evaluate_status(&corrupt_path, 60.0);
    assert_eq!(corrupt.exit_code(), 1);

    let fresh_path = write_status(dir.path(), r#"{"iterations": 0}"#);
    let fresh = evaluate_status(&fresh_path, 60.0);
    assert_eq!(fresh, StatusHealth::Ok);
    assert_eq!(fresh.exit_code(), 0);
}
