// use macro form directly; no import needed
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_in(dir: &Path, args: &[&str]) -> Output {
    let me = assert_cmd::cargo::cargo_bin!("bulk_rename");
    Command::new(me)
        .env("BULK_RENAME_CONFIG", dir.join("no-such-config.xml"))
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("spawn binary")
}

#[test]
fn binary_print_config_succeeds() {
    let me = assert_cmd::cargo::cargo_bin!("bulk_rename");
    let out = Command::new(me)
        .arg("--print-config")
        .output()
        .expect("spawn binary");
    assert!(out.status.success(), "binary should succeed with --print-config");
}

#[test]
fn binary_swaps_two_files() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a"), "A").unwrap();
    fs::write(td.path().join("b"), "B").unwrap();

    let out = run_in(td.path(), &["a", "b", "b", "a"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(td.path().join("a")).unwrap(), "B");
    assert_eq!(fs::read_to_string(td.path().join("b")).unwrap(), "A");
    assert!(String::from_utf8_lossy(&out.stdout).contains("2 renamed, 0 failed (two-pass)"));
}

#[test]
fn binary_refuses_duplicate_targets() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a"), "A").unwrap();
    fs::write(td.path().join("b"), "B").unwrap();

    let out = run_in(td.path(), &["a", "x", "b", "x"]);
    assert!(!out.status.success());
    assert!(td.path().join("a").exists());
    assert!(td.path().join("b").exists());
    assert!(!td.path().join("x").exists());
}

#[test]
fn binary_dry_run_changes_nothing() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a"), "A").unwrap();

    let out = run_in(td.path(), &["--dry-run", "a", "z"]);
    assert!(out.status.success());
    assert!(td.path().join("a").exists());
    assert!(!td.path().join("z").exists());
    assert!(String::from_utf8_lossy(&out.stdout).contains("batch 1"));
}

#[test]
fn binary_undo_round_trip_restores_names() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a"), "A").unwrap();

    let out = run_in(td.path(), &["--undo", "a", "z"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(td.path().join("a").exists());
    assert!(!td.path().join("z").exists());
}

#[test]
fn binary_reports_failures_with_nonzero_exit() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a"), "A").unwrap();

    let out = run_in(td.path(), &["a", "a2", "missing", "m2"]);
    assert!(!out.status.success());
    assert!(td.path().join("a2").exists());
}
