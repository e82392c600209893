use bulk_rename::cli::Args;
use bulk_rename::config::types::{Config, LogLevel};
use clap::Parser;
use std::path::{Path, PathBuf};

#[test]
fn pairs_become_entries_in_order() {
    let args = Args::parse_from(["bulk_rename", "a.txt", "b.txt", "c", "d"]);
    let entries = args.entries(Path::new("/base")).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].directory, PathBuf::from("/base"));
    assert_eq!(entries[0].old_name, "a.txt");
    assert_eq!(entries[0].new_name, "b.txt");
    assert_eq!(entries[0].row_id, Some(0));
    assert_eq!(entries[1].row_id, Some(1));
}

#[test]
fn odd_pair_count_is_rejected() {
    let args = Args::parse_from(["bulk_rename", "a", "b", "c"]);
    let err = args.entries(Path::new("/base")).unwrap_err();
    assert!(err.to_string().contains("'c'"), "error: {err}");
}

#[test]
fn old_name_may_live_in_a_subdirectory() {
    let args = Args::parse_from(["bulk_rename", "sub/dir/x", "y"]);
    let entries = args.entries(Path::new("/base")).unwrap();
    assert_eq!(entries[0].directory, Path::new("/base").join("sub/dir"));
    assert_eq!(entries[0].old_name, "x");
    assert_eq!(entries[0].handle.path(), Path::new("/base").join("sub/dir").join("x"));
}

#[test]
fn new_name_separators_are_left_for_the_checker() {
    let args = Args::parse_from(["bulk_rename", "x", "a/b"]);
    let entries = args.entries(Path::new("/base")).unwrap();
    assert_eq!(entries[0].new_name, "a/b");
}

#[test]
fn from_file_pairs_follow_positional_ones() {
    let td = tempfile::tempdir().unwrap();
    let list = td.path().join("renames.tsv");
    std::fs::write(&list, "# old\tnew\n\none\tuno\n two words\tdos palabras\n").unwrap();

    let args = Args::parse_from([
        "bulk_rename".into(),
        "--from-file".into(),
        list.clone().into_os_string(),
        "z".into(),
        "zz".into(),
    ]);
    let entries = args.entries(Path::new("/base")).unwrap();
    let pairs: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.old_name.as_str(), e.new_name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("z", "zz"), ("one", "uno"), (" two words", "dos palabras")]);
    assert_eq!(entries[2].row_id, Some(2));
}

#[test]
fn from_file_without_tab_reports_the_line() {
    let td = tempfile::tempdir().unwrap();
    let list = td.path().join("bad.tsv");
    std::fs::write(&list, "ok\tfine\nno tab here\n").unwrap();

    let args = Args::parse_from(["bulk_rename".into(), "--from-file".into(), list.into_os_string()]);
    let err = args.entries(Path::new("/base")).unwrap_err();
    assert!(err.to_string().contains(":2:"), "error: {err}");
}

#[test]
fn debug_flag_wins_over_log_level() {
    let args = Args::parse_from(["bulk_rename", "--log-level", "quiet", "-d"]);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));

    let args = Args::parse_from(["bulk_rename", "--log-level", "info"]);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Info));

    let args = Args::parse_from(["bulk_rename", "--log-level", "bogus"]);
    assert_eq!(args.effective_log_level(), None);
}

#[test]
fn overrides_only_touch_what_was_given() {
    let mut cfg = Config {
        max_in_flight: 9,
        ..Config::default()
    };
    Args::parse_from(["bulk_rename"]).apply_overrides(&mut cfg);
    assert_eq!(cfg.max_in_flight, 9);
    assert!(!cfg.dry_run);

    let args = Args::parse_from([
        "bulk_rename",
        "--jobs",
        "2",
        "--dry-run",
        "--log-file",
        "/tmp/br.log",
        "--log-level",
        "debug",
    ]);
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.max_in_flight, 2);
    assert!(cfg.dry_run);
    assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/br.log")));
    assert_eq!(cfg.log_level, LogLevel::Debug);
}
