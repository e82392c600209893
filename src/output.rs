use owo_colors::OwoColorize;
use std::path::Path;

use crate::check::{CheckResult, Severity};
use crate::entry::Entry;
use crate::rename::{Batch, RenameResults};

/// Small wrapper around stdout/stderr printing to provide consistent, colored
/// user-facing messages. Colors are enabled only when output is a TTY.
fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix). Use this for primary outputs
/// such as "Renamed X -> Y" which users may script against.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// `directory` is where the object ended up, so a file inside a renamed
/// directory is reported under that directory's new name.
fn rename_line(directory: &Path, old_name: &str, new_name: &str) -> String {
    format!("Renamed {} -> {} in {}", old_name, new_name, directory.display())
}

/// Diagnostics as `(severity, message)`, errors before warnings, entry order within a severity.
fn check_lines(entries: &[Entry], result: &CheckResult) -> Vec<(Severity, String)> {
    let mut lines: Vec<(Severity, String)> = result
        .per_entry_diagnostics
        .iter()
        .filter_map(|(idx, diags)| entries.get(*idx).map(|entry| (entry, diags)))
        .flat_map(|(entry, diags)| {
            diags.iter().map(move |d| {
                let msg = format!(
                    "{} -> {}: {}",
                    entry.source_path().display(),
                    entry.new_name,
                    d.kind
                );
                (d.severity, msg)
            })
        })
        .collect();
    lines.sort_by(|a, b| b.0.cmp(&a.0));
    lines
}

/// Print every diagnostic, worst first, as `warn:` or `error:` lines.
pub fn print_check(entries: &[Entry], result: &CheckResult) {
    for (severity, msg) in check_lines(entries, result) {
        match severity {
            Severity::Error => print_error(&msg),
            Severity::Warning => print_warn(&msg),
            Severity::None => print_info(&msg),
        }
    }
    if result.requires_two_pass() {
        print_info(&format!(
            "{} circular rename(s); using temporary names",
            result.circular_target_paths.len()
        ));
    }
}

/// Print the batch plan of a dry run.
pub fn print_plan(batches: &[Batch]) {
    for (i, batch) in batches.iter().enumerate() {
        print_info(&format!("batch {} ({} item(s))", i + 1, batch.len()));
        for e in batch {
            print_user(&format!("  {} -> {}", e.source_path().display(), e.new_name));
        }
    }
}

/// Print one line per success, one per failure, and a closing summary.
pub fn print_results(results: &RenameResults) {
    for s in &results.successes {
        print_user(&rename_line(&s.entry.directory, &s.entry.old_name, &s.entry.new_name));
    }
    for f in &results.failures {
        print_error(&format!("{} -> {}: {}", f.entry.source_path().display(), f.entry.new_name, f.error));
        if let Some(left) = &f.stranded {
            print_warn(&format!("left behind as {left}; rename it by hand"));
        }
    }
    let summary = format!(
        "{} renamed, {} failed{}",
        results.success_count(),
        results.failure_count(),
        if results.used_two_pass { " (two-pass)" } else { "" }
    );
    if results.failures.is_empty() {
        print_success(&summary);
    } else {
        print_warn(&summary);
    }
}
