//! Pre-flight validation of a planned batch.
//!
//! Checks run in a fixed order and compose (an entry can collect several
//! diagnostics):
//! 1. every name unchanged: short-circuit, nothing else is looked at
//! 2. empty target name (error)
//! 3. path separator in target name (error)
//! 4. two or more changing entries with the same output path (error on all of them)
//! 5. circular renames: a target that is also the source of another changing entry
//! 6. target already present on disk (warning), skipped for circular targets
//!
//! Nothing is raised: the caller inspects `highest_severity` and refuses to
//! run on `Severity::Error`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::entry::Entry;
use crate::errors::DiagnosticKind;
use crate::fs_ops::FileSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    None,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::None => "none",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl From<DiagnosticKind> for Diagnostic {
    fn from(kind: DiagnosticKind) -> Self {
        Self {
            severity: kind.severity(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub all_unchanged: bool,
    pub highest_severity: Severity,
    /// Diagnostics keyed by the entry's position in the checked slice.
    pub per_entry_diagnostics: BTreeMap<usize, Vec<Diagnostic>>,
    pub circular_target_paths: BTreeSet<PathBuf>,
}

impl CheckResult {
    /// Execution must be refused.
    pub fn is_blocking(&self) -> bool {
        self.highest_severity == Severity::Error
    }

    /// Some target collides with a source still to be renamed away.
    pub fn requires_two_pass(&self) -> bool {
        !self.circular_target_paths.is_empty()
    }

    pub fn diagnostics_for(&self, index: usize) -> &[Diagnostic] {
        self.per_entry_diagnostics
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Diagnostics of every entry in `entries` carrying `row_id`.
    pub fn diagnostics_for_row(&self, entries: &[Entry], row_id: u64) -> Vec<Diagnostic> {
        entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.row_id == Some(row_id))
            .flat_map(|(idx, _)| self.diagnostics_for(idx).iter().copied())
            .collect()
    }

    fn flag(&mut self, index: usize, kind: DiagnosticKind) {
        let diag = Diagnostic::from(kind);
        self.highest_severity = self.highest_severity.max(diag.severity);
        self.per_entry_diagnostics.entry(index).or_default().push(diag);
    }
}

/// Validate `entries` against each other and against `fs`.
pub fn check(fs: &dyn FileSystem, entries: &[Entry]) -> CheckResult {
    let mut result = CheckResult::default();

    if entries.iter().all(Entry::is_noop) {
        debug!(entries = entries.len(), "all names unchanged; skipping checks");
        result.all_unchanged = true;
        return result;
    }

    let mut malformed = HashSet::new();
    for (idx, e) in entries.iter().enumerate() {
        if e.new_name.is_empty() {
            result.flag(idx, DiagnosticKind::EmptyTarget);
            malformed.insert(idx);
        } else if e.new_name.chars().any(std::path::is_separator) {
            result.flag(idx, DiagnosticKind::SeparatorInTarget);
            malformed.insert(idx);
        }
    }

    let changing: Vec<(usize, &Entry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_noop())
        .collect();

    let mut by_target: HashMap<(&Path, &str), Vec<usize>> = HashMap::new();
    for (idx, e) in &changing {
        by_target
            .entry((e.directory.as_path(), e.new_name.as_str()))
            .or_default()
            .push(*idx);
    }
    let mut doubles: Vec<usize> = by_target
        .values()
        .filter(|members| members.len() > 1)
        .flatten()
        .copied()
        .collect();
    doubles.sort_unstable();
    for idx in doubles {
        result.flag(idx, DiagnosticKind::DuplicateTarget);
    }

    // An unchanged entry is its own unique target, so only changing sources count.
    let sources: HashSet<PathBuf> = changing.iter().map(|(_, e)| e.source_path()).collect();
    result.circular_target_paths = changing
        .iter()
        .map(|(_, e)| e.target_path())
        .filter(|t| sources.contains(t))
        .collect();

    for (idx, e) in &changing {
        if malformed.contains(idx) || result.circular_target_paths.contains(&e.target_path()) {
            continue;
        }
        if fs.exists(&e.directory, &e.new_name) {
            result.flag(*idx, DiagnosticKind::AlreadyExists);
        }
    }

    debug!(
        highest = %result.highest_severity,
        flagged = result.per_entry_diagnostics.len(),
        circular = result.circular_target_paths.len(),
        "checks complete"
    );
    result
}
