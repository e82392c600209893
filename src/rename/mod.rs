//! Rename planning and execution.
//!
//! - `schedule` orders a batch so nothing is renamed before the entries nested under it.
//! - `Executor` runs one scheduled batch concurrently.
//! - `Orchestrator` runs all batches of a request in sequence, optionally in two passes
//!   through temporary names, and keeps the reported paths current as directories move.

mod execute;
mod orchestrate;
mod schedule;

pub use execute::Executor;
pub use orchestrate::{CancelHandle, Orchestrator, RenameHandle};
pub use schedule::{Batch, schedule};

use crate::entry::{Entry, FileHandle};
use crate::errors::RenameError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success {
    /// The planned rename; `directory` is where the object lives once the run is over.
    pub entry: Entry,
    pub new_handle: FileHandle,
}

/// Which step of a run produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Plain single-pass rename; the object is untouched.
    Single,
    /// Two-pass, renaming to the temporary name; the object is untouched.
    Staging,
    /// Two-pass, renaming from the temporary name to the final one; the object
    /// is left behind under its temporary name.
    Finalizing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub entry: Entry,
    pub error: RenameError,
    pub stage: FailureStage,
    /// Where the object was left when it could not be moved off its temporary name.
    pub stranded: Option<FileHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Success(Success),
    Failure(Failure),
}

/// Outcome of one executed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub successes: Vec<Success>,
    pub failures: Vec<Failure>,
}

impl BatchResult {
    pub fn outcomes(self) -> impl Iterator<Item = RenameOutcome> {
        self.successes
            .into_iter()
            .map(RenameOutcome::Success)
            .chain(self.failures.into_iter().map(RenameOutcome::Failure))
    }
}

/// Aggregate outcome of one logical rename, undo or redo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameResults {
    pub successes: Vec<Success>,
    pub failures: Vec<Failure>,
    pub used_two_pass: bool,
}

impl RenameResults {
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.failures.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Failures that left an object under a temporary name; these need manual attention.
    pub fn stranded(&self) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(|f| f.stranded.is_some())
    }

    /// The entries that revert every success of this run.
    pub fn inverse_entries(&self) -> Vec<Entry> {
        self.successes
            .iter()
            .map(|s| s.entry.inverted(s.new_handle.clone()))
            .collect()
    }
}
