//! Multi-batch rename runs.
//!
//! A run schedules its entries, executes the batches strictly one after the
//! other and merges everything into one `RenameResults`. Failures never stop
//! a run: siblings and later batches always go ahead.
//!
//! Two-pass runs first move every object to `<prefix><new_name>` and then
//! move the successfully staged ones to `<new_name>`, which breaks cycles
//! (`a -> b`, `b -> a`) and collisions with sources still waiting to move.
//!
//! Whenever a batch renames a directory, every record of the same run that
//! lives below it (earlier successes, failures, and entries still waiting)
//! is rebased onto the new location, so the reported paths stay usable for
//! undo.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::check::{CheckResult, check};
use crate::config::Config;
use crate::entry::{Entry, FileHandle, rebase};
use crate::errors::EngineError;
use crate::fs_ops::FileSystem;

use super::execute::{Executor, Job, JobDone, JobFailed};
use super::schedule::schedule_items;
use super::{Failure, FailureStage, RenameResults, Success};

pub const DEFAULT_TEMP_TAG: &str = "gbr";

const PREFIX_ATTEMPTS: usize = 8;

/// A directory that moved during a run.
#[derive(Debug, Clone)]
struct Relocation {
    from: PathBuf,
    to: PathBuf,
}

impl Relocation {
    fn apply_path(&self, path: &mut PathBuf) {
        if let Some(moved) = rebase(path, &self.from, &self.to) {
            *path = moved;
        }
    }

    fn apply_handle(&self, handle: &mut FileHandle) {
        if let Some(moved) = rebase(handle.path(), &self.from, &self.to) {
            *handle = FileHandle::new(moved);
        }
    }

    fn apply_entry(&self, entry: &mut Entry) {
        self.apply_path(&mut entry.directory);
        self.apply_handle(&mut entry.handle);
    }
}

#[derive(Debug, Default)]
struct PassOutcome {
    done: Vec<JobDone>,
    failed: Vec<JobFailed>,
    moves: Vec<Relocation>,
}

#[derive(Clone)]
pub struct Orchestrator {
    fs: Arc<dyn FileSystem>,
    executor: Executor,
    temp_tag: String,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("executor", &self.executor)
            .field("temp_tag", &self.temp_tag)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            executor: Executor::new(Arc::clone(&fs)),
            fs,
            temp_tag: DEFAULT_TEMP_TAG.to_string(),
        }
    }

    pub fn with_config(fs: Arc<dyn FileSystem>, config: &Config) -> Self {
        Self {
            executor: Executor::new(Arc::clone(&fs)).with_max_in_flight(config.max_in_flight),
            fs,
            temp_tag: config.temp_prefix.clone(),
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Validate `entries` with the checker.
    pub fn check(&self, entries: &[Entry]) -> CheckResult {
        check(self.fs.as_ref(), entries)
    }

    /// Check, refuse on errors, and run in two passes iff the checker found cycles.
    pub async fn rename_all(
        &self,
        entries: Vec<Entry>,
        cancel: &CancellationToken,
    ) -> Result<(CheckResult, RenameResults), EngineError> {
        let checked = self.check(&entries);
        if checked.is_blocking() {
            return Err(EngineError::Blocked {
                highest: checked.highest_severity,
            });
        }
        let two_pass = checked.requires_two_pass();
        let results = self.run(entries, two_pass, cancel).await;
        Ok((checked, results))
    }

    /// Start a run in the background; the handle cancels it or waits for its results.
    pub fn spawn(&self, entries: Vec<Entry>, use_two_pass: bool) -> RenameHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let orchestrator = self.clone();
        let join = tokio::spawn(async move { orchestrator.run(entries, use_two_pass, &token).await });
        RenameHandle { cancel, join }
    }

    /// Rename `entries`, batch after batch, and report every outcome.
    pub async fn run(
        &self,
        entries: Vec<Entry>,
        use_two_pass: bool,
        cancel: &CancellationToken,
    ) -> RenameResults {
        let entries: Vec<Entry> = entries.into_iter().filter(|e| !e.is_noop()).collect();
        info!(entries = entries.len(), two_pass = use_two_pass, "rename run starting");

        let results = if use_two_pass {
            self.two_pass(entries, cancel).await
        } else {
            self.single_pass(entries, cancel).await
        };

        info!(
            renamed = results.success_count(),
            failed = results.failure_count(),
            stranded = results.stranded().count(),
            two_pass = results.used_two_pass,
            "rename run finished"
        );
        results
    }

    async fn single_pass(&self, entries: Vec<Entry>, cancel: &CancellationToken) -> RenameResults {
        let jobs = entries
            .into_iter()
            .enumerate()
            .map(|(key, entry)| Job { key, entry })
            .collect();
        let pass = self.run_pass(jobs, cancel).await;

        RenameResults {
            successes: pass
                .done
                .into_iter()
                .map(|d| Success {
                    entry: d.entry,
                    new_handle: d.new_handle,
                })
                .collect(),
            failures: pass
                .failed
                .into_iter()
                .map(|f| Failure {
                    entry: f.entry,
                    error: f.error,
                    stage: FailureStage::Single,
                    stranded: None,
                })
                .collect(),
            used_two_pass: false,
        }
    }

    async fn two_pass(&self, entries: Vec<Entry>, cancel: &CancellationToken) -> RenameResults {
        let prefix = self.temp_prefix(&entries);
        debug!(%prefix, "staging through temporary names");

        let originals: HashMap<usize, Entry> = entries.into_iter().enumerate().collect();
        let staging: Vec<Job> = originals
            .iter()
            .map(|(key, e)| Job {
                key: *key,
                entry: Entry {
                    new_name: format!("{prefix}{}", e.new_name),
                    ..e.clone()
                },
            })
            .collect();

        let first = self.run_pass(staging, cancel).await;

        let finalizing: Vec<Job> = first
            .done
            .iter()
            .map(|d| Job {
                key: d.key,
                entry: Entry {
                    handle: d.new_handle.clone(),
                    directory: d.entry.directory.clone(),
                    old_name: d.entry.new_name.clone(),
                    new_name: originals[&d.key].new_name.clone(),
                    row_id: d.entry.row_id,
                },
            })
            .collect();

        let second = self.run_pass(finalizing, cancel).await;

        // Report against the caller's entries, at the directory each object ends up in.
        let restore = |key: usize, directory: PathBuf| Entry {
            directory,
            ..originals[&key].clone()
        };

        let mut failures = Vec::with_capacity(first.failed.len() + second.failed.len());
        for mut f in first.failed {
            for mv in &second.moves {
                mv.apply_entry(&mut f.entry);
            }
            failures.push(Failure {
                entry: restore(f.key, f.entry.directory),
                error: f.error,
                stage: FailureStage::Staging,
                stranded: None,
            });
        }
        for f in second.failed {
            warn!(
                stranded = %f.entry.handle,
                intended = %originals[&f.key].new_name,
                "item left under its temporary name"
            );
            failures.push(Failure {
                entry: restore(f.key, f.entry.directory),
                error: f.error,
                stage: FailureStage::Finalizing,
                stranded: Some(f.entry.handle),
            });
        }

        let successes = second
            .done
            .into_iter()
            .map(|d| Success {
                entry: restore(d.key, d.entry.directory),
                new_handle: d.new_handle,
            })
            .collect();

        RenameResults {
            successes,
            failures,
            used_two_pass: true,
        }
    }

    /// Execute `jobs` batch by batch, rebasing records whenever a directory moves.
    async fn run_pass(&self, jobs: Vec<Job>, cancel: &CancellationToken) -> PassOutcome {
        let mut out = PassOutcome::default();
        let mut batches: VecDeque<Vec<Job>> = schedule_items(self.fs.as_ref(), jobs).into();
        let total = batches.len();
        let mut index = 0usize;

        while let Some(batch) = batches.pop_front() {
            index += 1;
            debug!(batch = index, of = total, size = batch.len(), "executing batch");
            let res = self.executor.execute_jobs(batch, cancel).await;

            let moves: Vec<Relocation> = res
                .done
                .iter()
                .filter(|d| self.fs.is_directory(&d.new_handle))
                .map(|d| Relocation {
                    from: self.fs.path_of(&d.entry.handle),
                    to: self.fs.path_of(&d.new_handle),
                })
                .collect();

            out.done.extend(res.done);
            out.failed.extend(res.failed);

            for mv in &moves {
                debug!(from = %mv.from.display(), to = %mv.to.display(), "directory moved; rebasing records");
                for d in &mut out.done {
                    mv.apply_path(&mut d.entry.directory);
                    mv.apply_handle(&mut d.new_handle);
                }
                for f in &mut out.failed {
                    mv.apply_entry(&mut f.entry);
                }
                for job in batches.iter_mut().flatten() {
                    mv.apply_entry(&mut job.entry);
                }
            }
            out.moves.extend(moves);
        }

        out
    }

    /// Temporary prefix unique to this process and run, checked against the batch targets.
    fn temp_prefix(&self, entries: &[Entry]) -> String {
        let pid = std::process::id();
        let mut candidate = String::new();
        for _ in 0..PREFIX_ATTEMPTS {
            let salt: u32 = rand::random();
            candidate = format!("{}-{pid:010}-{salt:08x}--", self.temp_tag);
            let taken = entries
                .iter()
                .any(|e| self.fs.exists(&e.directory, &format!("{candidate}{}", e.new_name)));
            if !taken {
                return candidate;
            }
            debug!(prefix = %candidate, "temporary prefix collides with an existing name; retrying");
        }
        candidate
    }
}

/// Cancels a running orchestration. Cloneable; cancelling twice is harmless.
#[derive(Debug, Clone)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// A background run started with [`Orchestrator::spawn`].
#[derive(Debug)]
pub struct RenameHandle {
    cancel: CancellationToken,
    join: JoinHandle<RenameResults>,
}

impl RenameHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel.clone())
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run to finish.
    pub async fn join(self) -> Result<RenameResults, EngineError> {
        self.join
            .await
            .map_err(|e| EngineError::Aborted(e.to_string()))
    }
}
