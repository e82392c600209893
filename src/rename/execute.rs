//! Concurrent execution of one batch.
//!
//! Every entry of a batch is independent of the others, so all renames are
//! issued at once on a `JoinSet` and the batch resolves after the last one
//! reports back. Completion order is arbitrary.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::entry::{Entry, FileHandle};
use crate::errors::RenameError;
use crate::fs_ops::FileSystem;

use super::{BatchResult, Failure, FailureStage, Success};

/// An entry tagged with the caller's correlation key.
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub key: usize,
    pub entry: Entry,
}

impl Borrow<Entry> for Job {
    fn borrow(&self) -> &Entry {
        &self.entry
    }
}

#[derive(Debug)]
pub(crate) struct JobDone {
    pub key: usize,
    pub entry: Entry,
    pub new_handle: FileHandle,
}

#[derive(Debug)]
pub(crate) struct JobFailed {
    pub key: usize,
    pub entry: Entry,
    pub error: RenameError,
}

#[derive(Debug, Default)]
pub(crate) struct JobResults {
    pub done: Vec<JobDone>,
    pub failed: Vec<JobFailed>,
}

#[derive(Clone)]
pub struct Executor {
    fs: Arc<dyn FileSystem>,
    limit: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("max_in_flight", &self.limit.as_ref().map(|s| s.available_permits()))
            .finish()
    }
}

impl Executor {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs, limit: None }
    }

    /// Cap the number of renames in flight at once; 0 means unlimited.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.limit = (max > 0).then(|| Arc::new(Semaphore::new(max)));
        self
    }

    /// Run every entry of `batch` concurrently and collect what happened to each.
    pub async fn execute(&self, batch: Vec<Entry>, cancel: &CancellationToken) -> BatchResult {
        let jobs = batch
            .into_iter()
            .enumerate()
            .map(|(key, entry)| Job { key, entry })
            .collect();
        let res = self.execute_jobs(jobs, cancel).await;
        BatchResult {
            successes: res
                .done
                .into_iter()
                .map(|d| Success {
                    entry: d.entry,
                    new_handle: d.new_handle,
                })
                .collect(),
            failures: res
                .failed
                .into_iter()
                .map(|f| Failure {
                    entry: f.entry,
                    error: f.error,
                    stage: FailureStage::Single,
                    stranded: None,
                })
                .collect(),
        }
    }

    pub(crate) async fn execute_jobs(&self, jobs: Vec<Job>, cancel: &CancellationToken) -> JobResults {
        let mut results = JobResults::default();
        let mut pending: HashMap<usize, Entry> = HashMap::with_capacity(jobs.len());
        let mut set = JoinSet::new();

        for Job { key, entry } in jobs {
            if cancel.is_cancelled() {
                results.failed.push(JobFailed {
                    key,
                    entry,
                    error: RenameError::Cancelled,
                });
                continue;
            }

            let fs = Arc::clone(&self.fs);
            let limit = self.limit.clone();
            let token = cancel.clone();
            let handle = entry.handle.clone();
            let new_name = entry.new_name.clone();
            pending.insert(key, entry);

            set.spawn(async move {
                let _permit = match limit {
                    Some(sem) => tokio::select! {
                        biased;
                        _ = token.cancelled() => return (key, Err(RenameError::Cancelled)),
                        permit = sem.acquire_owned() => permit.ok(),
                    },
                    None => None,
                };
                (key, fs.rename(&handle, &new_name, &token).await)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((key, outcome)) => {
                    let Some(entry) = pending.remove(&key) else {
                        continue;
                    };
                    match outcome {
                        Ok(new_handle) => {
                            debug!(
                                from = %entry.source_path().display(),
                                to = %entry.new_name,
                                "renamed"
                            );
                            results.done.push(JobDone {
                                key,
                                entry,
                                new_handle,
                            });
                        }
                        Err(error) => {
                            warn!(
                                code = error.code(),
                                from = %entry.source_path().display(),
                                to = %entry.new_name,
                                %error,
                                "rename failed"
                            );
                            results.failed.push(JobFailed { key, entry, error });
                        }
                    }
                }
                Err(e) => error!(error = %e, "rename task crashed"),
            }
        }

        // Anything still pending belongs to a task that panicked or was aborted.
        for (key, entry) in pending {
            results.failed.push(JobFailed {
                key,
                error: RenameError::Failed {
                    path: entry.source_path(),
                    reason: "rename task did not complete".into(),
                },
                entry,
            });
        }

        results
    }
}
