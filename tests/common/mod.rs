//! Shared helpers for integration tests: temp trees and instrumented backends.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use bulk_rename::{FileHandle, FileSystem, LocalFs, RenameError};

/// Temp dir populated with `paths`; a trailing `/` makes a directory.
/// Files contain their own relative path so moves can be verified by content.
pub fn tree(paths: &[&str]) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    for p in paths {
        let full = td.path().join(p.trim_end_matches('/'));
        if p.ends_with('/') {
            fs::create_dir_all(&full).unwrap();
        } else {
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full, p).unwrap();
        }
    }
    td
}

/// Every path under `root`, relative, `/`-separated, sorted. Directories end in `/`.
pub fn listing(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let rel: Vec<String> = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let mut rel = rel.join("/");
            if path.is_dir() {
                rel.push('/');
                out.push(rel);
                walk(root, &path, out);
            } else {
                out.push(rel);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

/// Canonical form of a temp dir path (macOS /var vs /private/var).
pub fn canon(td: &TempDir) -> PathBuf {
    dunce::canonicalize(td.path()).unwrap()
}

/// Local backend that refuses renames to selected final names and records
/// every name it was asked to rename to.
#[derive(Default)]
pub struct FlakyFs {
    inner: LocalFs,
    fail_on: HashSet<String>,
    pub requested: Mutex<Vec<String>>,
}

impl FlakyFs {
    pub fn failing(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            fail_on: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSystem for FlakyFs {
    fn exists(&self, directory: &Path, name: &str) -> bool {
        self.inner.exists(directory, name)
    }

    async fn rename(
        &self,
        handle: &FileHandle,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<FileHandle, RenameError> {
        self.requested.lock().unwrap().push(new_name.to_string());
        if self.fail_on.contains(new_name) {
            return Err(RenameError::PermissionDenied(handle.path().to_path_buf()));
        }
        self.inner.rename(handle, new_name, cancel).await
    }

    fn is_directory(&self, handle: &FileHandle) -> bool {
        self.inner.is_directory(handle)
    }
}

/// Local backend whose renames of selected sources hang until cancelled.
#[derive(Default)]
pub struct GateFs {
    inner: LocalFs,
    hold: HashSet<String>,
    pub waiting: AtomicUsize,
}

impl GateFs {
    pub fn holding(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            hold: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    /// Resolve once `n` renames are parked at the gate.
    pub async fn wait_for_waiting(&self, n: usize) {
        while self.waiting.load(Ordering::SeqCst) < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl FileSystem for GateFs {
    fn exists(&self, directory: &Path, name: &str) -> bool {
        self.inner.exists(directory, name)
    }

    async fn rename(
        &self,
        handle: &FileHandle,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<FileHandle, RenameError> {
        let held = handle
            .path()
            .file_name()
            .map(|n| self.hold.contains(n.to_string_lossy().as_ref()))
            .unwrap_or(false);
        if held {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            cancel.cancelled().await;
            return Err(RenameError::Cancelled);
        }
        self.inner.rename(handle, new_name, cancel).await
    }

    fn is_directory(&self, handle: &FileHandle) -> bool {
        self.inner.is_directory(handle)
    }
}

/// Local backend that tracks how many renames run at the same time.
#[derive(Default)]
pub struct CountingFs {
    inner: LocalFs,
    current: AtomicUsize,
    pub peak: AtomicUsize,
}

#[async_trait]
impl FileSystem for CountingFs {
    fn exists(&self, directory: &Path, name: &str) -> bool {
        self.inner.exists(directory, name)
    }

    async fn rename(
        &self,
        handle: &FileHandle,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<FileHandle, RenameError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let res = self.inner.rename(handle, new_name, cancel).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        res
    }

    fn is_directory(&self, handle: &FileHandle) -> bool {
        self.inner.is_directory(handle)
    }
}
