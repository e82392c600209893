//! Containment-ordered batching.
//!
//! Renaming a directory invalidates the path of everything below it, so a
//! directory may only be renamed once nothing nested beneath it is still
//! pending. Non-directories never contain other operands and all go first.

use std::borrow::Borrow;
use tracing::trace;

use crate::entry::Entry;
use crate::fs_ops::FileSystem;

pub type Batch = Vec<Entry>;

/// Split `entries` into batches that are safe to run one after another.
/// Unchanged entries are dropped.
pub fn schedule(fs: &dyn FileSystem, entries: Vec<Entry>) -> Vec<Batch> {
    schedule_items(fs, entries)
}

pub(crate) fn schedule_items<T: Borrow<Entry>>(fs: &dyn FileSystem, items: Vec<T>) -> Vec<Vec<T>> {
    let (files, mut dirs): (Vec<T>, Vec<T>) = items
        .into_iter()
        .filter(|item| !item.borrow().is_noop())
        .partition(|item| !fs.is_directory(&item.borrow().handle));

    let mut batches = Vec::new();
    if !files.is_empty() {
        batches.push(files);
    }

    while !dirs.is_empty() {
        let blocked: Vec<bool> = dirs
            .iter()
            .enumerate()
            .map(|(i, d)| {
                dirs.iter().enumerate().any(|(j, other)| {
                    i != j && fs.has_prefix(&other.borrow().handle, &d.borrow().handle)
                })
            })
            .collect();

        // A finite set always has a deepest member; this only trips on a backend
        // whose containment test is not a strict order.
        if blocked.iter().all(|b| *b) {
            batches.push(std::mem::take(&mut dirs));
            break;
        }

        let mut ready = Vec::new();
        let mut rest = Vec::new();
        for (item, is_blocked) in dirs.into_iter().zip(blocked) {
            if is_blocked {
                rest.push(item);
            } else {
                ready.push(item);
            }
        }
        trace!(ready = ready.len(), waiting = rest.len(), "directory batch scheduled");
        batches.push(ready);
        dirs = rest;
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileHandle;
    use crate::errors::RenameError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use tokio_util::sync::CancellationToken;

    /// Tree shape only: which paths are directories.
    struct TreeFs {
        dirs: HashSet<PathBuf>,
    }

    impl TreeFs {
        fn new(dirs: &[&str]) -> Self {
            Self {
                dirs: dirs.iter().map(PathBuf::from).collect(),
            }
        }
    }

    #[async_trait]
    impl FileSystem for TreeFs {
        fn exists(&self, _directory: &Path, _name: &str) -> bool {
            false
        }

        async fn rename(
            &self,
            handle: &FileHandle,
            new_name: &str,
            _cancel: &CancellationToken,
        ) -> Result<FileHandle, RenameError> {
            Ok(handle.sibling(new_name))
        }

        fn is_directory(&self, handle: &FileHandle) -> bool {
            self.dirs.contains(handle.path())
        }
    }

    fn names(batch: &Batch) -> Vec<String> {
        let mut v: Vec<String> = batch.iter().map(|e| e.source_path().display().to_string()).collect();
        v.sort();
        v
    }

    #[test]
    fn files_go_before_their_directory() {
        let fs = TreeFs::new(&["/r/D"]);
        let batches = schedule(
            &fs,
            vec![Entry::new("/r", "D", "D2"), Entry::new("/r/D", "f", "f2")],
        );
        assert_eq!(batches.len(), 2);
        assert_eq!(names(&batches[0]), vec!["/r/D/f"]);
        assert_eq!(names(&batches[1]), vec!["/r/D"]);
    }

    #[test]
    fn nested_directories_run_deepest_first() {
        let fs = TreeFs::new(&["/r/a", "/r/a/b", "/r/a/b/c", "/r/x"]);
        let batches = schedule(
            &fs,
            vec![
                Entry::new("/r", "a", "A"),
                Entry::new("/r/a", "b", "B"),
                Entry::new("/r/a/b", "c", "C"),
                Entry::new("/r", "x", "X"),
                Entry::new("/r/a/b/c", "file", "FILE"),
            ],
        );
        let layout: Vec<Vec<String>> = batches.iter().map(names).collect();
        assert_eq!(
            layout,
            vec![
                vec!["/r/a/b/c/file".to_string()],
                vec!["/r/a/b/c".to_string(), "/r/x".to_string()],
                vec!["/r/a/b".to_string()],
                vec!["/r/a".to_string()],
            ]
        );
    }

    #[test]
    fn noops_are_dropped() {
        let fs = TreeFs::new(&[]);
        let batches = schedule(
            &fs,
            vec![Entry::new("/r", "same", "same"), Entry::new("/r", "a", "b")],
        );
        assert_eq!(batches.len(), 1);
        assert_eq!(names(&batches[0]), vec!["/r/a"]);
        assert!(schedule(&fs, vec![Entry::new("/r", "s", "s")]).is_empty());
    }

    #[test]
    fn sibling_name_prefix_is_not_containment() {
        // "/r/ab" starts with the characters of "/r/a" but is not inside it.
        let fs = TreeFs::new(&["/r/a", "/r/ab"]);
        let batches = schedule(
            &fs,
            vec![Entry::new("/r", "a", "a1"), Entry::new("/r", "ab", "ab1")],
        );
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }
}
